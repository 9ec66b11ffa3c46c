pub mod domain;
pub mod guard;
pub mod ports;
pub mod session;
pub mod validation;

pub use domain::{
    Comment, Document, PasswordChange, Registration, Session, ShareLink, UploadFile, User,
};
pub use guard::{Navigation, Route, RouteGuard};
pub use ports::{
    AuthService, CommentService, DocumentService, PortError, PortResult, SessionStorage,
};
pub use session::{SessionState, SessionStore};
pub use validation::{FieldError, ValidationErrors};
