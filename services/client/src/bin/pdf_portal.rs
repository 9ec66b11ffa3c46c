//! services/client/src/bin/pdf_portal.rs

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use client_lib::{
    config::Config,
    error::ClientError,
    views::{render, AppState, Landing, Outcome, Screen, Shell},
};
use pdf_portal_core::domain::UploadFile;
use pdf_portal_core::guard::Route;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdf-portal")]
#[command(author, version, about = "Upload, browse, share and discuss PDF documents", long_about = None)]
struct Args {
    /// Backend API base address (overrides API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Where the session is persisted (overrides SESSION_FILE)
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PDF_PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PDF_PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the persisted session
    Logout,
    /// Show the signed-in user, re-validated against the backend
    Whoami,
    /// Request password reset instructions by email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Change the password of the signed-in account
    UpdatePassword {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        old_password: String,
        #[arg(long)]
        new_password: String,
    },
    /// List your PDFs
    List,
    /// Search your PDFs
    Search { query: String },
    /// Upload a PDF
    Upload { path: PathBuf },
    /// Delete a PDF
    Delete { id: String },
    /// Show a PDF and its comments
    View { id: String },
    /// Create a public share link for a PDF
    Share { id: String },
    /// Open a shared PDF by its share token
    Shared { token: String },
    /// Work with comments on a PDF
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },
    /// Navigate to a path, e.g. `/dashboard` or `/pdfs/shared/<token>`
    Open { path: String },
}

#[derive(Subcommand, Debug)]
enum CommentAction {
    Add { document_id: String, content: String },
    Edit { document_id: String, comment_id: String, content: String },
    Delete { document_id: String, comment_id: String },
    Reply { document_id: String, comment_id: String, content: String },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(base) = &args.api_base_url {
        config = config.with_api_base_url(base)?;
    }
    if let Some(path) = &args.session_file {
        config.session_file = path.clone();
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api = %config.api_base_url, "Configuration loaded.");

    // --- 2. Build the Shared AppState (restores the persisted session) ---
    let app = AppState::from_config(config)?;
    let shell = Shell::new(app);

    // --- 3. Run the Command ---
    let outcome = run(&shell, args.command).await?;

    for toast in shell.app().notifications.drain() {
        println!("{}", render::toast(&toast));
    }
    match outcome {
        Outcome::Navigate(route) => println!("→ {}", route),
        Outcome::Invalid(errors) => {
            for error in errors.errors {
                eprintln!("{}: {}", error.field, error.message);
            }
        }
        Outcome::Done | Outcome::Failed | Outcome::Cancelled => {}
    }
    Ok(())
}

/// Prints where a guarded navigation went instead, if anywhere.
fn report_redirect(landing: &Landing) {
    if landing.redirected {
        if let Some(route) = &landing.route {
            println!("→ {}", route);
        }
    }
}

async fn run(shell: &Shell, command: Command) -> Result<Outcome, ClientError> {
    let app = shell.app();
    let outcome = match command {
        Command::Signup {
            name,
            email,
            password,
        } => match shell.open(Route::Signup).screen {
            Screen::Signup(mut view) => {
                view.name = name;
                view.email = email;
                view.password = password;
                view.submit(app).await
            }
            _ => unreachable_screen()?,
        },
        Command::Login { email, password } => match shell.open(Route::Login).screen {
            Screen::Login(mut view) => {
                view.email = email;
                view.password = password;
                view.submit(app).await
            }
            _ => unreachable_screen()?,
        },
        Command::ResetPassword { email } => match shell.open(Route::ResetPassword).screen {
            Screen::ResetPassword(mut view) => {
                view.email = email;
                view.submit(app).await
            }
            _ => unreachable_screen()?,
        },
        Command::Shared { token } => match shell.open(Route::Shared { token }).screen {
            Screen::Shared(mut view) => {
                let outcome = view.load(app).await;
                println!("{}", render::shared(view.display()));
                outcome
            }
            _ => unreachable_screen()?,
        },
        Command::Open { path } => {
            let landing = shell.navigate(&path);
            report_redirect(&landing);
            show(app, landing.screen).await
        }
        guarded => {
            let landing = shell.open(route_for(&guarded));
            report_redirect(&landing);
            match landing.screen {
                Screen::Dashboard(view) => dashboard_command(app, view, guarded).await?,
                Screen::Document(view) => document_command(app, view, guarded).await?,
                Screen::UpdatePassword(mut view) => {
                    if let Command::UpdatePassword {
                        user_id,
                        old_password,
                        new_password,
                    } = guarded
                    {
                        view.user_id = user_id.unwrap_or_default();
                        view.old_password = old_password;
                        view.new_password = new_password;
                    }
                    view.submit(app).await
                }
                // The guard sent us to sign-in.
                _ => Outcome::Done,
            }
        }
    };
    Ok(outcome)
}

fn route_for(command: &Command) -> Route {
    match command {
        Command::View { id } | Command::Share { id } => Route::Document { id: id.clone() },
        Command::Comment { action } => {
            let (CommentAction::Add { document_id, .. }
            | CommentAction::Edit { document_id, .. }
            | CommentAction::Delete { document_id, .. }
            | CommentAction::Reply { document_id, .. }) = action;
            Route::Document {
                id: document_id.clone(),
            }
        }
        Command::UpdatePassword { .. } => Route::UpdatePassword,
        _ => Route::Dashboard,
    }
}

fn unreachable_screen() -> Result<Outcome, ClientError> {
    Err(ClientError::Internal(
        "Public route did not render its own view".to_string(),
    ))
}

async fn dashboard_command(
    app: &AppState,
    mut view: client_lib::views::dashboard::DashboardView,
    command: Command,
) -> Result<Outcome, ClientError> {
    let outcome = match command {
        Command::Logout => view.logout(app).await,
        Command::Whoami => match app.session.refresh().await {
            Ok(user) => {
                println!("{}", render::user(&user));
                Outcome::Done
            }
            Err(e) => {
                app.notifications.error(e.to_string());
                app.failure(&e)
            }
        },
        Command::List => {
            let outcome = view.load(app).await;
            println!("{}", render::dashboard(view.display()));
            outcome
        }
        Command::Search { query } => {
            view.search = query;
            let outcome = view.run_search(app).await;
            println!("{}", render::dashboard(view.display()));
            outcome
        }
        Command::Upload { path } => {
            let bytes = Bytes::from(tokio::fs::read(&path).await?);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let outcome = view.upload(app, UploadFile::new(file_name, bytes)).await;
            if let Some(document) = view.documents().first() {
                println!("{}", render::document_line(document));
            }
            outcome
        }
        Command::Delete { id } => view.delete(app, &id).await,
        other => {
            return Err(ClientError::Internal(format!(
                "{:?} is not a dashboard command",
                other
            )))
        }
    };
    Ok(outcome)
}

async fn document_command(
    app: &AppState,
    mut view: client_lib::views::document::DocumentView,
    command: Command,
) -> Result<Outcome, ClientError> {
    let outcome = match command {
        Command::View { .. } => return Ok(show(app, Screen::Document(view)).await),
        Command::Share { .. } => {
            let outcome = view.share(app).await;
            if let Some(url) = view.share_url() {
                println!("{}", url);
            }
            outcome
        }
        Command::Comment { action } => match action {
            CommentAction::Add { content, .. } => {
                view.draft = content;
                view.add_comment(app).await
            }
            CommentAction::Edit {
                comment_id, content, ..
            } => view.edit_comment(app, &comment_id, &content).await,
            CommentAction::Delete { comment_id, .. } => view.delete_comment(app, &comment_id).await,
            CommentAction::Reply {
                comment_id, content, ..
            } => view.reply(app, &comment_id, &content).await,
        },
        other => {
            return Err(ClientError::Internal(format!(
                "{:?} is not a document command",
                other
            )))
        }
    };
    Ok(outcome)
}

/// Loads and prints whatever screen a navigation landed on.
async fn show(app: &AppState, screen: Screen) -> Outcome {
    match screen {
        Screen::Dashboard(mut view) => {
            let outcome = view.load(app).await;
            println!("{}", render::dashboard(view.display()));
            outcome
        }
        Screen::Document(mut view) => {
            let outcome = view.load(app).await;
            if let Some(document) = view.document() {
                println!("{}", render::document_details(document));
                println!();
                println!("{}", render::threads(&view.threads()));
            }
            outcome
        }
        Screen::Shared(mut view) => {
            let outcome = view.load(app).await;
            println!("{}", render::shared(view.display()));
            outcome
        }
        Screen::NotFound => {
            println!("Page not found.");
            Outcome::Done
        }
        Screen::Login(_) => {
            println!("Sign in with `pdf-portal login --email <email>`.");
            Outcome::Done
        }
        Screen::Signup(_) => {
            println!("Create an account with `pdf-portal signup`.");
            Outcome::Done
        }
        Screen::ResetPassword(_) => {
            println!("Request a reset with `pdf-portal reset-password --email <email>`.");
            Outcome::Done
        }
        Screen::UpdatePassword(_) => {
            println!("Change your password with `pdf-portal update-password`.");
            Outcome::Done
        }
    }
}
