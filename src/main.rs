use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use user_admin::config::{AppConfig, FormCatalog};
use user_admin::controllers::{ListingController, SubmissionController, SubmitError};
use user_admin::create_app;
use user_admin::models::{FieldErrors, FieldName, ProfileImage};
use user_admin::notify::TracingNotifier;
use user_admin::services::{HttpUserService, UserService};
use user_admin::signal::RefreshSignal;
use user_admin::store::UserStore;
use user_admin::utils::table::render_users;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "user-admin", about = "Create and list users on a users API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current users.
    List,
    /// Validate and submit a new user, then print the refreshed list.
    Add(AddArgs),
    /// Run an in-memory users API.
    Serve,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Image file to upload as the profile picture.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Role id; defaults to the first configured role.
    #[arg(long)]
    role: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load environment variables from .env file (if present)
    dotenv().ok();

    // Initialize tracing for structured logs
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let catalog = Arc::new(config.load_catalog()?);

    match cli.command {
        Command::List => list(&config).await,
        Command::Add(args) => add(&config, catalog, args).await,
        Command::Serve => serve(&config, &catalog).await,
    }
}

async fn list(config: &AppConfig) -> Result<(), BoxError> {
    let service: Arc<dyn UserService> = Arc::new(HttpUserService::new(config)?);
    let listing = ListingController::new(service);
    // Failures are logged by the listing; an empty table is still printed.
    let _ = listing.refetch().await;
    print!("{}", render_users(&listing.users().await));
    Ok(())
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        eprintln!("{field}: {message}");
    }
}

async fn add(
    config: &AppConfig,
    catalog: Arc<FormCatalog>,
    args: AddArgs,
) -> Result<(), BoxError> {
    let service: Arc<dyn UserService> = Arc::new(HttpUserService::new(config)?);
    let signal = RefreshSignal::new();
    let listing = Arc::new(ListingController::new(service.clone()));
    let listing_task = listing.spawn(&signal);

    let mut form = SubmissionController::new(
        service,
        catalog,
        Arc::new(TracingNotifier),
        signal.clone(),
    );
    form.update_field(FieldName::Name, args.name)?;
    form.update_field(FieldName::Email, args.email)?;
    form.update_field(FieldName::Phone, args.phone)?;
    form.update_field(FieldName::Description, args.description)?;
    if let Some(path) = args.image {
        form.update_profile_image(ProfileImage::from_path(&path).await?);
    }
    if let Some(role) = args.role {
        form.update_role(role)?;
    }

    let outcome = form.submit().await;
    let result: Result<(), BoxError> = match outcome {
        Ok(_) => {
            let generation = signal.generation();
            listing.synced().wait_for(|g| *g >= generation).await?;
            print!("{}", render_users(&listing.users().await));
            Ok(())
        }
        Err(SubmitError::ClientValidation(errors)) | Err(SubmitError::ServerValidation(errors)) => {
            print_field_errors(&errors);
            Err("the user was not created".into())
        }
        Err(e @ SubmitError::Unknown(_)) => Err(e.into()),
    };

    drop(form);
    drop(signal);
    listing_task.await?;
    result
}

async fn serve(config: &AppConfig, catalog: &FormCatalog) -> Result<(), BoxError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let store = Arc::new(UserStore::new(catalog.roles.clone(), format!("http://{addr}")));
    let app = create_app(store);

    tracing::info!("Listening on http://{}", addr);

    // Start the server and handle shutdown via ctrl-c
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app.into_make_service());

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    };

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal => {
            tracing::info!("Shutdown requested; exiting");
        }
    };

    Ok(())
}
