mod auth_commands;
mod resource_commands;
mod version_command;

use {
    clap::{Parser, Subcommand},
    strato_auth::AuthError,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "strato",
    about = "strato — command-line client for the Strato developer platform",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the platform through the browser.
    Login,
    /// Remove the stored credential.
    Logout,
    /// Show authentication status.
    Status,
    /// Link the working directory to an existing remote project.
    Init { name: String },
    /// Show the CLI version and check for a newer release.
    Version,
    /// Project management.
    Project {
        #[command(subcommand)]
        action: resource_commands::ProjectAction,
    },
    /// Endpoint management.
    Endpoint {
        #[command(subcommand)]
        action: resource_commands::EndpointAction,
    },
    /// Package management.
    Package {
        #[command(subcommand)]
        action: resource_commands::PackageAction,
    },
    /// Project environment variable management.
    Var {
        #[command(subcommand)]
        action: resource_commands::VarAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Err(err) = run(cli).await {
        report(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Login => auth_commands::login().await,
        Commands::Logout => auth_commands::logout(),
        Commands::Status => auth_commands::status().await,
        Commands::Init { name } => resource_commands::handle_init(name).await,
        Commands::Version => version_command::version().await,
        Commands::Project { action } => resource_commands::handle_project(action).await,
        Commands::Endpoint { action } => resource_commands::handle_endpoint(action).await,
        Commands::Package { action } => resource_commands::handle_package(action).await,
        Commands::Var { action } => resource_commands::handle_var(action).await,
    }
}

/// Print the short description, then the actionable remedy when one exists.
fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    if let Some(auth_err) = err.downcast_ref::<AuthError>() {
        eprintln!();
        eprintln!("{}", auth_err.directive());
    }
}
