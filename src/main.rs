use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reorder_entry_images::api;
use reorder_entry_images::config::ServerConfig;
use reorder_entry_images::models::{CreateUserInput, Role};
use reorder_entry_images::nonce::{Nonces, DEFAULT_LIFETIME_SECS};
use reorder_entry_images::reorder::ReorderImages;

#[derive(Parser)]
#[command(name = "rei")]
#[command(about = "Drag-and-drop reordering of entry images")]
struct Cli {
    /// Database file (overrides REI_DATABASE)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the admin server
    Serve {
        /// Port for HTTP
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Apply pending database migrations
    Migrate,
    /// Manage admin users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Inspect or change the enabled content types
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user and print their bearer token
    Add {
        name: String,
        /// administrator, editor, author or subscriber
        #[arg(long, default_value = "editor")]
        role: String,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the enabled content types
    Show,
    /// Replace the enabled content types
    Set { types: Vec<String> },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "reorder_entry_images=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: &ServerConfig, bind: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting reorder-entry-images server on port {}", port);

    let db = config.open_database()?;
    let reorder = ReorderImages::new(db, config.nonces());
    let app = api::create_router(reorder);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, port)).await?;
    tracing::info!("Admin listening on http://{}:{}/admin/settings", bind, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ServerConfig::from_env().with_database(cli.db);

    match cli.command {
        Some(Commands::Serve { port, bind }) => serve(&config, &bind, port).await?,
        Some(Commands::Migrate) => {
            let db = config.open_database()?;
            match db.schema_version()? {
                Some(version) => println!("Database is up to date (schema {})", version),
                None => println!("Database has no migrations applied"),
            }
        }
        Some(Commands::User { command }) => {
            let db = config.open_database()?;
            match command {
                UserCommands::Add { name, role } => {
                    let role = Role::from_str(&role)
                        .ok_or_else(|| anyhow::anyhow!("Unknown role: {}", role))?;
                    let user = db.create_user(CreateUserInput {
                        name,
                        role,
                        token: None,
                    })?;
                    println!("{}\t{}\t{}", user.id, user.role.as_str(), user.token);
                }
                UserCommands::List => {
                    for user in db.get_all_users()? {
                        println!("{}\t{}\t{}", user.id, user.role.as_str(), user.name);
                    }
                }
            }
        }
        Some(Commands::Settings { command }) => {
            let db = config.open_database()?;
            // No forms are issued from the command line.
            let reorder = ReorderImages::new(db, Nonces::random(DEFAULT_LIFETIME_SECS));
            match command {
                SettingsCommands::Show => {
                    for content_type in reorder.enabled_types().iter() {
                        println!("{}", content_type);
                    }
                }
                SettingsCommands::Set { types } => reorder.save_settings(types)?,
            }
        }
        None => serve(&config, "127.0.0.1", 3000).await?,
    }

    Ok(())
}
