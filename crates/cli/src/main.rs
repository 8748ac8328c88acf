//! Windsor Goods CLI - Database migrations and store management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations (schema and session table)
//! wg-cli migrate
//!
//! # Load categories, products and client accounts from YAML
//! wg-cli seed data/catalog.yaml
//!
//! # Add 50 units to products 1, 2 and 3
//! wg-cli stock increase 1 2 3
//!
//! # Add 100 units to product 4
//! wg-cli stock refill 4
//!
//! # List clients and their interests
//! wg-cli client list
//!
//! # Block or restore a user's logins
//! wg-cli user deactivate jdoe
//! wg-cli user activate jdoe
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use windsor_goods_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "wg-cli")]
#[command(author, version, about = "Windsor Goods CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed categories, products and clients from a YAML file
    Seed {
        /// Path to the YAML seed file
        file: String,
    },
    /// Change product stock
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Inspect clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Add 50 units to each product
    Increase {
        /// Product ids
        #[arg(required = true)]
        ids: Vec<ProductId>,
    },
    /// Add 100 units to a product
    Refill {
        /// Product id
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum ClientAction {
    /// List clients with their categories of interest
    List,
}

#[derive(Subcommand)]
enum UserAction {
    /// Allow the user to log in
    Activate {
        /// Username
        username: String,
    },
    /// Refuse the user's logins
    Deactivate {
        /// Username
        username: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Stock { action } => match action {
            StockAction::Increase { ids } => commands::stock::increase(&ids).await?,
            StockAction::Refill { id } => commands::stock::refill(id).await?,
        },
        Commands::Client { action } => match action {
            ClientAction::List => commands::client::list().await?,
        },
        Commands::User { action } => match action {
            UserAction::Activate { username } => {
                commands::user::set_active(&username, true).await?;
            }
            UserAction::Deactivate { username } => {
                commands::user::set_active(&username, false).await?;
            }
        },
    }
    Ok(())
}
