//! Stockroom CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! stockroom migrate
//!
//! # Bootstrap the first admin (password from STOCKROOM_EMPLOYEE_PASSWORD or stdin)
//! stockroom employee create -u admin -e admin@example.com -n "Admin" -r admin --contact 912345678
//!
//! # Archive every unarchived sale
//! stockroom archive-sales
//! ```
//!
//! # Environment Variables
//!
//! - `STOCKROOM_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use stockroom_core::EmployeeRole;

mod commands;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    /// Archive every unarchived sale
    ArchiveSales,
}

#[derive(Subcommand)]
enum EmployeeAction {
    /// Create a new employee
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `employee`)
        #[arg(short, long, default_value = "employee")]
        role: EmployeeRole,

        /// Phone number, 9 to 15 digits
        #[arg(long)]
        contact: String,

        /// Postal address
        #[arg(long, default_value = "")]
        address: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Employee { action } => match action {
            EmployeeAction::Create {
                username,
                email,
                name,
                role,
                contact,
                address,
            } => {
                commands::employee::create(&commands::employee::NewEmployeeArgs {
                    username,
                    email,
                    name,
                    role,
                    contact,
                    address,
                })
                .await?;
            }
        },
        Commands::ArchiveSales => {
            commands::sales::archive().await?;
        }
    }
    Ok(())
}
