//! Account administration for flowtime
//!
//! There is no signup page; accounts are created and re-keyed here against
//! the same database the server uses.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use common::database::{self, DatabaseConfig};
use tracker::{
    logging,
    models::NewUser,
    repositories::{PgUserRepository, UserRepository, postgres::MIGRATOR},
};

#[derive(Parser, Debug)]
#[command(name = "flowtime-user", version, about = "Manage flowtime accounts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Add { username: String, password: String },
    /// Replace the password of an existing account
    SetPassword { username: String, password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("warn,tracker=info")?;

    let cli = Cli::parse();

    let pool = database::init_pool(&DatabaseConfig::from_env()?).await?;
    database::run_migrations(&pool, &MIGRATOR).await?;
    let users = PgUserRepository::new(pool);

    match cli.command {
        Command::Add { username, password } => {
            if users.find_by_username(&username).await?.is_some() {
                bail!("user {} already exists", username);
            }
            let user = users.create(&NewUser { username, password }).await?;
            info!("Created user {} ({})", user.username, user.id);
            println!("created {}", user.username);
        }
        Command::SetPassword { username, password } => {
            let Some(mut user) = users.find_by_username(&username).await? else {
                bail!("user {} not found", username);
            };
            user.set_password(&password)?;
            if !users.update_password(&user).await? {
                bail!("user {} disappeared during update", username);
            }
            println!("password updated for {}", user.username);
        }
    }

    Ok(())
}
