//! DevConnect Admin CLI
//!
//! Administration tool for managing user accounts directly in the store.
//!
//! # Usage
//!
//! ```bash
//! devconnect-admin user add erik@example.com --name Erik --password hunter22
//! devconnect-admin user list
//! devconnect-admin user remove erik@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `DEVCONNECT_DATABASE_PATH`: path to the SQLite database
//! - `DEVCONNECT_CONFIG`: path to the YAML config file

use clap::{Args, Parser, Subcommand};

use devconnect::config::Config;
use devconnect::db::{init_db, UserRepository};
use devconnect::models::User;
use devconnect::server::users::{avatar_url, hash_password};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "devconnect-admin")]
#[command(version)]
#[command(about = "DevConnect server administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User(UserCommand),
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new user
    Add {
        /// User's email address
        email: String,
        /// User's display name
        #[arg(long, short)]
        name: String,
        /// Initial password
        #[arg(long, short)]
        password: String,
    },
    /// List all users
    List,
    /// Remove a user and their auth tokens
    Remove {
        /// User's email address
        email: String,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn add_user(
    repo: &UserRepository,
    email: String,
    name: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    if repo.get_by_email(&email).await?.is_some() {
        eprintln!("Error: User '{}' already exists", email);
        std::process::exit(1);
    }

    let user = User::new(&name, &email, hash_password(&password), avatar_url(&email));
    repo.create(&user).await?;

    println!("Added user: {}", email);
    println!("  Id: {}", user.id);
    println!("  Name: {}", name);
    Ok(())
}

async fn list_users(repo: &UserRepository) -> Result<(), Box<dyn std::error::Error>> {
    let users = repo.list().await?;

    if users.is_empty() {
        println!("No users");
        return Ok(());
    }

    for user in users {
        println!("{}  {}  {}", user.id, user.email, user.name);
    }
    Ok(())
}

async fn remove_user(
    repo: &UserRepository,
    email: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = match repo.get_by_email(&email).await? {
        Some(user) => user,
        None => {
            eprintln!("Error: User '{}' not found", email);
            std::process::exit(1);
        }
    };

    repo.revoke_tokens(user.id).await?;
    repo.delete(user.id).await?;

    println!("Removed user: {}", email);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(None)?;
    let pool = init_db(&config.database_path).await?;
    let repo = UserRepository::new(pool);

    match cli.command {
        Commands::User(cmd) => match cmd.command {
            UserSubcommand::Add {
                email,
                name,
                password,
            } => add_user(&repo, email, name, password).await?,
            UserSubcommand::List => list_users(&repo).await?,
            UserSubcommand::Remove { email } => remove_user(&repo, email).await?,
        },
    }

    Ok(())
}
