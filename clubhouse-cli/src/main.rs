//! # Clubhouse Admin CLI
//!
//! Command-line administration for the club activity service. Talks to the
//! same database as the API server; used for bootstrapping the first admin
//! account and handing out invitation codes.
//!
//! ## Usage
//!
//! ```bash
//! clubhouse-cli create-user --username alice --email alice@example.com --role admin
//! clubhouse-cli generate-invite-code --role organizer
//! clubhouse-cli list-invite-codes
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use clubhouse_shared::auth::password;
use clubhouse_shared::db::migrations::run_migrations;
use clubhouse_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use clubhouse_shared::models::invitation_code::InvitationCode;
use clubhouse_shared::models::user::{CreateUser, Role, User};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clubhouse-cli")]
#[command(about = "Administration commands for the Clubhouse service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a user account directly, bypassing invitation codes
    CreateUser {
        /// Unique username
        #[arg(long)]
        username: String,

        /// Unique email address
        #[arg(long)]
        email: String,

        /// Plaintext password, hashed before storage
        #[arg(long)]
        password: String,

        /// Role for the account: user, organizer or admin
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
    },

    /// Mint a single-use invitation code
    GenerateInviteCode {
        /// Role the code grants on registration: user, organizer or admin
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
    },

    /// List all invitation codes, newest first
    ListInviteCodes,
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse_cli=info,clubhouse_shared=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL environment variable is required")?;

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    run_migrations(&pool).await?;

    match cli.command {
        Command::CreateUser {
            username,
            email,
            password,
            role,
        } => create_user(&pool, username, email, &password, role).await?,
        Command::GenerateInviteCode { role } => generate_invite_code(&pool, role).await?,
        Command::ListInviteCodes => list_invite_codes(&pool).await?,
    }

    close_pool(pool).await;

    Ok(())
}

async fn create_user(
    pool: &PgPool,
    username: String,
    email: String,
    plaintext: &str,
    role: Role,
) -> anyhow::Result<()> {
    if plaintext.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let password_hash = password::hash_password(plaintext)?;

    let user = User::create(
        pool,
        CreateUser {
            username,
            email,
            password_hash,
            role,
        },
    )
    .await
    .context("Failed to create user (username or email may already exist)")?;

    println!(
        "Created user {} ({}) with role {}",
        user.username,
        user.id,
        user.role.as_str()
    );

    Ok(())
}

async fn generate_invite_code(pool: &PgPool, role: Role) -> anyhow::Result<()> {
    let invite = InvitationCode::create(pool, role).await?;

    println!(
        "Invitation code (grants {}): {}",
        invite.role.as_str(),
        invite.code
    );

    Ok(())
}

async fn list_invite_codes(pool: &PgPool) -> anyhow::Result<()> {
    let codes = InvitationCode::list(pool).await?;

    if codes.is_empty() {
        println!("No invitation codes");
        return Ok(());
    }

    println!("{:<24} {:<10} {:<6} CREATED", "CODE", "ROLE", "USED");
    for code in codes {
        println!(
            "{:<24} {:<10} {:<6} {}",
            code.code,
            code.role.as_str(),
            if code.is_used { "yes" } else { "no" },
            code.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
