use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use helmios_api::{crypto, service};
use helmios_server::config::AppConfig;
use helmios_server::error::StoreError;
use helmios_server::storage;

#[derive(Parser)]
#[command(
    name = "helmios-server",
    version,
    about = "helmios - invite-only signup and login server"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Manage invite codes
    Invite {
        #[command(subcommand)]
        action: InviteAction,
    },
}

#[derive(Subcommand)]
enum InviteAction {
    /// Create an invite code (random when omitted)
    Create {
        /// The code to issue
        code: Option<String>,
    },
    /// List outstanding invite codes
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helmios_server=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => helmios_server::serve(config).await,
        Commands::Invite { action } => run_invite(&config, action),
    }
}

fn run_invite(config: &AppConfig, action: InviteAction) -> anyhow::Result<()> {
    let db = storage::init_db(&config.data_dir)?;

    match action {
        InviteAction::Create { code } => {
            let code = match code {
                Some(raw) => match service::normalize_invite_code(&raw) {
                    Some(code) => code,
                    None => bail!("invite code must be 1-64 non-blank characters"),
                },
                None => crypto::generate_invite_code(),
            };
            match db.create_invite_code(&code) {
                Ok(invite) => println!("{}", invite.code),
                Err(StoreError::UniqueViolation(_)) => bail!("invite code {code} already exists"),
                Err(e) => return Err(e).context("creating invite code"),
            }
        }
        InviteAction::List => {
            let invites = db.list_invite_codes().context("listing invite codes")?;
            if invites.is_empty() {
                println!("No outstanding invite codes.");
            }
            for invite in invites {
                println!("{}\t{}", invite.code, invite.created_at);
            }
        }
    }

    Ok(())
}
