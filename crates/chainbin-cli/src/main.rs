//! chainbin: notes on a blockchain key/value store
//!
//! Commands:
//!   view <note-id>          - fetch a note, decrypting it if needed
//!   status <account>        - show tracked submissions for an account
//!   resolve <account> <tx>  - reconcile a submission against its receipt
//!   height                  - current chain height
//!   expiry <block>          - wall-clock estimate for a block height
//!   config show             - display the active configuration
//!
//! Submitting a note needs a signing wallet and happens in the web app;
//! this tool covers the read side and the local submission ledger.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use chainbin_chain::{estimate_expiry, EntityReader, RpcClient};
use chainbin_core::config::ChainbinConfig;
use chainbin_crypto::KdfParams;
use chainbin_ledger::{expand_tilde, JsonFileKv, Ledger, TxState};
use chainbin_note::Note;

// ── CLI structure ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "chainbin",
    version,
    about = "Notes on a blockchain key/value store",
    long_about = "chainbin: view notes stored on the chain and track your own submissions"
)]
struct Cli {
    /// Path to chainbin.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "CHAINBIN_CONFIG",
        default_value = "~/.config/chainbin/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and display a note by its entity id
    View {
        note_id: String,
        /// Decryption password (prompted for when omitted and needed)
        #[arg(long, short = 'p')]
        password: Option<String>,
        /// Also print the note's metadata
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Show tracked submissions for a wallet account
    Status {
        account: String,
    },

    /// Reconcile a pending submission against its mined receipt
    Resolve {
        account: String,
        tx_id: String,
    },

    /// Print the current chain height
    Height,

    /// Estimate the wall-clock time of a block height
    Expiry {
        block: u64,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::View {
            note_id,
            password,
            verbose,
        } => cmd_view(&config, &note_id, password, verbose).await,
        Commands::Status { account } => cmd_status(&config, &account),
        Commands::Resolve { account, tx_id } => cmd_resolve(&config, &account, &tx_id).await,
        Commands::Height => cmd_height(&config).await,
        Commands::Expiry { block } => cmd_expiry(&config, block).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

async fn load_config(path: &Path) -> Result<ChainbinConfig> {
    let path = expand_tilde(path);
    if path.exists() {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(ChainbinConfig::default())
    }
}

fn open_ledger(config: &ChainbinConfig) -> Ledger<JsonFileKv> {
    Ledger::new(JsonFileKv::new(expand_tilde(&config.ledger.dir)))
}

fn format_local(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%A, %B %e, %Y %H:%M:%S")
        .to_string()
}

// ── `chainbin view` ───────────────────────────────────────────────────────────

async fn cmd_view(
    config: &ChainbinConfig,
    note_id: &str,
    password: Option<String>,
    verbose: bool,
) -> Result<()> {
    let client = RpcClient::new(&config.chain)?;

    let Some(note) = Note::fetch(&client, note_id).await? else {
        println!("Note not found. It may never have existed or its TTL may have run out.");
        return Ok(());
    };

    if verbose {
        print_metadata(config, &client, note_id, &note).await?;
    }

    let note = if note.is_encrypted() {
        if !config.note.encryption_enabled {
            anyhow::bail!("note is encrypted but encryption support is disabled in the config");
        }
        let password = match password {
            Some(p) => SecretString::from(p),
            None => SecretString::from(
                rpassword::prompt_password("Password: ").context("reading password")?,
            ),
        };

        // The KDF runs a million PBKDF2 rounds; keep it off the runtime.
        let kdf = KdfParams::default();
        tokio::task::spawn_blocking(move || note.decrypt(&password, &kdf))
            .await
            .context("decryption task")??
    } else {
        note
    };

    let text = note.plaintext().context("note payload is not readable")?;
    println!("{text}");
    Ok(())
}

async fn print_metadata(
    config: &ChainbinConfig,
    client: &RpcClient,
    note_id: &str,
    note: &Note,
) -> Result<()> {
    println!("Note id:   {note_id}");
    if let Some(created) = DateTime::from_timestamp(note.metadata.created_at(), 0) {
        println!("Created:   {}", format_local(created));
    }
    println!("Language:  {}", note.metadata.language());
    println!(
        "Encrypted: {}",
        if note.metadata.encrypted() { "yes" } else { "no" }
    );
    if let Some(expires_at_block) = note.metadata.expires_at_block() {
        let current = client.current_block_height().await?;
        let estimate = estimate_expiry(expires_at_block, current, config.chain.block_interval_secs);
        println!(
            "Expires:   block {expires_at_block} (≈ {})",
            format_local(estimate)
        );
    }
    println!();
    Ok(())
}

// ── `chainbin status` ─────────────────────────────────────────────────────────

fn cmd_status(config: &ChainbinConfig, account: &str) -> Result<()> {
    let ledger = open_ledger(config);
    let entries = ledger.list(account)?;

    if entries.is_empty() {
        println!("No tracked submissions for {account}.");
        return Ok(());
    }

    for (tx_id, state) in entries {
        match state {
            TxState::Pending => println!("{tx_id}  pending"),
            TxState::Complete {
                note_id,
                expiration_date,
            } => println!(
                "{tx_id}  complete  note {note_id}  expires {}",
                format_local(expiration_date)
            ),
        }
    }
    Ok(())
}

// ── `chainbin resolve` ────────────────────────────────────────────────────────

async fn cmd_resolve(config: &ChainbinConfig, account: &str, tx_id: &str) -> Result<()> {
    let client = RpcClient::new(&config.chain)?;

    let Some(receipt) = client.transaction_receipt(tx_id).await? else {
        println!("Transaction not mined yet; try again in a few blocks.");
        return Ok(());
    };

    let current_block = client.current_block_height().await?;
    let ledger = open_ledger(config);
    let data = ledger.resolve(
        account,
        tx_id,
        &receipt,
        current_block,
        config.chain.block_interval_secs,
    )?;

    println!("Note created.");
    println!("id:      {}", data.note_id);
    println!("expires: {}", format_local(data.expiration_date));
    Ok(())
}

// ── `chainbin height` / `chainbin expiry` ─────────────────────────────────────

async fn cmd_height(config: &ChainbinConfig) -> Result<()> {
    let client = RpcClient::new(&config.chain)?;
    println!("{}", client.current_block_height().await?);
    Ok(())
}

async fn cmd_expiry(config: &ChainbinConfig, block: u64) -> Result<()> {
    let client = RpcClient::new(&config.chain)?;
    let current = client.current_block_height().await?;
    let estimate = estimate_expiry(block, current, config.chain.block_interval_secs);

    if block < current {
        println!("Block {block} has already passed (≈ {}).", format_local(estimate));
    } else {
        println!("{}", format_local(estimate));
    }
    Ok(())
}

// ── `chainbin config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &ChainbinConfig, path: &Path) -> Result<()> {
    println!("# config file: {}", path.display());
    print!("{}", toml::to_string_pretty(config).context("serializing config")?);
    Ok(())
}
