//! Signer and operator CLI for the custody ledger.

use anyhow::Result;
use colored::Colorize;
use custody_cli::commands::{
    approve, authorize, balance, deposit, export_seed, init_seed, load_wallet, parse_amount,
    set_signer, withdraw,
};
use custody_cli::WalletConfig;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments for the CLI.
#[derive(Debug, StructOpt)]
#[structopt(name = "custody", about = "Custody ledger signer and wallet")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Path to the wallet file
    #[structopt(short, long, parse(from_os_str))]
    wallet: Option<PathBuf>,

    /// Node to connect to
    #[structopt(short, long)]
    node: Option<String>,

    /// Account index to derive
    #[structopt(long)]
    account_index: Option<u32>,

    /// Subcommand to run
    #[structopt(subcommand)]
    cmd: Command,
}

/// Subcommands for the CLI.
#[derive(Debug, StructOpt)]
enum Command {
    /// Initialize a new seed
    #[structopt(name = "init-seed")]
    InitSeed {
        /// Restore from an existing 24-word mnemonic instead
        #[structopt(long)]
        phrase: Option<String>,
    },

    /// Export the seed
    #[structopt(name = "export-seed")]
    ExportSeed,

    /// Print the wallet address
    #[structopt(name = "address")]
    Address,

    /// Sign a withdrawal authorization (signer only)
    #[structopt(name = "authorize")]
    Authorize {
        /// Account allowed to withdraw
        #[structopt(long)]
        account: String,

        /// Amount in base units
        #[structopt(long)]
        amount: String,
    },

    /// Recover the signer of a withdrawal authorization
    #[structopt(name = "verify")]
    Verify {
        /// Account the authorization is for
        #[structopt(long)]
        account: String,

        /// Amount in base units
        #[structopt(long)]
        amount: String,

        /// Hex-encoded 65-byte signature
        #[structopt(long)]
        signature: String,
    },

    /// Approve the ledger to pull tokens
    #[structopt(name = "approve")]
    Approve {
        /// Amount in base units
        #[structopt(long)]
        amount: String,
    },

    /// Deposit tokens into the ledger
    #[structopt(name = "deposit")]
    Deposit {
        /// Amount in base units
        #[structopt(long)]
        amount: String,

        /// Approve the ledger first if the allowance is short
        #[structopt(long)]
        approve: bool,
    },

    /// Withdraw tokens from the ledger
    #[structopt(name = "withdraw")]
    Withdraw {
        /// Amount in base units
        #[structopt(long)]
        amount: String,

        /// Signer's authorization, as printed by `authorize`
        #[structopt(long)]
        signature: Option<String>,
    },

    /// Replace the authorized signer (owner only)
    #[structopt(name = "set-signer")]
    SetSigner {
        /// New signer address
        #[structopt(long)]
        signer: String,
    },

    /// Get the deposited and token balances of an account
    #[structopt(name = "balance")]
    Balance {
        /// Account to query, defaults to the wallet
        #[structopt(long)]
        account: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let opt = Opt::from_args();

    let mut config = match &opt.config {
        Some(path) => WalletConfig::from_file(path)?,
        None => WalletConfig::default(),
    };
    if let Some(node) = opt.node {
        config.node = node;
    }

    let wallet_file = match opt.wallet {
        Some(path) => path,
        None => {
            let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push("custody");
            dir.push("wallet.dat");
            dir
        }
    };
    if let Some(parent) = wallet_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Persist a new account index before running the command. init-seed
    // creates the wallet and takes the index itself.
    if let Some(index) = opt.account_index {
        if !matches!(opt.cmd, Command::InitSeed { .. }) {
            let mut wallet = load_wallet(&wallet_file)?;
            wallet.set_account_index(index);
            wallet.save(&wallet_file)?;
        }
    }

    match opt.cmd {
        Command::InitSeed { phrase } => {
            let address =
                init_seed::run(&wallet_file, phrase.as_deref(), opt.account_index).await?;
            println!("{} {}", "Seed initialized:".green(), wallet_file.display());
            println!("{} {:?}", "Address:".green(), address);
        }
        Command::ExportSeed => {
            let seed = export_seed::run(&wallet_file).await?;
            println!("{} {}", "Seed:".green(), seed);
            println!("{}", "WARNING: Keep this seed safe and private!".red());
        }
        Command::Address => {
            let wallet = load_wallet(&wallet_file)?;
            println!("{} {:?}", "Address:".green(), wallet.address()?);
        }
        Command::Authorize { account, amount } => {
            let signature = authorize::run(&wallet_file, &account, parse_amount(&amount)?).await?;
            println!("{} 0x{}", "Signature:".green(), hex::encode(&signature));
        }
        Command::Verify { account, amount, signature } => {
            let signer = authorize::verify(&account, parse_amount(&amount)?, &signature)?;
            println!("{} {:?}", "Signed by:".green(), signer);
        }
        Command::Approve { amount } => {
            let receipt = approve::run(&config, &wallet_file, parse_amount(&amount)?).await?;
            println!("{} #{}", "Approved in receipt".green(), receipt.index);
        }
        Command::Deposit { amount, approve } => {
            let receipt =
                deposit::run(&config, &wallet_file, parse_amount(&amount)?, approve).await?;
            println!("{} #{}", "Deposited in receipt".green(), receipt.index);
            for event in &receipt.events {
                println!("  {}", event);
            }
        }
        Command::Withdraw { amount, signature } => {
            let receipt = withdraw::run(
                &config,
                &wallet_file,
                parse_amount(&amount)?,
                signature.as_deref(),
            )
            .await?;
            println!("{} #{}", "Withdrew in receipt".green(), receipt.index);
            for event in &receipt.events {
                println!("  {}", event);
            }
        }
        Command::SetSigner { signer } => {
            let receipt = set_signer::run(&config, &wallet_file, &signer).await?;
            println!("{} #{}", "Signer changed in receipt".green(), receipt.index);
        }
        Command::Balance { account } => {
            let balances = balance::run(&config, &wallet_file, account.as_deref()).await?;
            println!("{} {:?}", "Account:".green(), balances.account);
            println!("{} {}", "Deposited:".green(), balances.deposited);
            println!("{} {}", "Token balance:".green(), balances.token);
        }
    }

    Ok(())
}
