use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use poolview::cli::pools::PoolsOptions;
use poolview::core::log::init_logging;
use poolview::core::view::SortColumn;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for poolview::AppCommand {
    fn from(cmd: Commands) -> poolview::AppCommand {
        match cmd {
            Commands::Pools {
                hide_token,
                hide_chain,
                sort,
            } => poolview::AppCommand::Pools(PoolsOptions {
                hide_tokens: hide_token,
                hide_chains: hide_chain,
                sort,
            }),
            Commands::Positions { account } => poolview::AppCommand::Positions { account },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display every pool with TVL, APR and the account's balance
    Pools {
        /// Hide pools of a token (repeatable)
        #[arg(long)]
        hide_token: Vec<String>,

        /// Hide pools on a chain (repeatable)
        #[arg(long)]
        hide_chain: Vec<String>,

        /// Sort by column: tvl, userBalance, apr, stakingApr, totalApr.
        /// Repeating a column flips the direction.
        #[arg(short, long)]
        sort: Vec<SortColumn>,
    },
    /// Display the pools an account holds liquidity in
    Positions {
        /// Account address, overrides the configured one
        #[arg(short, long)]
        account: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => poolview::cli::setup::setup(),
        Some(cmd) => poolview::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
