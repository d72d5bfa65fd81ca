//! The `vale` CLI: zero-interest loans against tokenized validators.

use clap::Parser;
use eyre::Result;

mod cmd;
mod opts;
mod utils;

use cmd::{
    borrow::BorrowArgs,
    register::RegisterArgs,
    token::{ApprovedArgs, OwnerArgs},
};

#[derive(Debug, Parser)]
#[command(name = "vale", version, about = "Zero-interest loans against tokenized validators")]
struct Vale {
    #[command(subcommand)]
    cmd: ValeSubcommand,
}

#[derive(Debug, Parser)]
enum ValeSubcommand {
    /// Deposit a validator NFT as collateral and take a zero-interest loan.
    #[command(visible_alias = "b")]
    Borrow(BorrowArgs),

    /// Register a validator with the off-chain collateral service.
    Register(RegisterArgs),

    /// Show the current owner of a validator NFT.
    Owner(OwnerArgs),

    /// Show the approved spender of a validator NFT.
    Approved(ApprovedArgs),
}

fn main() -> Result<()> {
    utils::load_dotenv();
    utils::subscriber();
    let args = Vale::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Vale) -> Result<()> {
    match args.cmd {
        ValeSubcommand::Borrow(args) => args.run().await,
        ValeSubcommand::Register(args) => args.run().await,
        ValeSubcommand::Owner(args) => args.run().await,
        ValeSubcommand::Approved(args) => args.run().await,
    }
}
