mod cmd;

use clap::{Parser, Subcommand};
use cmd::{
    analyze::AnalyzeCommand, itr::ItrCommand, schema::SchemaCommand, slabs::SlabsCommand,
    tax::TaxCommand,
};

#[derive(Parser, Debug)]
#[command(name = "coinwise", version, about = "Analyze spending and calculate Indian income tax")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals, category breakdown and expense ratios for categorised transactions
    Analyze(AnalyzeCommand),
    /// Progressive slab tax on income after deductions
    Tax(TaxCommand),
    /// ITR-1 field summary for the computed tax
    Itr(ItrCommand),
    /// List available tax slab tables
    Slabs(SlabsCommand),
    /// Print expected input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(cmd) => cmd.exec(),
        Command::Tax(cmd) => cmd.exec(),
        Command::Itr(cmd) => cmd.exec(),
        Command::Slabs(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
