mod cmd;

use clap::{Parser, Subcommand};

/// Personal finance calculators: income tax regimes, credit score, debt payoff
/// and capital gains.
#[derive(Parser, Debug)]
#[command(name = "fincalc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare old and new income tax regimes for a profile
    Tax(cmd::tax::TaxCommand),
    /// Score a credit profile and suggest improvements
    Credit(cmd::credit::CreditCommand),
    /// Simulate snowball and avalanche debt repayment
    Debt(cmd::debt::DebtCommand),
    /// Classify realised capital gains from a broker export
    Gains(cmd::gains::GainsCommand),
    /// Print the JSON Schema for an input document
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tax(tax) => tax.exec(),
        Command::Credit(credit) => credit.exec(),
        Command::Debt(debt) => debt.exec(),
        Command::Gains(gains) => gains.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
