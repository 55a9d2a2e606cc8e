use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use time::Date;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    client::{ApiClient, ClientError},
    dashboard::{self, Dashboard},
    database_id::TransactionId,
    transaction::{Transaction, TransactionPatch, TransactionType, parse_date},
};

/// A terminal dashboard for the fintrack API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the fintrack server.
    #[arg(long, env = "API_URL", default_value = "http://localhost:4000")]
    api_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show totals, the category breakdown and all transactions.
    Show,
    /// Show only the transaction list.
    List,
    /// Record a new transaction.
    Add(AddArgs),
    /// Change some fields of a transaction.
    Edit(EditArgs),
    /// Delete a transaction.
    Delete {
        /// The transaction ID.
        id: TransactionId,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    amount: f64,

    /// Either "income" or "expense".
    #[arg(long = "type")]
    kind: TransactionType,

    #[arg(long)]
    category: Option<String>,

    /// Date as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<Date>,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// The transaction ID.
    id: TransactionId,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    amount: Option<f64>,

    /// Either "income" or "expense".
    #[arg(long = "type")]
    kind: Option<TransactionType>,

    #[arg(long, conflicts_with = "clear_category")]
    category: Option<String>,

    /// Date as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date_arg, conflicts_with = "clear_date")]
    date: Option<Date>,

    /// Remove the category.
    #[arg(long)]
    clear_category: bool,

    /// Remove the date.
    #[arg(long)]
    clear_date: bool,
}

impl EditArgs {
    fn to_patch(&self) -> TransactionPatch {
        TransactionPatch {
            title: self.title.clone(),
            amount: self.amount,
            kind: self.kind,
            category: if self.clear_category {
                Some(None)
            } else {
                self.category.clone().map(Some)
            },
            txn_date: if self.clear_date {
                Some(None)
            } else {
                self.date.map(Some)
            },
        }
    }
}

fn parse_date_arg(text: &str) -> Result<Date, String> {
    parse_date(text).map_err(|error| error.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url);

    match run(&client, cli.command.unwrap_or(Command::Show)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!("Request to {} failed: {error}", client.base_url());
            eprintln!("Something went wrong, please try again.");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &ApiClient, command: Command) -> Result<(), ClientError> {
    let dashboard = match command {
        Command::Show => Dashboard::fetch(client).await?,
        Command::List => {
            let dashboard = Dashboard::fetch(client).await?;
            print!("{}", dashboard.transaction_table());
            return Ok(());
        }
        Command::Add(args) => {
            let transaction = Transaction::build(&args.title, args.amount, args.kind)
                .category(args.category.as_deref())
                .txn_date(args.date);

            dashboard::add_transaction(client, &transaction).await?
        }
        Command::Edit(args) => {
            dashboard::edit_transaction(client, args.id, &args.to_patch()).await?
        }
        Command::Delete { id } => dashboard::delete_transaction(client, id).await?,
    };

    print!("{dashboard}");

    Ok(())
}

fn setup_logging() {
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_log)
        .init();
}
