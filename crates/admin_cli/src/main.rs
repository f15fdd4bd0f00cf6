use std::{error::Error, io::Write};

use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{Engine, HistoryRange};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ledgerbot_admin")]
#[command(about = "Admin utilities for the ledger database")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledger.db?mode=rwc"
    )]
    database_url: String,

    /// IANA time zone used for calendar days and exported timestamps.
    #[arg(long, default_value = "UTC")]
    timezone: Tz,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the schema and exit.
    Migrate {
        #[arg(value_enum, default_value_t = Migration::Up)]
        action: Migration,
    },
    Balance(Conversation),
    Turnover(Conversation),
    History(HistoryArgs),
    /// Write every entry of a chat as CSV to stdout.
    Export(Conversation),
    /// Print today's summary of every chat.
    Summary,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Migration {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Args, Debug)]
struct Conversation {
    /// Chat id the ledger belongs to.
    #[arg(long)]
    conversation: String,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[command(flatten)]
    conversation: Conversation,
    /// `3d`, `19/02`, or nothing for today.
    range: Option<String>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn migrate(
    database_url: &str,
    action: Migration,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    match action {
        Migration::Up => migration::Migrator::up(&db, None).await?,
        Migration::Down => migration::Migrator::down(&db, None).await?,
        Migration::Fresh => migration::Migrator::fresh(&db).await?,
        Migration::Status => migration::Migrator::status(&db).await?,
    }
    println!("migration {action:?} done");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    if let Command::Migrate { action } = cli.command {
        return migrate(&cli.database_url, action).await;
    }

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .timezone(cli.timezone)
        .build()
        .await?;

    match cli.command {
        Command::Migrate { .. } => {}
        Command::Balance(args) => {
            println!("{}", engine.balance(&args.conversation).await?);
        }
        Command::Turnover(args) => {
            let turnover = engine.turnover(&args.conversation).await?;
            println!("transactions: {}", turnover.count);
            println!("turnover: {}", turnover.volume);
        }
        Command::History(args) => {
            let range = match HistoryRange::parse(args.range.as_deref()) {
                Ok(range) => range,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let history = engine
                .history(&args.conversation.conversation, range, Utc::now())
                .await?;
            for tx in &history.transactions {
                println!("{tx}");
            }
            println!("net: {}", history.net);
        }
        Command::Export(args) => {
            let transactions = engine.export(&args.conversation).await?;
            let data = telegram_bot::export::render_csv(&transactions, cli.timezone)?;
            let mut out = std::io::stdout().lock();
            out.write_all(&data)?;
            out.flush()?;
        }
        Command::Summary => {
            let summaries = engine.daily_summary(Utc::now()).await?;
            if summaries.is_empty() {
                println!("No transactions today.");
            }
            for summary in summaries {
                println!(
                    "{}: {} transactions, in {}, out {}, net {}",
                    summary.conversation_key,
                    summary.count,
                    summary.credits,
                    summary.debits,
                    summary.net()
                );
            }
        }
    }

    Ok(())
}
