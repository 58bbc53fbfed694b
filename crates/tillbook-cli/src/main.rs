//! Tillbook - record a shop's daily sales and expenses from the terminal.
//!
//! Entries go to the configured spreadsheet service; anything that cannot
//! be sent is kept in a local offline queue.

mod output;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tillbook_core::utils::{parse_day, today};
use tillbook_core::{
    configure_endpoint, Config, ExpenseDraft, FileStore, KeyValueStore, LocalStore, MonthKey,
    Reconciliation, SalesForm, Session, SheetKind, Till,
};

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "tillbook.log";

#[derive(Parser)]
#[command(
    name = "tillbook",
    version,
    about = "Record daily sales and expenses, online or offline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to a spreadsheet web-app deployment
    Setup { url: String },
    /// Show or set the staff name stamped on entries
    Staff { name: Option<String> },
    /// Reconcile the till and submit the day's sales
    Sales(SalesArgs),
    /// Record a single expense
    Expense {
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "cash")]
        method: String,
        /// YYYY-MM-DD, today, yesterday or tomorrow
        #[arg(long, value_parser = day_arg)]
        date: Option<NaiveDate>,
    },
    /// Show the cash baseline for a day
    Balance {
        /// YYYY-MM-DD, today, yesterday or tomorrow
        #[arg(long, value_parser = day_arg)]
        date: Option<NaiveDate>,
    },
    /// Show the monthly summary
    Summary {
        /// YYYY-MM, prev or next (defaults to this month)
        #[arg(long)]
        month: Option<String>,
    },
    /// List raw sheet entries for a month
    Entries {
        sheet: SheetArg,
        /// YYYY-MM, prev or next (defaults to this month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Show or clear the offline queue
    Queue {
        #[command(subcommand)]
        action: Option<QueueAction>,
    },
    /// Show or update where data is kept and how long requests may take
    Config {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Manage cached summaries
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// Discard every queued entry
    Clear,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop every cached summary
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum SheetArg {
    Sales,
    Expenses,
}

impl From<SheetArg> for SheetKind {
    fn from(sheet: SheetArg) -> Self {
        match sheet {
            SheetArg::Sales => SheetKind::Sales,
            SheetArg::Expenses => SheetKind::Expenses,
        }
    }
}

/// Sales form fields, as typed. Unparseable amounts count as zero.
#[derive(Args)]
struct SalesArgs {
    /// YYYY-MM-DD, today, yesterday or tomorrow
    #[arg(long, value_parser = day_arg)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    cash_sale: String,
    #[arg(long, default_value = "")]
    bank_sale: String,
    #[arg(long, default_value = "")]
    cash_in_hand: String,
    #[arg(long, default_value = "")]
    cash_in_bank: String,
    /// Defaults to the withdrawal recorded for the day
    #[arg(long)]
    cash_withdrawal: Option<String>,
    #[arg(long, default_value = "")]
    swiggy: String,
    #[arg(long, default_value = "")]
    zomato: String,
    #[arg(long, default_value = "")]
    swiggy_payout: String,
    #[arg(long, default_value = "")]
    zomato_payout: String,
    #[arg(long, default_value = "")]
    oil: String,
    #[arg(long, default_value = "")]
    water_can: String,
    #[arg(long, default_value = "")]
    water_bottle: String,
    #[arg(long, default_value = "")]
    misc: String,
    /// Show the reconciliation without submitting
    #[arg(long)]
    dry_run: bool,
}

impl SalesArgs {
    fn form(&self) -> SalesForm {
        SalesForm {
            cash_sale: self.cash_sale.clone(),
            bank_sale: self.bank_sale.clone(),
            cash_in_hand: self.cash_in_hand.clone(),
            cash_in_bank: self.cash_in_bank.clone(),
            cash_withdrawal: self.cash_withdrawal.clone().unwrap_or_default(),
            swiggy: self.swiggy.clone(),
            zomato: self.zomato.clone(),
            swiggy_payout: self.swiggy_payout.clone(),
            zomato_payout: self.zomato_payout.clone(),
            oil: self.oil.clone(),
            water_can: self.water_can.clone(),
            water_bottle: self.water_bottle.clone(),
            misc: self.misc.clone(),
        }
    }
}

fn day_arg(value: &str) -> Result<NaiveDate, String> {
    parse_day(value, today())
        .ok_or_else(|| {
            format!("expected YYYY-MM-DD, today, yesterday or tomorrow, got {:?}", value)
        })
}

fn month_arg(value: Option<&str>) -> MonthKey {
    MonthKey::resolve(value.unwrap_or_default(), MonthKey::current())
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the stderr level (default `warn`). When a log
/// directory is available, everything at `info` and above is also written
/// to a daily log file there.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_filter(filter);

    let file = log_dir
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| {
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
        });

    match file {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(stderr_layer).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(config.log_dir().ok());

    if let Command::Config {
        data_dir,
        timeout_secs,
    } = &cli.command
    {
        if data_dir.is_some() || timeout_secs.is_some() {
            config.data_dir = data_dir.clone().or(config.data_dir);
            config.request_timeout_secs = timeout_secs.or(config.request_timeout_secs);
            config.save().context("Failed to save configuration")?;
        }
        println!("Data directory:  {}", config.data_dir()?.display());
        println!("Request timeout: {}s", config.request_timeout().as_secs());
        return Ok(());
    }

    let store_dir = config.store_dir()?;
    let backing: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::new(store_dir.clone())
            .with_context(|| format!("Failed to open store at {}", store_dir.display()))?,
    );
    let store = LocalStore::new(backing);
    info!(store = %store_dir.display(), "Tillbook starting");

    match &cli.command {
        Command::Setup { url } => {
            let url = configure_endpoint(&store, url, config.request_timeout()).await?;
            println!("Setup complete. Entries will be sent to {}", url);
            return Ok(());
        }
        Command::Staff { name: Some(name) } => {
            store.save_staff_name(name).context("Failed to save staff name")?;
            println!("Staff name set to {}", name.trim());
            return Ok(());
        }
        _ => {}
    }

    let session =
        Session::load(&store).with_endpoint_override(Config::endpoint_override());
    let till = Till::connect(store, session, config.request_timeout())?;

    match cli.command {
        Command::Setup { .. } | Command::Config { .. } => {}
        Command::Staff { name: _ } => {
            let staff = till.session().staff_name();
            if staff.is_empty() {
                println!("No staff name set; entries are recorded as {}", till.session().submitting_staff());
            } else {
                println!("{}", staff);
            }
        }
        Command::Sales(args) => run_sales(&till, &args).await,
        Command::Expense {
            category,
            amount,
            method,
            date,
        } => {
            let draft = ExpenseDraft {
                date: Some(date.unwrap_or_else(today)),
                payment_method: method.parse()?,
                category: Some(category.parse()?),
                amount,
            };
            let outcome = till.submit_expense(&draft).await?;
            println!("{}", outcome.message());
        }
        Command::Balance { date } => {
            let date = date.unwrap_or_else(today);
            output::print_balance(date, &till.cash_balance(date).await);
        }
        Command::Summary { month } => {
            let month = month_arg(month.as_deref());
            run_summary(&till, &month).await;
        }
        Command::Entries { sheet, month } => {
            let month = month_arg(month.as_deref());
            let table = till
                .entries(sheet.into(), &month)
                .await
                .with_context(|| format!("Failed to load entries for {}", month.display_long()))?;
            output::print_entries(&table);
        }
        Command::Queue { action: None } => output::print_queue(&till.offline_queue()),
        Command::Queue {
            action: Some(QueueAction::Clear),
        } => {
            let count = till.offline_queue().len();
            till.clear_offline_queue().context("Failed to clear offline queue")?;
            println!("Discarded {} queued entr{}", count, if count == 1 { "y" } else { "ies" });
        }
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            till.clear_cache();
            println!("Cache cleared");
        }
    }

    Ok(())
}

async fn run_sales<B: tillbook_core::Backend>(till: &Till<B>, args: &SalesArgs) {
    let date = args.date.unwrap_or_else(today);
    let snapshot = till.cash_balance(date).await;

    let mut form = args.form();
    if args.cash_withdrawal.is_none() {
        form.apply_snapshot(&snapshot);
    }

    let staff = till.session().submitting_staff();
    let reconciliation = Reconciliation::from_form(&form, date, staff, &snapshot);
    output::print_reconciliation(&snapshot, &reconciliation);

    if args.dry_run {
        return;
    }
    let outcome = till
        .submit_sales(&form.entry(date, staff), &form.quick_expenses())
        .await;
    println!("{}", outcome.message());
}

async fn run_summary<B: tillbook_core::Backend>(till: &Till<B>, month: &MonthKey) {
    let cached = till.cached_monthly_summary(month);
    if let Some(entry) = &cached {
        if !till.summary_needs_refresh(month) {
            output::print_summary(month, &entry.data, &entry.age_display());
            return;
        }
    }

    match till.refresh_monthly_summary(month).await {
        Ok(Some(summary)) => output::print_summary(month, &summary, "just now"),
        Ok(None) => {
            if let Some(entry) = cached {
                let updated = format!("{}, refresh failed", entry.age_display());
                output::print_summary(month, &entry.data, &updated);
            }
        }
        Err(e) => println!("{}", e),
    }
}
