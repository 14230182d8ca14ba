use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use household::cli::{
    handle_expense_command, handle_history_command, handle_household_command,
    handle_income_command, handle_member_command, handle_settle_command,
};
use household::config::{paths::HouseholdPaths, settings::Settings};
use household::storage::Storage;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "HOUSEHOLD_LOG";

#[derive(Parser)]
#[command(
    name = "household",
    author = "Kaylee Beyene",
    version,
    about = "Household budget tracking with income-proportional monthly settlements",
    long_about = "Record what each household member earns and spends, then settle \
                  the month: shared expenses are split in proportion to income and \
                  netted into as few transfers as possible."
)]
struct Cli {
    /// Household to act on (name or ID), defaults to the active household
    #[arg(long, global = true)]
    household: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Household management commands
    #[command(subcommand, alias = "hh")]
    Household(household::cli::HouseholdCommands),

    /// Member management commands
    #[command(subcommand)]
    Member(household::cli::MemberCommands),

    /// Monthly income commands
    #[command(subcommand)]
    Income(household::cli::IncomeCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(household::cli::ExpenseCommands),

    /// Monthly settlement commands
    #[command(subcommand)]
    Settle(household::cli::SettleCommands),

    /// Show recent changes
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = HouseholdPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let selected = cli.household.as_deref();

    match cli.command {
        Some(Commands::Household(cmd)) => {
            handle_household_command(&storage, &paths, &mut settings, selected, cmd)?;
        }
        Some(Commands::Member(cmd)) => {
            handle_member_command(&storage, &settings, selected, cmd)?;
        }
        Some(Commands::Income(cmd)) => {
            handle_income_command(&storage, &settings, selected, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, selected, cmd)?;
        }
        Some(Commands::Settle(cmd)) => {
            handle_settle_command(&storage, &settings, selected, cmd)?;
        }
        Some(Commands::History { limit }) => {
            handle_history_command(&storage, limit)?;
        }
        Some(Commands::Init) => {
            if !household::storage::init::needs_initialization(&paths) {
                println!("Already initialized at: {}", paths.base_dir().display());
                return Ok(());
            }
            println!("Initializing household-settle at: {}", paths.data_dir().display());
            household::storage::init::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  household household create <NAME>");
            println!("  household member add <NAME>");
            println!("  household income set <MEMBER> <AMOUNT>");
        }
        Some(Commands::Config) => {
            println!("household-settle Configuration");
            println!("==============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            match settings.active_household {
                Some(id) => match storage.households.get(id)? {
                    Some(h) => println!("  Active household: {}", h.name),
                    None => println!("  Active household: {} (missing)", id),
                },
                None => println!("  Active household: (none)"),
            }
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Default policy:   {}", settings.default_policy);
            println!("  Log filter:       {}", settings.log_filter);
        }
        None => {
            println!("household-settle - income-proportional household settlements");
            println!();
            println!("Run 'household --help' for usage information.");
            if !paths.is_initialized() {
                println!("Run 'household init' to get started.");
            }
        }
    }

    Ok(())
}
