use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::client::{ClientMode, PizzariaClient};
use crate::config::{Settings, config_path, load_settings};
use crate::format::Locale;
use crate::session::Session;
use crate::types::{ExpenseId, Status};

mod categories;
mod expenses;
mod render;
mod settings;
mod stats;

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "caixa")]
#[command(about = "Expense tracker client for the pizzeria cash desk", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub output: OutputFormat,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Money and date conventions (defaults to the settings file, then pt-br).
    #[arg(long, value_enum, global = true)]
    pub locale: Option<Locale>,

    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompts for deletions (required in non-interactive runs).
    #[arg(long, global = true, default_value_t = false)]
    pub yes: bool,

    /// More log output on stderr (-v info, -vv debug). `CAIXA_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long, global = true, env = "CAIXA_BASE_URL")]
    pub base_url: Option<String>,

    /// Settings file (defaults to `~/.config/pizzaria-caixa/config.json`).
    #[arg(long, global = true, env = "CAIXA_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "CAIXA_FIXTURES_DIR", hide = true)]
    pub fixtures_dir: Option<PathBuf>,
}

impl Cli {
    fn locale_or_default(&self) -> Locale {
        self.locale.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    Expenses {
        #[command(subcommand)]
        cmd: ExpensesCmd,
    },
    Categories {
        #[command(subcommand)]
        cmd: CategoriesCmd,
    },
    /// Totals computed by the server.
    Stats,
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
    Version,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ExpensesCmd {
    List(ExpensesListArgs),
    Show { id: ExpenseId },
    Create(ExpenseFieldArgs),
    Edit(ExpensesEditArgs),
    SetStatus(ExpensesSetStatusArgs),
    Delete(ExpensesDeleteArgs),
    /// Category names currently used by expenses.
    Categories,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExpenseField {
    Id,
    Description,
    Category,
    Amount,
    Due,
    Paid,
    Status,
    Notes,
}

#[derive(Debug, Clone, Args)]
pub struct ExpensesListArgs {
    /// Case-insensitive text matched against description or category.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Exact category name.
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<Status>,

    /// Due, payment or creation date (YYYY-MM-DD or DD/MM/YYYY).
    #[arg(long)]
    pub date: Option<String>,

    /// Columns to show in table output (comma-separated).
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "id,description,category,amount,due,status"
    )]
    pub fields: Vec<ExpenseField>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExpenseFieldArgs {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Amount in reais; `12.50` and `12,50` are both accepted.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<String>,

    /// YYYY-MM-DD or DD/MM/YYYY; pass an empty string to clear.
    #[arg(long)]
    pub due_date: Option<String>,

    /// YYYY-MM-DD or DD/MM/YYYY; pass an empty string to clear.
    #[arg(long)]
    pub payment_date: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Args)]
pub struct ExpensesEditArgs {
    pub id: ExpenseId,

    #[command(flatten)]
    pub fields: ExpenseFieldArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ExpensesSetStatusArgs {
    pub id: ExpenseId,

    #[arg(value_enum)]
    pub status: Status,
}

#[derive(Debug, Clone, Args)]
pub struct ExpensesDeleteArgs {
    pub id: ExpenseId,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CategoriesCmd {
    List,
    Create(CategoriesCreateArgs),
    /// Ask the server to insert the default categories.
    Seed,
}

#[derive(Debug, Clone, Args)]
pub struct CategoriesCreateArgs {
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Display color, e.g. `#28a745`.
    #[arg(long, default_value = crate::client::DEFAULT_CATEGORY_COLOR)]
    pub hex: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCmd {
    Path,
    Show,
    Set(ConfigSetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConfigSetArgs {
    #[arg(long = "default-base-url")]
    pub default_base_url: Option<String>,

    #[arg(long = "default-locale", value_enum)]
    pub default_locale: Option<Locale>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::Version = &cli.command {
        println!("pizzaria-caixa {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings_path = cli.config.clone().unwrap_or_else(config_path);
    if let Command::Config { cmd } = &cli.command {
        return settings::run_config(&cli, &settings_path, cmd.clone());
    }

    let file_settings = load_settings(&settings_path)?;
    let mut cli = cli;
    cli.locale = Some(cli.locale.unwrap_or_else(|| file_settings.locale()));

    let client = PizzariaClient::new(client_mode(&cli, &file_settings))?;
    let mut session = Session::new(client);

    match &cli.command {
        Command::Expenses { cmd } => expenses::run_expenses(&cli, &mut session, cmd.clone()),
        Command::Categories { cmd } => {
            categories::run_categories(&cli, &mut session, cmd.clone())
        }
        Command::Stats => stats::run_stats(&cli, &session),
        Command::Config { .. } | Command::Version => unreachable!(),
    }
}

fn client_mode(cli: &Cli, settings: &Settings) -> ClientMode {
    match &cli.fixtures_dir {
        Some(dir) => ClientMode::Fixtures(dir.clone()),
        None => ClientMode::Http {
            base_url: cli
                .base_url
                .clone()
                .unwrap_or_else(|| settings.base_url().to_string()),
            timeout: settings.timeout(),
        },
    }
}

fn should_color(cli: &Cli) -> bool {
    match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

fn confirm_write(cli: &Cli, action: &str) -> anyhow::Result<()> {
    if cli.dry_run {
        return Ok(());
    }
    if cli.yes {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("refusing to write in non-interactive mode without --yes");
    }

    eprintln!("{action}");
    let input = rpassword::prompt_password("Proceed? Type 'yes' to confirm: ")?;
    if input.trim() != "yes" {
        anyhow::bail!("aborted");
    }
    Ok(())
}
