use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use finsta_core::Statement;
use std::path::PathBuf;

mod config;
mod export;
mod layout;
mod pipeline;
mod sheets;
mod state;

use pipeline::{LocalPaths, Run, Sources};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINSTA_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "finsta",
    version = VERSION,
    about = "Categorize FINSTA bank statements into a budget spreadsheet"
)]
struct Cli {
    /// Config file (default: ~/.finsta/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file
    Init,

    /// Categorize a statement and print the groups (optionally export CSV)
    Categorize {
        /// Primary FINSTA statement; its header is used
        statement: PathBuf,

        /// Supplementary statements whose movements are appended
        additional: Vec<PathBuf>,

        #[command(flatten)]
        sources: SourceArgs,

        /// Write the sheet layout to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Categorize a statement and write it to a new tab of the sheet
    Publish {
        statement: PathBuf,
        additional: Vec<PathBuf>,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Validate the rule table against the category list
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Rule table CSV (Account, Message, Amount, Category)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Category list CSV, one label per row
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Own account numbers CSV, one per row
    #[arg(long)]
    accounts: Option<PathBuf>,
}

impl From<SourceArgs> for LocalPaths {
    fn from(a: SourceArgs) -> Self {
        LocalPaths {
            rules: a.rules,
            categories: a.categories,
            accounts: a.accounts,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(p) => p,
        None => state::default_config_path()?,
    };

    match cli.command {
        Command::Init => {
            if config::init_config(&config_path)? {
                println!("Wrote {}", config_path.display());
                println!("Next: set [sheet] id and export a token in $FINSTA_SHEETS_TOKEN");
            } else {
                println!("Config already exists: {}", config_path.display());
            }
        }

        Command::Categorize {
            statement,
            additional,
            sources,
            csv,
        } => {
            let cfg = config::load_config(&config_path)?;
            let sources = Sources::load(&cfg, &sources.into()).await?;
            let statement = pipeline::load_statement(&statement, &additional)?;
            let run = pipeline::run(&statement, &sources)?;

            print_run(&statement, &run);
            if let Some(path) = csv {
                export::export_layout_csv(&path, &run.layout)?;
                println!("\nWrote {}", path.display());
            }
        }

        Command::Publish {
            statement,
            additional,
            sources,
        } => {
            let cfg = config::load_config(&config_path)?;
            let client = sheets::SheetsClient::from_config(&cfg.sheet)?;
            let paths: LocalPaths = sources.into();
            let sources = match paths.resolve(&cfg) {
                Some(files) => Sources::from_files(&files)?,
                None => Sources::from_sheet(&client, &cfg).await?,
            };
            let statement = pipeline::load_statement(&statement, &additional)?;
            let run = pipeline::run(&statement, &sources)?;

            client
                .add_sheet(&run.layout.title)
                .await
                .with_context(|| format!("add tab '{}'", run.layout.title))?;
            client.write_layout(&run.layout).await.context("write tab")?;
            println!(
                "Published {} movements to tab '{}'",
                statement.movements.len(),
                run.layout.title
            );
        }

        Command::Check { sources } => {
            let cfg = config::load_config(&config_path)?;
            let sources = Sources::load(&cfg, &sources.into()).await?;
            let unknown = sources.unknown_categories();
            println!(
                "{} rules, {} categories, {} own accounts",
                sources.rules.len(),
                sources.order.len(),
                sources.own_accounts.len()
            );
            for (row, label) in &unknown {
                println!("row {row}: category '{label}' is not in the category list");
            }
            let missing_empty = sources.lacks_uncategorized_entry();
            if missing_empty {
                println!(
                    "category list has no empty entry, but some movements may match no rule"
                );
            }
            let problems = unknown.len() + usize::from(missing_empty);
            if problems > 0 {
                bail!("{problems} problem(s) in the rule table and category list");
            }
            println!("OK");
        }
    }

    Ok(())
}

fn print_run(statement: &Statement, run: &Run<'_>) {
    println!(
        "{} {} | {} .. {}",
        statement.holder,
        statement.account,
        statement.period_start,
        statement.period_end
    );
    println!(
        "opening={:.2} closing={:.2} movements={}\n",
        statement.opening_balance,
        statement.closing_balance(),
        statement.movements.len()
    );

    for group in &run.groups {
        let label = match group.category.label() {
            "" => "(uncategorized)",
            l => l,
        };
        println!("[{label}] count={} total={:.2}", group.len(), group.total());
        for m in &group.movements {
            println!(
                "  {} {:>12.2}  {}",
                m.date.format(finsta_core::DISPLAY_DATE_FORMAT),
                m.amount,
                m.description().unwrap_or(finsta_core::NO_DESCRIPTION)
            );
        }
    }
}
