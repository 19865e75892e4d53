//! Loading of rule/category/account sources and the statement run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use finsta_core::{Category, Statement};
use finsta_rules::table::{labels_from_rows, read_labels_csv, read_rules_csv, rules_from_rows};
use finsta_rules::{categorize, CategoryGroup, CategoryOrder, RuleSet};

use crate::config::{Config, FilesSection};
use crate::layout::{build_layout, SheetLayout};
use crate::sheets::SheetsClient;

/// Rules, reference category order and the user's own accounts.
pub struct Sources {
    pub rules: RuleSet,
    pub order: CategoryOrder,
    pub own_accounts: Vec<String>,
}

/// Local CSV paths given on the command line; each overrides `[files]`.
#[derive(Debug, Clone, Default)]
pub struct LocalPaths {
    pub rules: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub accounts: Option<PathBuf>,
}

impl LocalPaths {
    /// Merge with the config. `None` unless both rules and categories are
    /// known locally.
    pub fn resolve(&self, cfg: &Config) -> Option<FilesSection> {
        let files = cfg.files.clone().unwrap_or_default();
        let merged = FilesSection {
            categories: self.categories.clone().or(files.categories),
            rules: self.rules.clone().or(files.rules),
            accounts: self.accounts.clone().or(files.accounts),
        };
        if merged.categories.is_some() && merged.rules.is_some() {
            Some(merged)
        } else {
            None
        }
    }
}

impl Sources {
    pub fn new(rules: RuleSet, labels: Vec<String>, own_accounts: Vec<String>) -> Result<Self> {
        let order = CategoryOrder::new(labels).context("category list")?;
        let own_accounts = own_accounts
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Ok(Self {
            rules,
            order,
            own_accounts,
        })
    }

    pub fn from_files(files: &FilesSection) -> Result<Self> {
        let (Some(categories), Some(rules)) = (&files.categories, &files.rules) else {
            bail!("both a rules file and a categories file are required");
        };
        let rules = read_rules_csv(rules)?;
        let labels = read_labels_csv(categories)?;
        let accounts = match &files.accounts {
            Some(path) => read_labels_csv(path)?,
            None => Vec::new(),
        };
        Self::new(rules, labels, accounts)
    }

    pub async fn from_sheet(client: &SheetsClient, cfg: &Config) -> Result<Self> {
        let sheet = &cfg.sheet;
        let rules = rules_from_rows(
            &client
                .read_range(&sheet.rules)
                .await
                .with_context(|| format!("read rules from {}", sheet.rules))?,
        )?;
        let labels = labels_from_rows(
            &client
                .read_range(&sheet.categories)
                .await
                .with_context(|| format!("read categories from {}", sheet.categories))?,
        );
        let accounts = match &sheet.accounts {
            Some(range) => labels_from_rows(
                &client
                    .read_range(range)
                    .await
                    .with_context(|| format!("read accounts from {range}"))?,
            ),
            None => Vec::new(),
        };
        Self::new(rules, labels, accounts)
    }

    /// Local files when both are known, otherwise the configured sheet.
    pub async fn load(cfg: &Config, paths: &LocalPaths) -> Result<Self> {
        match paths.resolve(cfg) {
            Some(files) => {
                tracing::debug!(?files, "using local sources");
                Self::from_files(&files)
            }
            None => {
                tracing::debug!(id = %cfg.sheet.id, "using sheet sources");
                let client = SheetsClient::from_config(&cfg.sheet)?;
                Self::from_sheet(&client, cfg).await
            }
        }
    }

    /// Rules whose category is not in the reference list, as `(row, label)`
    /// with 1-based table rows (the header is row 1).
    pub fn unknown_categories(&self) -> Vec<(usize, String)> {
        self.rules
            .unknown_categories(&self.order)
            .into_iter()
            .map(|(i, c)| (i + 2, c.label().to_string()))
            .collect()
    }

    /// The category list has no empty entry although some movement can
    /// match no rule; categorizing it would fail on the empty label.
    pub fn lacks_uncategorized_entry(&self) -> bool {
        !self.order.contains(&Category::Uncategorized) && !self.rules.has_catch_all()
    }
}

pub fn load_statement(primary: &Path, additional: &[PathBuf]) -> Result<Statement> {
    let statement = finsta_ingest::load_statements(primary, additional)?;
    tracing::info!(
        account = %statement.account,
        movements = statement.movements.len(),
        files = additional.len() + 1,
        "loaded statement"
    );
    Ok(statement)
}

/// Categorized statement ready for output.
pub struct Run<'a> {
    pub groups: Vec<CategoryGroup<'a>>,
    pub layout: SheetLayout,
}

pub fn run<'a>(statement: &'a Statement, sources: &Sources) -> Result<Run<'a>> {
    let groups = categorize(&statement.movements, &sources.rules, &sources.order)
        .context("rule produced a category missing from the category list")?;
    let layout = build_layout(statement, &groups, &sources.order, &sources.own_accounts);
    Ok(Run { groups, layout })
}
