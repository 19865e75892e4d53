//! Spreadsheet layout of one categorized statement.
//!
//! The tab is split into three blocks:
//!   A1:B9   summary (holder, account, period, balances, income/expense formulas)
//!   A11:F*  movement table, one row per movement in category-group order
//!   H2:J*   per-category statistics, one row per reference category
//!
//! The formulas reference the movement table, so sums follow the user's
//! later edits of the Category and Ignore columns.

use std::collections::HashMap;

use finsta_core::{Movement, MovementRow, Statement, DISPLAY_DATE_FORMAT};
use finsta_rules::{CategoryGroup, CategoryOrder};
use serde_json::Value;

pub const MOVEMENT_HEADER_ROW: usize = 11;
pub const FIRST_MOVEMENT_ROW: usize = MOVEMENT_HEADER_ROW + 1;
pub const STATISTICS_HEADER_ROW: usize = 2;
/// Column H
pub const STATISTICS_COLUMN: usize = 7;

const MOVEMENT_HEADER: [&str; 6] = ["Date", "Account", "Description", "Amount", "Category", "Ignore"];
const STATISTICS_HEADER: [&str; 3] = ["Category", "Sum", "Share"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Formula(String),
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Value as sent with `USER_ENTERED`. Text that the sheet would read
    /// as a formula is quoted.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Text(s) if s.starts_with(['=', '+']) => Value::String(format!("'{s}")),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(n) => Value::from(*n),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Formula(f) => Value::String(f.clone()),
        }
    }

    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) | Cell::Formula(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
        }
    }
}

/// A rectangular run of cells anchored at a 1-based row and 0-based column.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub row: usize,
    pub column: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl Block {
    pub fn width(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// A1 range covering the block on the tab `title`.
    pub fn range(&self, title: &str) -> String {
        let last_row = self.row + self.cells.len().saturating_sub(1);
        let last_column = self.column + self.width().saturating_sub(1);
        format!(
            "{}!{}{}:{}{}",
            quote_title(title),
            column_name(self.column),
            self.row,
            column_name(last_column),
            last_row
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub title: String,
    pub summary: Block,
    pub movements: Block,
    pub statistics: Block,
}

impl SheetLayout {
    pub fn blocks(&self) -> [&Block; 3] {
        [&self.summary, &self.movements, &self.statistics]
    }

    /// Whole tab as a dense grid of plain fields, blanks between blocks.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let height = self
            .blocks()
            .iter()
            .map(|b| b.row - 1 + b.cells.len())
            .max()
            .unwrap_or(0);
        let width = self
            .blocks()
            .iter()
            .map(|b| b.column + b.width())
            .max()
            .unwrap_or(0);

        let mut grid = vec![vec![String::new(); width]; height];
        for block in self.blocks() {
            for (r, row) in block.cells.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    grid[block.row - 1 + r][block.column + c] = cell.to_field();
                }
            }
        }
        grid
    }
}

/// Tab title for a statement: `YYYY-MM` of the period start.
pub fn tab_title(statement: &Statement) -> String {
    statement.period_start.format("%Y-%m").to_string()
}

/// Lay out a statement whose movements were grouped by `categorize`.
///
/// Movements against one of `own_accounts` start out ignored.
pub fn build_layout(
    statement: &Statement,
    groups: &[CategoryGroup<'_>],
    order: &CategoryOrder,
    own_accounts: &[String],
) -> SheetLayout {
    let rows: Vec<MovementRow> = groups
        .iter()
        .flat_map(|g| g.movements.iter().map(move |m| (g, *m)))
        .map(|(g, m)| MovementRow::new(m, &g.category).with_ignore(is_own(m, own_accounts)))
        .collect();

    SheetLayout {
        title: tab_title(statement),
        summary: summary_block(statement),
        statistics: statistics_block(order, &rows),
        movements: movement_block(rows),
    }
}

fn is_own(movement: &Movement, own_accounts: &[String]) -> bool {
    !movement.counter_account.is_empty()
        && own_accounts.iter().any(|a| *a == movement.counter_account)
}

fn summary_block(statement: &Statement) -> Block {
    let first = FIRST_MOVEMENT_ROW;
    let date = |d: chrono::NaiveDate| Cell::text(d.format(DISPLAY_DATE_FORMAT).to_string());
    let cells = vec![
        vec![Cell::text("Name"), Cell::text(statement.holder.as_str())],
        vec![Cell::text("Account"), Cell::text(statement.account.as_str())],
        vec![Cell::text("From"), date(statement.period_start)],
        vec![Cell::text("To"), date(statement.period_end)],
        vec![Cell::text("Opening balance"), Cell::Number(statement.opening_balance)],
        vec![Cell::text("Closing balance"), Cell::Number(statement.closing_balance())],
        vec![
            Cell::text("Income"),
            Cell::Formula(format!(
                "=SUMIFS(D{first}:D,D{first}:D,\">0\",F{first}:F,FALSE)"
            )),
        ],
        vec![
            Cell::text("Expenses"),
            Cell::Formula(format!(
                "=SUMIFS(D{first}:D,D{first}:D,\"<0\",F{first}:F,FALSE)"
            )),
        ],
        vec![Cell::text("Balance"), Cell::Formula("=B7+B8".to_string())],
    ];
    Block {
        row: 1,
        column: 0,
        cells,
    }
}

fn movement_block(rows: Vec<MovementRow>) -> Block {
    let mut cells = Vec::with_capacity(rows.len() + 1);
    cells.push(MOVEMENT_HEADER.iter().map(|h| Cell::text(*h)).collect());
    cells.extend(rows.into_iter().map(|r| {
        vec![
            Cell::Text(r.date),
            Cell::Text(r.account),
            Cell::Text(r.description),
            Cell::Number(r.amount),
            Cell::Text(r.category),
            Cell::Bool(r.ignore),
        ]
    }));
    Block {
        row: MOVEMENT_HEADER_ROW,
        column: 0,
        cells,
    }
}

fn statistics_block(order: &CategoryOrder, rows: &[MovementRow]) -> Block {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for row in rows.iter().filter(|r| !r.ignore) {
        *sums.entry(row.category.as_str()).or_default() += row.amount;
    }

    let first = FIRST_MOVEMENT_ROW;
    let label_col = column_name(STATISTICS_COLUMN);
    let sum_col = column_name(STATISTICS_COLUMN + 1);

    let mut cells = Vec::with_capacity(order.len() + 1);
    cells.push(STATISTICS_HEADER.iter().map(|h| Cell::text(*h)).collect());
    for (i, label) in order.labels().iter().enumerate() {
        let r = STATISTICS_HEADER_ROW + 1 + i;
        // expenses are a share of total expenses, everything else of income
        let base = if sums.get(label.as_str()).copied().unwrap_or(0.0) < 0.0 {
            "$B$8"
        } else {
            "$B$7"
        };
        cells.push(vec![
            Cell::text(label.as_str()),
            Cell::Formula(format!(
                "=SUMIFS(D{first}:D,E{first}:E,{label_col}{r},F{first}:F,FALSE)"
            )),
            Cell::Formula(format!("={sum_col}{r}/{base}")),
        ]);
    }
    Block {
        row: STATISTICS_HEADER_ROW,
        column: STATISTICS_COLUMN,
        cells,
    }
}

/// Spreadsheet column letters for a 0-based index: 0 -> A, 26 -> AA.
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}
