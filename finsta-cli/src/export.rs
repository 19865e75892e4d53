use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::layout::SheetLayout;

/// Write the layout as it would appear on the tab, formulas as text.
pub fn write_layout_csv<W: Write>(writer: W, layout: &SheetLayout) -> Result<()> {
    let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in layout.to_grid() {
        out.write_record(&row).context("write csv row")?;
    }
    out.flush().context("flush csv")?;
    Ok(())
}

pub fn export_layout_csv(path: &Path, layout: &SheetLayout) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_layout_csv(file, layout).with_context(|| format!("write {}", path.display()))
}
