//! The `rollbook report` command.

use std::path::PathBuf;

use anyhow::Result;

use rollbook_core::preferences::load_theme;
use rollbook_core::statistics::Dashboard;
use rollbook_report::write_html_report;

use super::Context;

pub fn execute(ctx: &Context, output: PathBuf) -> Result<()> {
    let store = ctx.open_store()?;
    let theme = load_theme(store.storage())?;
    let dashboard = Dashboard::build(store.records(), &ctx.config.reports, ctx.today)?;

    write_html_report(&dashboard, store.records(), theme, &output)?;
    println!("HTML dashboard: {}", output.display());
    Ok(())
}
