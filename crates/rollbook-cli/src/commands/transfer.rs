//! The `rollbook export` and `rollbook import` commands.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use rollbook_core::transfer::ExportFormat;

use super::Context;

pub fn export(ctx: &Context, format: ExportFormat, output: PathBuf) -> Result<()> {
    let store = ctx.open_store()?;
    let content = store.export(format)?;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let path = output.join(format.file_name(ctx.today));
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), format = %format, "exported records");
    println!("Exported {} record(s) to {}", store.len(), path.display());
    Ok(())
}

/// Replaces the whole collection. A rejected file leaves it untouched.
pub fn import(ctx: &Context, file: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let mut store = ctx.open_store()?;
    let count = store
        .import_json(&text)
        .with_context(|| format!("failed to import {}", file.display()))?;
    println!("Imported {count} record(s)");
    Ok(())
}
