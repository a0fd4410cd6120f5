//! The `rollbook delete` and `rollbook remove` commands.

use anyhow::Result;

use super::{resolve_id, Context};

pub fn execute(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let internal_id = resolve_id(&store, id)?;
    let removed = store.delete(&internal_id)?;
    println!("Deleted {} ({})", removed.record_id, removed.name);
    Ok(())
}

/// Bulk delete. IDs that match nothing are skipped, not reported as errors.
pub fn execute_many(ctx: &Context, ids: &[String]) -> Result<()> {
    let mut store = ctx.open_store()?;
    let internal_ids: Vec<String> = ids
        .iter()
        .filter_map(|id| resolve_id(&store, id).ok())
        .collect();
    let removed = store.bulk_delete(&internal_ids)?;
    println!("Removed {removed} of {} record(s)", ids.len());
    Ok(())
}
