//! The `rollbook list` and `rollbook sort` commands.

use anyhow::Result;

use rollbook_core::model::{RecordFilter, SortKey, SortOrder};

use super::{records_table, Context, ListFormat};

pub fn execute(
    ctx: &Context,
    search: Option<String>,
    course: Option<String>,
    year: Option<u8>,
    sort: Option<SortKey>,
    descending: bool,
    format: ListFormat,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    if let Some(key) = sort {
        store.sort(key, SortOrder::from_descending(descending))?;
    }

    let filter = RecordFilter { course, year };
    let records = store.query(search.as_deref().unwrap_or(""), &filter);

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        ListFormat::Table => {
            if records.is_empty() {
                println!("No records found.");
            } else {
                println!("{}", records_table(&records));
                println!("{} of {} record(s)", records.len(), store.len());
            }
        }
    }
    Ok(())
}

pub fn sort(ctx: &Context, key: SortKey, descending: bool) -> Result<()> {
    let mut store = ctx.open_store()?;
    let order = SortOrder::from_descending(descending);
    store.sort(key, order)?;

    let key_name = match key {
        SortKey::Name => "name",
        SortKey::Gpa => "gpa",
    };
    let direction = if order.is_ascending() {
        "ascending"
    } else {
        "descending"
    };
    println!("Sorted {} record(s) by {key_name} ({direction})", store.len());
    Ok(())
}
