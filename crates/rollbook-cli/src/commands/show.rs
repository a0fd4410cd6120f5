//! The `rollbook show` command.

use anyhow::{Context as _, Result};
use comfy_table::Table;

use rollbook_core::statistics::age_from_birthdate;

use super::{resolve_id, Context};

pub fn execute(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let internal_id = resolve_id(&store, id)?;
    let r = store
        .get(&internal_id)
        .with_context(|| format!("no record with ID {id}"))?;

    let optional = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let rows = [
        ("ID", r.internal_id.clone()),
        ("Student ID", r.record_id.clone()),
        ("Name", r.name.clone()),
        ("Gender", optional(r.gender.map(|g| g.to_string()))),
        ("Email", r.email.clone()),
        ("Phone", r.phone.clone()),
        ("Course", r.course.clone()),
        ("Year", r.year.to_string()),
        ("GPA", format!("{:.2}", r.gpa)),
        ("Enrolled", r.enrollment_date.to_string()),
        ("Date of birth", optional(r.date_of_birth.map(|d| d.to_string()))),
        (
            "Age",
            optional(age_from_birthdate(r.date_of_birth, ctx.today).map(|a| a.to_string())),
        ),
        ("Attendance", optional(r.attendance.map(|a| format!("{a:.1}%")))),
        (
            "Photo",
            optional(
                r.photo
                    .as_ref()
                    .map(|p| format!("{} ({} bytes)", p.mime(), p.encoded_len())),
            ),
        ),
        ("Created", r.created_at.to_rfc3339()),
        ("Updated", optional(r.updated_at.map(|t| t.to_rfc3339()))),
    ];
    for (field, value) in rows {
        table.add_row(vec![field.to_string(), value]);
    }

    println!("{table}");
    Ok(())
}
