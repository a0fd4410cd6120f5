//! The `rollbook update` command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;

use rollbook_core::model::{Change, Gender, RecordPatch};

use super::{reject_violations, resolve_id, Context};

/// Fields to change. Anything omitted keeps its stored value.
#[derive(Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub student_id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub course: Option<String>,

    #[arg(long)]
    pub year: Option<u8>,

    #[arg(long)]
    pub gpa: Option<f64>,

    #[arg(long)]
    pub enrolled: Option<NaiveDate>,

    #[arg(long, conflicts_with = "clear_gender")]
    pub gender: Option<Gender>,

    /// Drop the stored gender
    #[arg(long)]
    pub clear_gender: bool,

    #[arg(long, conflicts_with = "clear_dob")]
    pub dob: Option<NaiveDate>,

    /// Drop the stored date of birth
    #[arg(long)]
    pub clear_dob: bool,

    #[arg(long, conflicts_with = "clear_attendance")]
    pub attendance: Option<f64>,

    /// Drop the stored attendance
    #[arg(long)]
    pub clear_attendance: bool,

    /// Replace the photo with this image file
    #[arg(long, conflicts_with = "remove_photo")]
    pub photo: Option<PathBuf>,

    /// Drop the stored photo
    #[arg(long)]
    pub remove_photo: bool,
}

pub fn execute(ctx: &Context, id: &str, args: UpdateArgs) -> Result<()> {
    let photo = args
        .photo
        .as_deref()
        .map(|path| ctx.load_photo(path))
        .transpose()?;

    let trimmed = |s: Option<String>| s.map(|v| v.trim().to_string());
    let patch = RecordPatch {
        record_id: trimmed(args.student_id),
        name: trimmed(args.name),
        gender: Change::from_parts(args.gender, args.clear_gender),
        email: trimmed(args.email),
        phone: trimmed(args.phone),
        course: args.course,
        year: args.year,
        gpa: args.gpa,
        enrollment_date: args.enrolled,
        date_of_birth: Change::from_parts(args.dob, args.clear_dob),
        attendance: Change::from_parts(args.attendance, args.clear_attendance),
        photo: Change::from_parts(photo, args.remove_photo),
    };
    if patch.is_empty() {
        bail!("nothing to update; pass at least one field");
    }
    reject_violations(ctx.validator().check_patch(&patch))?;

    let mut store = ctx.open_store()?;
    let internal_id = resolve_id(&store, id)?;
    let updated = store.update(&internal_id, patch)?;
    println!("Updated {} ({})", updated.record_id, updated.internal_id);
    Ok(())
}
