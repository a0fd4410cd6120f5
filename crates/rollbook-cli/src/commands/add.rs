//! The `rollbook add` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use rollbook_core::model::{Gender, NewRecord};

use super::{reject_violations, Context};

#[derive(Args)]
pub struct RecordArgs {
    /// Student ID, unique across the collection
    #[arg(long)]
    pub student_id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub course: String,

    /// Year of study, 1-4
    #[arg(long)]
    pub year: u8,

    /// Grade point average, 0-10
    #[arg(long)]
    pub gpa: f64,

    /// Enrollment date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub enrolled: Option<NaiveDate>,

    /// male, female or other
    #[arg(long)]
    pub gender: Option<Gender>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<NaiveDate>,

    /// Attendance percentage, 0-100
    #[arg(long)]
    pub attendance: Option<f64>,

    /// Image file (PNG, JPEG, GIF or WebP)
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

pub fn execute(ctx: &Context, args: RecordArgs) -> Result<()> {
    // Encode the photo before anything touches the store.
    let photo = args
        .photo
        .as_deref()
        .map(|path| ctx.load_photo(path))
        .transpose()?;

    let record = NewRecord {
        record_id: args.student_id.trim().to_string(),
        name: args.name.trim().to_string(),
        gender: args.gender,
        email: args.email.trim().to_string(),
        phone: args.phone.trim().to_string(),
        course: args.course,
        year: args.year,
        gpa: args.gpa,
        enrollment_date: args.enrolled.unwrap_or(ctx.today),
        date_of_birth: args.dob,
        attendance: args.attendance,
        photo,
    };
    reject_violations(ctx.validator().check_new(&record))?;

    let mut store = ctx.open_store()?;
    let added = store.add(record)?;
    println!("Added {} ({})", added.record_id, added.internal_id);
    Ok(())
}
