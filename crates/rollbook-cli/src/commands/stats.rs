//! The `rollbook stats` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use rollbook_core::statistics::{Dashboard, Distribution};

use super::{Context, StatsFormat};

pub fn execute(ctx: &Context, format: StatsFormat) -> Result<()> {
    let store = ctx.open_store()?;
    let dashboard = Dashboard::build(store.records(), &ctx.config.reports, ctx.today)?;

    match format {
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        StatsFormat::Text => print_dashboard(&dashboard),
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let s = &dashboard.summary;
    println!("Students:     {}", s.count);
    println!("Average GPA:  {}", s.average_gpa_label());
    println!("Highest GPA:  {}", s.max_gpa_label());
    println!("Courses:      {}", s.distinct_course_count);

    if s.count == 0 {
        return;
    }

    print_distribution("GPA", &dashboard.gpa_bands);
    print_distribution("Course", &dashboard.by_course);
    print_distribution("Year", &dashboard.by_year);
    print_distribution("Gender", &dashboard.by_gender);
    print_distribution("Attendance %", &dashboard.attendance_bands);
    print_distribution("Age", &dashboard.age_bands);

    if !dashboard.average_gpa_by_course.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Course", "Average GPA"]);
        for avg in &dashboard.average_gpa_by_course {
            table.add_row(vec![
                Cell::new(&avg.category),
                Cell::new(format!("{:.2}", avg.average)),
            ]);
        }
        println!("\n{table}");
    }
}

fn print_distribution(title: &str, dist: &Distribution) {
    let mut table = Table::new();
    table.set_header(vec![title, "Count"]);
    for (label, count) in dist.entries() {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("\n{table}");
}
