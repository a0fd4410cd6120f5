//! The `rollbook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("rollbook.toml").exists() {
        println!("rollbook.toml already exists, skipping.");
    } else {
        std::fs::write("rollbook.toml", SAMPLE_CONFIG)?;
        println!("Created rollbook.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit the course list in rollbook.toml");
    println!("  2. Run: rollbook add --student-id S001 --name \"Ada Lovelace\" --email ada@example.edu \\");
    println!("            --phone 555-0100 --course \"Computer Science\" --year 1 --gpa 9.1");
    println!("  3. Run: rollbook report");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# rollbook configuration

data_dir = "./rollbook-data"

courses = [
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Business",
]

# Largest accepted photo once encoded, in bytes.
photo_max_bytes = 204800

# Uncomment to cap the data directory size.
# storage_quota_bytes = 5242880

[reports]
gpa_bands = [0.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
attendance_bands = [0.0, 50.0, 75.0, 90.0, 100.0]
age_bands = [15.0, 18.0, 21.0, 25.0, 30.0, 60.0]
"#;
