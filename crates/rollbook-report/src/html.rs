//! HTML dashboard generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use rollbook_core::model::Record;
use rollbook_core::preferences::Theme;
use rollbook_core::statistics::{CategoryAverage, Dashboard, Distribution};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the dashboard page for a record snapshot.
pub fn generate_html(dashboard: &Dashboard, records: &[Record], theme: Theme) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"{}\">\n<head>\n",
        theme
    ));
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>rollbook dashboard — {}</title>\n",
        dashboard.as_of.format("%Y-%m-%d")
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>rollbook dashboard</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">As of <strong>{}</strong> | generated {}</p>\n",
        dashboard.as_of.format("%Y-%m-%d"),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary cards
    let s = &dashboard.summary;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n<div class=\"cards\">\n");
    for (label, value) in [
        ("Students", s.count.to_string()),
        ("Average GPA", s.average_gpa_label()),
        ("Highest GPA", s.max_gpa_label()),
        ("Courses", s.distinct_course_count.to_string()),
    ] {
        html.push_str(&format!(
            "<div class=\"card\"><span class=\"value\">{}</span><span class=\"label\">{}</span></div>\n",
            value, label
        ));
    }
    html.push_str("</div>\n</section>\n");

    // Charts
    html.push_str("<section class=\"charts\">\n<h2>Distributions</h2>\n");
    for (title, dist) in [
        ("GPA bands", &dashboard.gpa_bands),
        ("Students per course", &dashboard.by_course),
        ("Year of study", &dashboard.by_year),
        ("Gender", &dashboard.by_gender),
        ("Attendance bands (%)", &dashboard.attendance_bands),
        ("Age bands", &dashboard.age_bands),
    ] {
        html.push_str(&format!("<h3>{}</h3>\n", html_escape(title)));
        if dist.total() == 0 {
            html.push_str("<p class=\"empty\">No data</p>\n");
        } else {
            html.push_str(&generate_bar_chart(dist));
        }
    }
    html.push_str("<h3>Average GPA by course</h3>\n");
    if dashboard.average_gpa_by_course.is_empty() {
        html.push_str("<p class=\"empty\">No data</p>\n");
    } else {
        html.push_str(&generate_average_chart(&dashboard.average_gpa_by_course));
    }
    html.push_str("</section>\n");

    // Records
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"students\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student ID</th><th onclick=\"sortTable(1)\">Name</th><th onclick=\"sortTable(2)\">Course</th><th onclick=\"sortTable(3)\">Year</th><th onclick=\"sortTable(4)\">GPA</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for r in records {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            html_escape(&r.record_id),
            html_escape(&r.name),
            html_escape(&r.course),
            r.year,
            r.gpa
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(dashboard).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the dashboard page to a file.
pub fn write_html_report(
    dashboard: &Dashboard,
    records: &[Record],
    theme: Theme,
    path: &Path,
) -> Result<()> {
    let html = generate_html(dashboard, records, theme);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const BAR_HEIGHT: usize = 26;
const MAX_WIDTH: usize = 400;
const PADDING: usize = 8;
const LABEL_WIDTH: usize = 180;

fn svg_open(rows: usize) -> String {
    format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        LABEL_WIDTH + MAX_WIDTH + 60,
        rows * (BAR_HEIGHT + PADDING) + PADDING
    )
}

fn svg_bar(svg: &mut String, row: usize, label: &str, fraction: f64, value_text: &str) {
    let y = row * (BAR_HEIGHT + PADDING) + PADDING;
    let width = (fraction.clamp(0.0, 1.0) * MAX_WIDTH as f64) as usize;

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
        LABEL_WIDTH - 10,
        y + BAR_HEIGHT / 2,
        html_escape(label)
    ));
    svg.push_str(&format!(
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#3b82f6\" rx=\"4\"/>\n",
        LABEL_WIDTH, y, width, BAR_HEIGHT
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
        LABEL_WIDTH + width + 8,
        y + BAR_HEIGHT / 2,
        value_text
    ));
}

fn generate_bar_chart(dist: &Distribution) -> String {
    let max = dist.max_count().max(1) as f64;
    let mut svg = svg_open(dist.len());
    for (i, (label, count)) in dist.entries().iter().enumerate() {
        svg_bar(&mut svg, i, label, *count as f64 / max, &count.to_string());
    }
    svg.push_str("</svg>\n");
    svg
}

fn generate_average_chart(averages: &[CategoryAverage]) -> String {
    let mut svg = svg_open(averages.len());
    for (i, avg) in averages.iter().enumerate() {
        svg_bar(
            &mut svg,
            i,
            &avg.category,
            avg.average / 10.0,
            &format!("{:.2}", avg.average),
        );
    }
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; }
[data-theme="dark"] { --bg: #111827; --fg: #f9fafb; --border: #374151; --muted: #9ca3af; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: var(--muted); }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; display: flex; flex-direction: column; min-width: 8rem; }
.card .value { font-size: 1.75rem; font-weight: bold; }
.card .label { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 0.5rem 0 1rem; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('students');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
