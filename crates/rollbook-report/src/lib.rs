//! rollbook-report — HTML dashboard generation.
//!
//! Renders the report engine's views as a single self-contained HTML file
//! with inline CSS and SVG charts.

pub mod html;

pub use html::{generate_html, write_html_report};
