//! Output rendering for the final major list.
//!
//! Text for terminals, JSON for machine consumption. The optional
//! substring filter lives here too: it is a display concern and never
//! changes the underlying catalog or its default selection.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::MajorCatalog;

/// Snapshot of one pipeline run, ready for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorListReport {
    /// Display name of the receiving institution.
    pub receiving_institution: String,
    /// Upstream id of the receiving institution.
    pub receiving_institution_id: i64,
    /// When this list was produced.
    pub generated_at: DateTime<Utc>,
    /// Default selection (first element of the sorted, unfiltered list).
    pub default_major: Option<String>,
    /// Majors to display, post-filter.
    pub majors: Vec<String>,
    /// Total majors before filtering.
    pub total_majors: usize,
}

impl MajorListReport {
    /// Build a report from a pipeline result, applying the optional
    /// display filter (case-insensitive substring).
    pub fn new(
        receiving_institution: String,
        receiving_institution_id: i64,
        catalog: &MajorCatalog,
        filter: Option<&str>,
    ) -> Self {
        let majors = match filter {
            Some(needle) => {
                let needle = needle.to_lowercase();
                catalog
                    .majors
                    .iter()
                    .filter(|m| m.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
            None => catalog.majors.clone(),
        };

        Self {
            receiving_institution,
            receiving_institution_id,
            generated_at: Utc::now(),
            default_major: catalog.default_major.clone(),
            majors,
            total_majors: catalog.majors.len(),
        }
    }
}

/// Render the report as human-readable text.
pub fn generate_text_report(report: &MajorListReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Majors with articulation agreements at {}:\n\n",
        report.receiving_institution
    ));

    if report.majors.is_empty() {
        output.push_str("  (none found)\n");
        return output;
    }

    for (i, major) in report.majors.iter().enumerate() {
        let marker = if report.default_major.as_deref() == Some(major.as_str()) {
            "*"
        } else {
            " "
        };
        output.push_str(&format!("{:>4}. {} {}\n", i + 1, marker, major));
    }

    output.push_str(&format!("\n{} majors", report.total_majors));
    if report.majors.len() != report.total_majors {
        output.push_str(&format!(" ({} shown after filter)", report.majors.len()));
    }
    output.push('\n');

    output
}

/// Render the report as pretty-printed JSON.
pub fn generate_json_report(report: &MajorListReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
