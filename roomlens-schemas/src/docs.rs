//! Human-readable mapping tables
//!
//! Renders a mapping as Markdown for rehearsal notes and the docs folder:
//!
//! ```text
//! | Sensor | Feature | Transform | Timbre Axis | Target Range | Notes |
//! |---|---|---|---|---|---|
//! | mic | rms | log10_clamp | grain_density | 0.05 → 0.45 | louder room, denser cloud |
//! ```
//!
//! Features without a transform show their source candidates instead.
//! Documented axes follow in a glossary.

use std::fmt::Write;

use roomlens_core::{FeatureSpec, MappingSpec};

const HEADER: &str = "# MAPPING TABLE (human-readable)\n\n\
> Source features are normalized to 0-1. Curves are linear unless noted.\n\n\
| Sensor | Feature | Transform | Timbre Axis | Target Range | Notes |\n\
|---|---|---|---|---|---|\n";

/// Render a mapping as a Markdown table
pub fn mapping_table_markdown(spec: &MappingSpec) -> String {
    let mut out = String::from(HEADER);

    for sensor in &spec.sensors {
        for feature in &sensor.features {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} → {} | {} |",
                cell(&sensor.name),
                cell(&feature.name),
                cell(&transform_column(feature)),
                cell(feature.axis.as_deref().unwrap_or("")),
                feature.range.lo,
                feature.range.hi,
                cell(feature.notes.as_deref().unwrap_or("")),
            );
        }
    }

    if !spec.axes.is_empty() {
        out.push_str("\n## Axes\n\n");
        for axis in &spec.axes {
            let mut line = format!("- `{}`", axis.name);
            if let Some(label) = &axis.label {
                let _ = write!(line, ": {}", label);
            }
            if let Some(unit) = &axis.unit {
                let _ = write!(line, " ({})", unit);
            }
            if let Some(description) = &axis.description {
                let _ = write!(line, " - {}", description);
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

fn transform_column(feature: &FeatureSpec) -> String {
    match &feature.transform {
        Some(transform) => transform.clone(),
        None => feature.source.join("|"),
    }
}

// Pipes would split the cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
