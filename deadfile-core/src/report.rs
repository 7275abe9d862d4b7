//! Output formatting - plaintext and JSON.

use std::fmt::Write;

use serde_json::{json, Value};

use crate::builder::AnalysisResult;

/// Renders the plain text report.
pub fn render_plain(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if let Err(e) = write_plain(&mut out, result) {
        tracing::error!(error = %e, "failed to render plain report");
    }
    out
}

fn write_plain(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "Total files: {}", result.total_files)?;
    writeln!(out, "Referenced: {}", result.referenced.len())?;
    if !result.exempt.is_empty() {
        writeln!(out, "Framework-exempt: {}", result.exempt.len())?;
    }

    if result.unreferenced.is_empty() {
        writeln!(out, "No unreferenced files found.")?;
    } else {
        writeln!(
            out,
            "UNREFERENCED FILES ({}, {:.1}%):",
            result.unreferenced.len(),
            result.unreferenced_percentage()
        )?;
        for file in &result.unreferenced {
            writeln!(out, "- {}", file)?;
        }

        writeln!(out)?;
        writeln!(out, "BY DIRECTORY:")?;
        for (dir, names) in result.unreferenced_by_directory() {
            writeln!(out, "{}/ ({})", dir, names.len())?;
            for name in names {
                writeln!(out, "  - {}", name)?;
            }
        }
    }

    if !result.diagnostics.is_empty() {
        writeln!(out)?;
        writeln!(out, "DIAGNOSTICS ({}):", result.diagnostics.len())?;
        for diag in &result.diagnostics {
            writeln!(out, "- {}", diag)?;
        }
    }

    writeln!(out, "Completed in {:.2}s", result.duration.as_secs_f64())?;
    Ok(())
}

/// JSON document for an analysis result.
pub fn to_json_value(result: &AnalysisResult) -> Value {
    json!({
        "total_files": result.total_files,
        "used_files": result.referenced,
        "unused_files": result.unreferenced,
        "unused_by_directory": result.unreferenced_by_directory(),
        "exempt_files": result.exempt,
        "diagnostics": result.diagnostics,
        "duration_secs": result.duration.as_secs_f64(),
    })
}

/// Prints the plain text report.
pub fn print_plain(result: &AnalysisResult) {
    print!("{}", render_plain(result));
}

/// Prints the JSON report.
///
/// Falls back to a minimal document if pretty serialization fails.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(&to_json_value(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            println!("{{\"unused_files\": {:?}}}", result.unreferenced);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;
    use std::path::PathBuf;
    use std::time::Duration;

    fn result() -> AnalysisResult {
        AnalysisResult {
            root: PathBuf::from("/p"),
            total_files: 4,
            referenced: vec!["src/b.ts".into()],
            unreferenced: vec!["index.ts".into(), "src/a.ts".into()],
            exempt: vec!["app/page.tsx".into()],
            edges: Vec::new(),
            diagnostics: vec![Diagnostic::unreadable("/p/src/bad.ts", "stream did not contain valid UTF-8")],
            duration: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_plain_report() {
        let text = render_plain(&result());
        assert!(text.contains("Total files: 4"));
        assert!(text.contains("UNREFERENCED FILES (2, 50.0%):"));
        assert!(text.contains("- src/a.ts"));
        assert!(text.contains("./ (1)"));
        assert!(text.contains("src/ (1)"));
        assert!(text.contains("DIAGNOSTICS (1):"));
        assert!(text.contains("Framework-exempt: 1"));
        assert!(text.ends_with("Completed in 1.50s\n"));
    }

    #[test]
    fn test_plain_report_clean() {
        let mut r = result();
        r.unreferenced.clear();
        r.diagnostics.clear();
        let text = render_plain(&r);
        assert!(text.contains("No unreferenced files found."));
        assert!(!text.contains("DIAGNOSTICS"));
        assert!(!text.contains("BY DIRECTORY"));
    }

    #[test]
    fn test_json_report_keys() {
        let v = to_json_value(&result());
        assert_eq!(v["total_files"], 4);
        assert_eq!(v["used_files"], json!(["src/b.ts"]));
        assert_eq!(v["unused_files"], json!(["index.ts", "src/a.ts"]));
        assert_eq!(v["unused_by_directory"]["."], json!(["index.ts"]));
        assert_eq!(v["unused_by_directory"]["src"], json!(["a.ts"]));
        assert_eq!(v["exempt_files"], json!(["app/page.tsx"]));
        assert_eq!(v["diagnostics"][0]["kind"], "unreadable_file");
        assert_eq!(v["duration_secs"], 1.5);
    }
}
