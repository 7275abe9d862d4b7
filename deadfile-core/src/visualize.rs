//! Graphviz DOT export of the import graph.
//!
//! - referenced files are lightgreen
//! - unreferenced files are lightcoral
//! - framework-exempt files are lightblue
//! - edges point from importer to imported file

use std::fmt::Write;

use crate::builder::AnalysisResult;

/// Generate a DOT document for an analysis result.
pub fn generate_dot(result: &AnalysisResult) -> String {
    // ~80 bytes/node + ~60 bytes/edge + header/footer
    let node_count = result.referenced.len() + result.unreferenced.len() + result.exempt.len();
    let estimated_capacity = (node_count * 80) + (result.edges.len() * 60) + 150;
    let mut dot = String::with_capacity(estimated_capacity);

    if let Err(e) = write_dot_content(&mut dot, result) {
        tracing::error!(error = %e, "failed to generate DOT output");
        return "digraph deadfile {\n}\n".to_string();
    }

    dot
}

fn write_dot_content(dot: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(dot, "digraph deadfile {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(
        dot,
        "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];"
    )?;
    writeln!(dot)?;

    let groups = [
        (&result.referenced, "lightgreen"),
        (&result.unreferenced, "lightcoral"),
        (&result.exempt, "lightblue"),
    ];
    for (files, color) in groups {
        for file in files {
            writeln!(dot, "  \"{}\" [fillcolor={}];", escape(file), color)?;
        }
    }

    writeln!(dot)?;

    for edge in &result.edges {
        writeln!(dot, "  \"{}\" -> \"{}\";", escape(&edge.from), escape(&edge.to))?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
