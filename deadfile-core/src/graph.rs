//! Import graph built from resolved edges.
//!
//! Uses `DiGraphMap<&str, ()>`: nodes borrow the relative paths held by the
//! analysis result, so building the graph allocates no strings.

use std::collections::BTreeMap;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::builder::{AnalysisResult, ImportEdge};

/// Build the import graph: one node per candidate file, one edge per
/// importer → target pair.
pub fn build_import_graph<'a>(
    files: impl IntoIterator<Item = &'a str>,
    edges: &'a [ImportEdge],
) -> DiGraphMap<&'a str, ()> {
    let mut g = DiGraphMap::new();

    for file in files {
        g.add_node(file);
    }
    for edge in edges {
        g.add_edge(edge.from.as_str(), edge.to.as_str(), ());
    }

    g
}

/// Graph over every file of an analysis result.
pub fn graph_for_result(result: &AnalysisResult) -> DiGraphMap<&str, ()> {
    let files = result
        .referenced
        .iter()
        .chain(&result.unreferenced)
        .chain(&result.exempt)
        .map(String::as_str);
    build_import_graph(files, &result.edges)
}

/// Number of distinct importers per file, sorted by path.
pub fn inbound_counts<'a>(g: &DiGraphMap<&'a str, ()>) -> BTreeMap<&'a str, usize> {
    g.nodes()
        .map(|n| (n, g.neighbors_directed(n, Direction::Incoming).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str) -> ImportEdge {
        ImportEdge {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_build_and_inbound_counts() {
        let edges = vec![
            edge("src/a.ts", "src/b.ts"),
            edge("src/c.ts", "src/b.ts"),
            edge("src/b.ts", "src/d.ts"),
        ];
        let g = build_import_graph(["src/a.ts", "src/b.ts", "src/c.ts", "src/d.ts", "src/e.ts"], &edges);

        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 3);

        let counts = inbound_counts(&g);
        assert_eq!(counts["src/b.ts"], 2);
        assert_eq!(counts["src/d.ts"], 1);
        assert_eq!(counts["src/a.ts"], 0);
        assert_eq!(counts["src/e.ts"], 0);
    }

    #[test]
    fn test_self_import_is_a_loop() {
        let edges = vec![edge("src/a.ts", "src/a.ts")];
        let g = build_import_graph(["src/a.ts"], &edges);
        assert_eq!(inbound_counts(&g)["src/a.ts"], 1);
    }
}
