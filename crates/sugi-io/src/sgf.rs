//! The single-file SGF format (§6.1): `c `-prefixed comments, one `t <name>
//! <nodes> <edges> <layers>` header, `n <id> <layer> <position>` node
//! records, `e <source_id> <target_id>` edge records, blank lines skipped.
//!
//! Implemented as a one-shot reader ([`parse`]) that returns a fully
//! populated [`sugi_core::Graph`] or an [`Error`] — the stateful,
//! call-order-dependent reader the original tool exposed (`initSgf`,
//! `getNextNode`, `getNextEdge`, …) is deliberately not reproduced (Design
//! Notes §9). [`SgfRecordIter`] is the one place that keeps any
//! record-at-a-time state, and it exists only so tests can feed the parser
//! fixtures one line at a time.

use crate::error::{Error, Result};
use std::collections::HashMap;
use sugi_core::Graph;

/// One parsed, type-tagged line of an SGF file, together with its 1-based
/// line number for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgfRecord {
    Comment(String),
    Header { name: String, nodes: usize, edges: usize, layers: usize },
    Node { id: String, layer: u32, position: u32 },
    Edge { source: String, target: String },
}

/// Streams [`SgfRecord`]s out of an SGF text body, one line at a time,
/// without building a graph. Exposed for test fixtures that want to feed
/// the engine one record at a time rather than a whole file.
pub struct SgfRecordIter<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> SgfRecordIter<'a> {
    pub fn new(input: &'a str) -> Self {
        SgfRecordIter { lines: input.lines(), line_no: 0 }
    }
}

impl<'a> Iterator for SgfRecordIter<'a> {
    type Item = Result<(usize, SgfRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.lines.next()?;
            self.line_no += 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            return Some(parse_line(self.line_no, line));
        }
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<(usize, SgfRecord)> {
    let mut tokens = line.split_whitespace();
    let tag = tokens.next().unwrap_or("");
    let rest: Vec<&str> = tokens.collect();
    let record = match tag {
        "c" => SgfRecord::Comment(line.strip_prefix('c').unwrap_or("").trim().to_string()),
        "t" => {
            if rest.len() != 4 {
                return Err(Error::MalformedHeader {
                    line: line_no,
                    message: format!("expected `t <name> <nodes> <edges> <layers>`, got `{line}`"),
                });
            }
            let parse_count = |s: &str, field: &str| -> Result<usize> {
                s.parse::<usize>().map_err(|_| Error::MalformedHeader {
                    line: line_no,
                    message: format!("{field} is not a non-negative integer: `{s}`"),
                })
            };
            SgfRecord::Header {
                name: rest[0].to_string(),
                nodes: parse_count(rest[1], "node count")?,
                edges: parse_count(rest[2], "edge count")?,
                layers: parse_count(rest[3], "layer count")?,
            }
        }
        "n" => {
            if rest.len() != 3 {
                return Err(Error::TruncatedRecord { line: line_no });
            }
            let parse_u32 = |s: &str| s.parse::<u32>().map_err(|_| Error::TruncatedRecord { line: line_no });
            SgfRecord::Node {
                id: rest[0].to_string(),
                layer: parse_u32(rest[1])?,
                position: parse_u32(rest[2])?,
            }
        }
        "e" => {
            if rest.len() != 2 {
                return Err(Error::TruncatedRecord { line: line_no });
            }
            SgfRecord::Edge { source: rest[0].to_string(), target: rest[1].to_string() }
        }
        other => {
            return Err(Error::UnknownRecord { line: line_no, tag: other.to_string() });
        }
    };
    Ok((line_no, record))
}

/// Parses a complete SGF document into a [`Graph`]. The header's node/edge/
/// layer counts are advisory (§6.1): a mismatch against the actual record
/// counts is logged as a warning, not rejected, and the graph is sized from
/// the records actually present.
pub fn parse(input: &str) -> Result<Graph> {
    let mut comments = Vec::new();
    let mut header: Option<(String, usize, usize, usize)> = None;
    let mut node_records: Vec<(usize, String, u32, u32)> = Vec::new();
    let mut edge_records: Vec<(usize, String, String)> = Vec::new();

    for item in SgfRecordIter::new(input) {
        let (line_no, record) = item?;
        match record {
            SgfRecord::Comment(text) => comments.push(text),
            SgfRecord::Header { name, nodes, edges, layers } => {
                if header.is_some() {
                    return Err(Error::MalformedHeader {
                        line: line_no,
                        message: "duplicate header line".to_string(),
                    });
                }
                header = Some((name, nodes, edges, layers));
            }
            SgfRecord::Node { id, layer, position } => node_records.push((line_no, id, layer, position)),
            SgfRecord::Edge { source, target } => edge_records.push((line_no, source, target)),
        }
    }

    let (name, expected_nodes, expected_edges, expected_layers) =
        header.ok_or_else(|| Error::MalformedHeader { line: 0, message: "missing `t` header line".to_string() })?;

    if node_records.len() != expected_nodes {
        tracing::warn!(
            declared = expected_nodes,
            actual = node_records.len(),
            "SGF header node count disagrees with actual records"
        );
    }
    if edge_records.len() != expected_edges {
        tracing::warn!(
            declared = expected_edges,
            actual = edge_records.len(),
            "SGF header edge count disagrees with actual records"
        );
    }

    let max_layer = node_records.iter().map(|&(_, _, layer, _)| layer).max().map(|m| m as usize + 1).unwrap_or(0);
    let num_layers = max_layer.max(expected_layers);
    if num_layers != expected_layers {
        tracing::warn!(declared = expected_layers, actual = num_layers, "SGF header layer count disagrees with actual records");
    }

    let mut graph = Graph::with_capacity(name, num_layers, node_records.len(), edge_records.len());
    graph.comment = comments.join("\n");
    for _ in 0..num_layers {
        graph.add_layer();
    }

    let mut by_layer: Vec<Vec<(u32, usize, String)>> = vec![Vec::new(); num_layers];
    for (line_no, id, layer, position) in &node_records {
        by_layer[*layer as usize].push((*position, *line_no, id.clone()));
    }

    let mut id_to_node = HashMap::with_capacity(node_records.len());
    for (layer_idx, entries) in by_layer.iter_mut().enumerate() {
        entries.sort_by_key(|&(position, _, _)| position);
        for window in entries.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(Error::DuplicatePosition {
                    line: window[1].1,
                    layer: layer_idx as u32,
                    position: window[1].0,
                });
            }
        }
        for (_, _, id) in entries.iter() {
            let node_id = graph.add_node(layer_idx, id.clone());
            id_to_node.insert(id.clone(), node_id);
        }
    }

    for (line_no, source, target) in &edge_records {
        let &src = id_to_node
            .get(source)
            .ok_or_else(|| Error::DanglingEndpoint { line: *line_no, id: source.clone() })?;
        let &dst = id_to_node
            .get(target)
            .ok_or_else(|| Error::DanglingEndpoint { line: *line_no, id: target.clone() })?;
        let (src_layer, dst_layer) = (graph.node(src).layer, graph.node(dst).layer);
        let (down, up) = if src_layer < dst_layer { (src, dst) } else { (dst, src) };
        let (down_layer, up_layer) = (graph.node(down).layer, graph.node(up).layer);
        if up_layer != down_layer + 1 {
            return Err(Error::NonAdjacentLayers { line: *line_no, down_layer, up_layer });
        }
        graph.add_edge(down, up);
    }

    Ok(graph)
}

/// Serializes `graph` as SGF, mirror-image of [`parse`]: comment lines,
/// then the header, then every node record in layer-major/position-major
/// order, then every edge record. Node ids in the output are each node's
/// internal index — round-tripping through `parse` recovers the same
/// layer/position layout, which is all SGF identity actually is.
pub fn write(graph: &Graph, out: &mut impl std::io::Write) -> std::io::Result<()> {
    for line in graph.comment.lines() {
        writeln!(out, "c {line}")?;
    }
    writeln!(
        out,
        "t {} {} {} {}",
        graph.name,
        graph.nodes.len(),
        graph.edges.len(),
        graph.num_layers()
    )?;
    for layer_idx in 0..graph.num_layers() {
        for &node_id in &graph.layer(layer_idx).nodes {
            let node = graph.node(node_id);
            writeln!(out, "n {} {} {}", node_id.index(), node.layer, node.position)?;
        }
    }
    for edge in &graph.edges {
        writeln!(out, "e {} {}", edge.down.index(), edge.up.index())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH_SGF: &str = "\
c generated by a test fixture
t path 3 2 3
n 0 0 0
n 1 1 0
n 2 2 0
e 0 1
e 1 2
";

    #[test]
    fn parses_a_simple_path() {
        let g = parse(PATH_SGF).unwrap();
        g.check_invariants();
        assert_eq!(g.nodes.len(), 3);
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.num_layers(), 3);
        assert_eq!(g.comment, "generated by a test fixture");
    }

    #[test]
    fn single_edge_graph_is_not_dropped() {
        // Regression fixture for the "early-read ambiguity" antipattern:
        // exactly one edge record must survive the node/edge transition.
        let sgf = "t tiny 2 1 2\nn 0 0 0\nn 1 1 0\ne 0 1\n";
        let g = parse(sgf).unwrap();
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn header_count_mismatch_warns_but_does_not_fail() {
        let sgf = "t off-by-one 99 99 99\nn 0 0 0\nn 1 1 0\ne 0 1\n";
        let g = parse(sgf).unwrap();
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn duplicate_position_is_fatal() {
        let sgf = "t dup 2 0 1\nn 0 0 0\nn 1 0 0\n";
        let err = parse(sgf).unwrap_err();
        assert!(matches!(err, Error::DuplicatePosition { .. }));
    }

    #[test]
    fn dangling_endpoint_is_fatal() {
        let sgf = "t dangling 1 1 1\nn 0 0 0\ne 0 99\n";
        let err = parse(sgf).unwrap_err();
        assert!(matches!(err, Error::DanglingEndpoint { .. }));
    }

    #[test]
    fn non_adjacent_layer_edge_is_fatal() {
        let sgf = "t skip 3 1 3\nn 0 0 0\nn 1 1 0\nn 2 2 0\ne 0 2\n";
        let err = parse(sgf).unwrap_err();
        assert!(matches!(err, Error::NonAdjacentLayers { .. }));
    }

    #[test]
    fn write_then_parse_round_trips_structure() {
        let g = parse(PATH_SGF).unwrap();
        let mut buf = Vec::new();
        write(&g, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let g2 = parse(&text).unwrap();
        assert_eq!(g.num_layers(), g2.num_layers());
        assert_eq!(g.edges.len(), g2.edges.len());
        for layer in 0..g.num_layers() {
            assert_eq!(g.layer(layer).nodes.len(), g2.layer(layer).nodes.len());
        }
    }
}
