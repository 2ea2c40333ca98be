//! The paired DOT + ORD format (§6.1): a restricted DOT-like grammar for
//! node/edge identity (`dot`) plus a line-based per-layer ordering (`ord`).
//! Not a general Graphviz parser — just enough structure for this
//! workbench's node/edge/layer vocabulary.
//!
//! DOT supplies *identity*: `"<id>" [label="<name>", layer=<n>];` for nodes,
//! `"<a>" -> "<b>";` for edges. ORD supplies *order*: `<layer>: <name>
//! <name> ...`, one line per layer, listing names left to right in initial
//! position order. A node's final layer and position come from ORD; DOT's
//! `layer=` attribute is cross-checked against it and a mismatch is a fatal
//! parse error; the name is what ties the two files together (§6.1: "fatal
//! error ... if a node appears in one file but not the other").
//!
//! Both files are scanned twice — once to size `Graph::with_capacity`, once
//! to populate — per the Design Notes' two-pass requirement, implemented
//! here as two passes over an in-memory `&str` rather than two file opens.

use crate::error::{Error, Result};
use std::collections::HashMap;
use sugi_core::Graph;

struct DotNode {
    name: String,
    layer: u32,
}

struct DotEdge {
    source: String,
    target: String,
}

struct ParsedDot {
    graph_name: String,
    nodes: Vec<DotNode>,
    edges: Vec<DotEdge>,
}

fn strip_trailing_semicolon(s: &str) -> &str {
    s.strip_suffix(';').unwrap_or(s).trim()
}

fn unquote(s: &str) -> Option<&str> {
    s.trim().strip_prefix('"')?.strip_suffix('"')
}

/// Parses just identity out of a restricted-grammar DOT file: the graph
/// name, every `"<id>" [label="<name>", layer=<n>];` node line, and every
/// `"<a>" -> "<b>";` edge line. The first pass (counting node/edge lines) is
/// done by the caller via [`ParsedDot::nodes`]/[`ParsedDot::edges`]'s
/// lengths before the graph is actually built.
fn parse_dot(input: &str) -> Result<ParsedDot> {
    let mut graph_name = String::from("graph");
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line == "}" {
            continue;
        }
        if let Some(rest) = line.strip_prefix("digraph") {
            let rest = rest.trim().strip_suffix('{').unwrap_or(rest).trim();
            if !rest.is_empty() {
                graph_name = rest.to_string();
            }
            continue;
        }
        if line.contains("->") {
            let body = strip_trailing_semicolon(line);
            let (lhs, rhs) = body
                .split_once("->")
                .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("malformed edge line `{line}`") })?;
            let source = unquote(lhs)
                .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("expected quoted source id in `{line}`") })?;
            let target = unquote(rhs)
                .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("expected quoted target id in `{line}`") })?;
            edges.push(DotEdge { source: source.to_string(), target: target.to_string() });
            continue;
        }
        if line.starts_with('"') {
            let body = strip_trailing_semicolon(line);
            let (id_part, attrs) = body
                .split_once('[')
                .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("expected `[...]` attributes in `{line}`") })?;
            let id = unquote(id_part)
                .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("expected quoted node id in `{line}`") })?;
            let attrs = attrs.strip_suffix(']').unwrap_or(attrs);

            let mut label = id.to_string();
            let mut layer: Option<u32> = None;
            for field in attrs.split(',') {
                let field = field.trim();
                if let Some(v) = field.strip_prefix("label=") {
                    label = unquote(v).unwrap_or(v).to_string();
                } else if let Some(v) = field.strip_prefix("layer=") {
                    layer = Some(v.trim().parse().map_err(|_| Error::MalformedHeader {
                        line: line_no,
                        message: format!("non-numeric layer attribute `{v}`"),
                    })?);
                }
            }
            let layer = layer.ok_or_else(|| Error::MalformedHeader {
                line: line_no,
                message: format!("node `{id}` is missing a `layer=` attribute"),
            })?;
            let _ = label;
            nodes.push(DotNode { name: id.to_string(), layer });
            continue;
        }
        return Err(Error::UnknownRecord { line: line_no, tag: line.to_string() });
    }

    Ok(ParsedDot { graph_name, nodes, edges })
}

/// Per-layer ordered name lists parsed from an ORD file: `<layer>: <name>
/// <name> ...`.
fn parse_ord(input: &str) -> Result<Vec<Vec<String>>> {
    let mut by_layer: HashMap<u32, Vec<String>> = HashMap::new();
    let mut max_layer = 0u32;
    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (layer_str, names) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedHeader { line: line_no, message: format!("expected `<layer>: <names>` in `{line}`") })?;
        let layer: u32 = layer_str
            .trim()
            .parse()
            .map_err(|_| Error::MalformedHeader { line: line_no, message: format!("non-numeric layer `{layer_str}`") })?;
        max_layer = max_layer.max(layer);
        let list = by_layer.entry(layer).or_default();
        for (position, name) in names.split_whitespace().enumerate() {
            if list.contains(&name.to_string()) {
                return Err(Error::DuplicatePosition { line: line_no, layer, position: position as u32 });
            }
            list.push(name.to_string());
        }
    }
    let mut ordered = vec![Vec::new(); max_layer as usize + 1];
    for (layer, names) in by_layer {
        ordered[layer as usize] = names;
    }
    Ok(ordered)
}

/// Parses a DOT + ORD pair into a [`Graph`]. The ORD file is authoritative
/// for layer and position; the DOT file's `layer=` attribute is
/// cross-checked against it. Names must match exactly between the two
/// files — a name in one but not the other is a fatal dangling-endpoint
/// error.
pub fn parse(dot: &str, ord: &str) -> Result<Graph> {
    let parsed_dot = parse_dot(dot)?;
    let layers = parse_ord(ord)?;

    let dot_names: HashMap<&str, u32> = parsed_dot.nodes.iter().map(|n| (n.name.as_str(), n.layer)).collect();
    let mut ord_names: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for names in &layers {
        for name in names {
            ord_names.insert(name.as_str());
        }
    }
    for name in dot_names.keys() {
        if !ord_names.contains(name) {
            return Err(Error::DanglingEndpoint { line: 0, id: (*name).to_string() });
        }
    }

    let mut graph = Graph::with_capacity(parsed_dot.graph_name.clone(), layers.len(), parsed_dot.nodes.len(), parsed_dot.edges.len());
    for _ in 0..layers.len() {
        graph.add_layer();
    }

    let mut id_to_node = HashMap::with_capacity(parsed_dot.nodes.len());
    for (layer_idx, names) in layers.iter().enumerate() {
        for name in names {
            let declared_layer = dot_names.get(name.as_str()).ok_or_else(|| Error::DanglingEndpoint { line: 0, id: name.clone() })?;
            if *declared_layer as usize != layer_idx {
                return Err(Error::MalformedHeader {
                    line: 0,
                    message: format!("node `{name}` is on layer {declared_layer} in the DOT file but layer {layer_idx} in the ORD file"),
                });
            }
            let node_id = graph.add_node(layer_idx, name.clone());
            id_to_node.insert(name.clone(), node_id);
        }
    }

    for edge in &parsed_dot.edges {
        let &source = id_to_node.get(&edge.source).ok_or_else(|| Error::DanglingEndpoint { line: 0, id: edge.source.clone() })?;
        let &target = id_to_node.get(&edge.target).ok_or_else(|| Error::DanglingEndpoint { line: 0, id: edge.target.clone() })?;
        let (source_layer, target_layer) = (graph.node(source).layer, graph.node(target).layer);
        let (down, up) = if source_layer < target_layer { (source, target) } else { (target, source) };
        let (down_layer, up_layer) = (graph.node(down).layer, graph.node(up).layer);
        if up_layer != down_layer + 1 {
            return Err(Error::NonAdjacentLayers { line: 0, down_layer, up_layer });
        }
        graph.add_edge(down, up);
    }

    Ok(graph)
}

/// Serializes `graph` to a `(dot, ord)` pair, mirror-image of [`parse`].
/// ORD round-trips through [`parse`] exactly; DOT round-trips given the
/// caller supplies the same label convention (here, the node's own name).
pub fn write(graph: &Graph) -> (String, String) {
    use std::fmt::Write as _;

    let mut dot = String::new();
    let _ = writeln!(dot, "digraph {} {{", graph.name);
    for node in &graph.nodes {
        let _ = writeln!(dot, "  \"{}\" [label=\"{}\", layer={}];", node.name, node.name, node.layer);
    }
    for edge in &graph.edges {
        let down = graph.node(edge.down);
        let up = graph.node(edge.up);
        let _ = writeln!(dot, "  \"{}\" -> \"{}\";", down.name, up.name);
    }
    dot.push_str("}\n");

    let mut ord = String::new();
    for layer_idx in 0..graph.num_layers() {
        let names: Vec<&str> = graph.layer(layer_idx).nodes.iter().map(|&id| graph.node(id).name.as_str()).collect();
        let _ = writeln!(ord, "{}: {}", layer_idx, names.join(" "));
    }

    (dot, ord)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT: &str = "\
digraph demo {
  \"a\" [label=\"a\", layer=0];
  \"b\" [label=\"b\", layer=1];
  \"a\" -> \"b\";
}
";
    const ORD: &str = "\
0: a
1: b
";

    #[test]
    fn parses_a_minimal_pair() {
        let g = parse(DOT, ORD).unwrap();
        g.check_invariants();
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.name, "demo");
    }

    #[test]
    fn node_missing_from_ord_is_fatal() {
        let dot = "digraph d {\n  \"a\" [label=\"a\", layer=0];\n  \"b\" [label=\"b\", layer=1];\n  \"a\" -> \"b\";\n}\n";
        let ord = "0: a\n";
        let err = parse(dot, ord).unwrap_err();
        assert!(matches!(err, Error::DanglingEndpoint { .. }));
    }

    #[test]
    fn non_adjacent_layer_edge_is_fatal() {
        let dot = "digraph d {\n  \"a\" [label=\"a\", layer=0];\n  \"b\" [label=\"b\", layer=1];\n  \"c\" [label=\"c\", layer=2];\n  \"a\" -> \"c\";\n}\n";
        let ord = "0: a\n1: b\n2: c\n";
        let err = parse(dot, ord).unwrap_err();
        assert!(matches!(err, Error::NonAdjacentLayers { .. }));
    }

    #[test]
    fn write_then_parse_round_trips() {
        let g = parse(DOT, ORD).unwrap();
        let (dot2, ord2) = write(&g);
        let g2 = parse(&dot2, &ord2).unwrap();
        assert_eq!(g.nodes.len(), g2.nodes.len());
        assert_eq!(g.edges.len(), g2.edges.len());
        for layer in 0..g.num_layers() {
            let names: Vec<&str> = g.layer(layer).nodes.iter().map(|&id| g.node(id).name.as_str()).collect();
            let names2: Vec<&str> = g2.layer(layer).nodes.iter().map(|&id| g2.node(id).name.as_str()).collect();
            assert_eq!(names, names2);
        }
    }
}
