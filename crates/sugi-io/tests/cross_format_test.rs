//! Black-box test that a graph survives a hop through both textual formats:
//! parse DOT+ORD, write SGF, parse that SGF back, and check the layer
//! structure and edge count agree (§6.2's round-trip requirement, exercised
//! across formats rather than within one).

const DOT: &str = "\
digraph demo {
  \"a\" [label=\"a\", layer=0];
  \"b\" [label=\"b\", layer=1];
  \"c\" [label=\"c\", layer=1];
  \"a\" -> \"b\";
  \"a\" -> \"c\";
}
";
const ORD: &str = "\
0: a
1: c b
";

#[test]
fn dot_ord_graph_round_trips_through_sgf() {
    let g = sugi_io::dot_ord::parse(DOT, ORD).unwrap();
    let mut buf = Vec::new();
    sugi_io::sgf::write(&g, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let g2 = sugi_io::sgf::parse(&text).unwrap();

    assert_eq!(g.num_layers(), g2.num_layers());
    assert_eq!(g.edges.len(), g2.edges.len());
    for layer in 0..g.num_layers() {
        assert_eq!(g.layer(layer).nodes.len(), g2.layer(layer).nodes.len());
    }
    g2.check_invariants();
}
