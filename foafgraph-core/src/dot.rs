// Graphviz DOT output for FOAF graphs

use crate::graph::FoafGraph;

pub const DEFAULT_TITLE: &str = "FOAF Graph of my.opera.com";
pub const DEFAULT_FONT_SIZE: u32 = 8;

/// Graph-level layout attributes written after the edges.
#[derive(Debug, Clone)]
pub struct DotOptions {
    pub title: String,
    pub font_size: u32,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// DOT node id for a display name: the absolute value of the CRC32 of its
/// UTF-8 bytes, read as a signed 32-bit integer.
///
/// Distinct names with equal checksums get the same id and collapse into one
/// node in the rendered graph. Nothing here detects that.
pub fn vertex_id(name: &str) -> u32 {
    (crc32fast::hash(name.as_bytes()) as i32).unsigned_abs()
}

/// Escapes text for a double-quoted DOT string.
pub fn escape_label(text: &str) -> String {
    text.replace('\\', r"\\").replace('"', r#"\""#)
}

pub fn to_dot(graph: &FoafGraph) -> String {
    to_dot_with(graph, &DotOptions::default())
}

/// Renders `graph` as a `digraph` with one declaration per distinct name
/// (keys first, then names seen only as targets) and one edge statement per
/// recorded friendship, in graph order.
pub fn to_dot_with(graph: &FoafGraph, options: &DotOptions) -> String {
    let mut dot = String::from("digraph FOAF {\n");

    for name in graph.all_vertices() {
        dot.push_str(&format!(
            "    {}[label=\"{}\", shape=box, color=blue];\n",
            vertex_id(name),
            escape_label(name)
        ));
    }

    dot.push('\n');

    for (source, target) in graph.edges() {
        dot.push_str(&format!("    {}->{};\n", vertex_id(source), vertex_id(target)));
    }

    dot.push_str("    overlap=false\n");
    dot.push_str(&format!("    label=\"{}\"\n", escape_label(&options.title)));
    dot.push_str(&format!("    fontsize={};\n", options.font_size));
    dot.push_str("}\n");

    dot
}
