//! Directed-graph hand-off for rendering trees and automata.
//!
//! A [`Graph`] is plain data: it can be serialized with serde or turned
//! into Graphviz DOT text. Rendering the DOT text into an image is left to
//! external tools.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    DoubleCircle,
    Plaintext,
}

impl Shape {
    fn dot_name(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::DoubleCircle => "doublecircle",
            Shape::Plaintext => "plaintext",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub name: String,
    /// Left-to-right layout, used for automata. Trees are laid out top-down.
    pub left_to_right: bool,
    /// Node the start arrow points at, if any.
    pub start: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Graph {
            name: name.to_owned(),
            left_to_right: false,
            start: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: String, label: String, shape: Shape) {
        self.nodes.push(GraphNode { id, label, shape });
    }

    pub fn add_edge(&mut self, from: String, to: String, label: Option<String>) {
        self.edges.push(GraphEdge { from, to, label });
    }

    pub fn dot(&self) -> String {
        let mut dot = format!("digraph {} {{\n", self.name);
        dot.push_str(if self.left_to_right {
            "rankdir=LR;\n"
        } else {
            "rankdir=TB;\n"
        });
        if self.start.is_some() {
            dot.push_str("empty [label = \"\" shape = plaintext];\n");
        }
        for node in &self.nodes {
            dot.push_str(&format!(
                "{} [label = \"{}\" shape = {}];\n",
                node.id,
                escape(&node.label),
                node.shape.dot_name()
            ));
        }
        if let Some(ref start) = self.start {
            dot.push_str(&format!("empty -> {} [label = \"start\"];\n", start));
        }
        for edge in &self.edges {
            match edge.label {
                Some(ref label) => dot.push_str(&format!(
                    "{} -> {} [label = \"{}\"];\n",
                    edge.from,
                    edge.to,
                    escape(label)
                )),
                None => dot.push_str(&format!("{} -> {};\n", edge.from, edge.to)),
            }
        }
        dot.push('}');
        dot.push('\n');
        dot
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = BufWriter::new(fs::File::create(path)?);
        f.write_all(self.dot().as_bytes())?;
        f.flush()?;
        Ok(())
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[test]
fn dot_marks_start_and_shapes() {
    let mut graph = Graph::new("dfa");
    graph.left_to_right = true;
    graph.start = Some("S0".to_owned());
    graph.add_node("S0".to_owned(), "S0\n{1}".to_owned(), Shape::Circle);
    graph.add_node("S1".to_owned(), "S1".to_owned(), Shape::DoubleCircle);
    graph.add_edge("S0".to_owned(), "S1".to_owned(), Some("L".to_owned()));
    let dot = graph.dot();
    assert!(dot.starts_with("digraph dfa {\nrankdir=LR;\n"));
    assert!(dot.contains("S0 [label = \"S0\\n{1}\" shape = circle];"));
    assert!(dot.contains("S1 [label = \"S1\" shape = doublecircle];"));
    assert!(dot.contains("empty -> S0 [label = \"start\"];"));
    assert!(dot.contains("S0 -> S1 [label = \"L\"];"));
    assert!(dot.ends_with("}\n"));
}

#[test]
fn graph_serializes_to_json() {
    let mut graph = Graph::new("tree");
    graph.add_node("n0".to_owned(), "'#' (1)".to_owned(), Shape::Plaintext);
    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["nodes"][0]["shape"], "plaintext");
    assert_eq!(json["start"], serde_json::Value::Null);
    assert_eq!(json["edges"].as_array().map(|e| e.len()), Some(0));
}
