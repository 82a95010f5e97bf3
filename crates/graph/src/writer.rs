use crate::error::{GraphError, Result};
use crate::types::DependencyGraph;
use petgraph::visit::EdgeRef;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Textual serializations of a finished graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Graphviz directed-graph notation
    #[default]
    Dot,

    /// GraphML
    Xml,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" => Ok(OutputFormat::Dot),
            "xml" | "graphml" => Ok(OutputFormat::Xml),
            other => Err(GraphError::UnknownFormat(other.to_string())),
        }
    }
}

pub fn write_graph<W: Write>(graph: &DependencyGraph, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Dot => write_dot(graph, out),
        OutputFormat::Xml => write_graphml(graph, out),
    }
}

/// Graphviz output: vertices labelled by name, edges by "line N".
pub fn write_dot<W: Write>(graph: &DependencyGraph, out: &mut W) -> Result<()> {
    writeln!(out, "digraph G {{")?;
    for (idx, vertex) in graph.vertices() {
        writeln!(out, "{}[label=\"{}\"];", idx.index(), escape_dot(&vertex.name))?;
    }
    for edge in graph.graph.edge_references() {
        writeln!(
            out,
            "{}->{} [label=\"line {}\"];",
            edge.source().index(),
            edge.target().index(),
            edge.weight().line
        )?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// GraphML output with an int `line` key on edges and a string `name` key on nodes.
pub fn write_graphml<W: Write>(graph: &DependencyGraph, out: &mut W) -> Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;
    writeln!(
        out,
        r#"  <key id="key0" for="edge" attr.name="line" attr.type="int" />"#
    )?;
    writeln!(
        out,
        r#"  <key id="key1" for="node" attr.name="name" attr.type="string" />"#
    )?;
    writeln!(
        out,
        r#"  <graph id="G" edgedefault="directed" parse.nodeids="canonical" parse.edgeids="canonical" parse.order="nodesfirst">"#
    )?;
    for (idx, vertex) in graph.vertices() {
        writeln!(out, r#"    <node id="n{}">"#, idx.index())?;
        writeln!(out, r#"      <data key="key1">{}</data>"#, escape_xml(&vertex.name))?;
        writeln!(out, "    </node>")?;
    }
    for edge in graph.graph.edge_references() {
        writeln!(
            out,
            r#"    <edge id="e{}" source="n{}" target="n{}">"#,
            edge.id().index(),
            edge.source().index(),
            edge.target().index()
        )?;
        writeln!(out, r#"      <data key="key0">{}</data>"#, edge.weight().line)?;
        writeln!(out, "    </edge>")?;
    }
    writeln!(out, "  </graph>")?;
    writeln!(out, "</graphml>")?;
    Ok(())
}

fn escape_dot(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
