use crate::graph::MockGraph;
use graphpipe_core::{Edge, PropertyValue, Vertex};
use quick_xml::de::from_str;
use serde::Deserialize;
use thiserror::Error;

const MODERN_XML: &str = include_str!("../assets/modern.xml");

#[derive(Debug, Error)]
pub enum MockGraphLoadError {
    #[error("failed to parse mock graph XML: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("duplicate {kind} id {id} in mock graph")]
    DuplicateId { kind: &'static str, id: u64 },
    #[error("edge {edge} references unknown vertex {vertex}")]
    DanglingEdge { edge: u64, vertex: u64 },
}

impl MockGraph {
    /// The six-vertex, six-edge toy graph (marko, vadas, lop, josh, ripple, peter).
    pub fn modern() -> Self {
        Self::from_xml(MODERN_XML).expect("embedded modern.xml must parse")
    }

    pub fn from_xml(xml: &str) -> Result<Self, MockGraphLoadError> {
        let parsed: XmlGraph = from_str(xml)?;

        let mut vertex_ids = Vec::with_capacity(parsed.vertices.len());
        let mut vertices = Vec::with_capacity(parsed.vertices.len());
        for node in parsed.vertices {
            if vertex_ids.contains(&node.id) {
                return Err(MockGraphLoadError::DuplicateId { kind: "vertex", id: node.id });
            }
            vertex_ids.push(node.id);
            let vertex = node
                .properties
                .into_iter()
                .fold(Vertex::new(node.id, node.label), |vertex, property| {
                    vertex.with_property(property.name, parse_property_value(&property.value))
                });
            vertices.push(vertex);
        }

        let mut edge_ids = Vec::with_capacity(parsed.edges.len());
        let mut edges = Vec::with_capacity(parsed.edges.len());
        for link in parsed.edges {
            if edge_ids.contains(&link.id) {
                return Err(MockGraphLoadError::DuplicateId { kind: "edge", id: link.id });
            }
            edge_ids.push(link.id);
            for endpoint in [link.out_vertex, link.in_vertex] {
                if !vertex_ids.contains(&endpoint) {
                    return Err(MockGraphLoadError::DanglingEdge { edge: link.id, vertex: endpoint });
                }
            }
            let edge = link.properties.into_iter().fold(
                Edge::new(link.id, link.label, link.out_vertex, link.in_vertex),
                |edge, property| edge.with_property(property.name, parse_property_value(&property.value)),
            );
            edges.push(edge);
        }

        Ok(MockGraph::new(vertices, edges))
    }
}

impl Default for MockGraph {
    fn default() -> Self {
        Self::modern()
    }
}

#[derive(Debug, Deserialize)]
struct XmlGraph {
    #[serde(rename = "vertex", default)]
    vertices: Vec<XmlVertex>,
    #[serde(rename = "edge", default)]
    edges: Vec<XmlEdge>,
}

#[derive(Debug, Deserialize)]
struct XmlVertex {
    #[serde(rename = "@id")]
    id: u64,
    #[serde(rename = "@label")]
    label: String,
    #[serde(rename = "property", default)]
    properties: Vec<XmlProperty>,
}

#[derive(Debug, Deserialize)]
struct XmlEdge {
    #[serde(rename = "@id")]
    id: u64,
    #[serde(rename = "@label")]
    label: String,
    #[serde(rename = "@out")]
    out_vertex: u64,
    #[serde(rename = "@in")]
    in_vertex: u64,
    #[serde(rename = "property", default)]
    properties: Vec<XmlProperty>,
}

#[derive(Debug, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value")]
    value: String,
}

fn parse_property_value(value: &str) -> PropertyValue {
    if let Ok(boolean) = value.parse::<bool>() {
        return PropertyValue::from(boolean);
    }
    if let Ok(integer) = value.parse::<i64>() {
        return PropertyValue::from(integer);
    }
    if let Ok(number) = value.parse::<f64>() {
        return PropertyValue::from(number);
    }
    PropertyValue::from(value)
}
