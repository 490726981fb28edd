use crate::config::EdgeWeights;
use crate::ir::Warning;
use crate::layout::{EdgeClass, Layout};
use crate::theme::Theme;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub rank: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub animated: bool,
    pub weight: f32,
    pub class: EdgeClass,
    pub back_edge: bool,
    pub stroke: String,
}

impl LayoutDump {
    pub fn from_layout(
        layout: &Layout,
        warnings: &[Warning],
        theme: &Theme,
        weights: &EdgeWeights,
    ) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.node.id.clone(),
                kind: node.node.kind.to_string(),
                label: node.node.label.clone(),
                details: node.node.detail.clone(),
                line: node.node.source_line,
                rank: node.rank,
                x: node.position.x,
                y: node.position.y,
                width: node.visual_box.width,
                height: node.visual_box.height,
                center_x: node.position.x + node.visual_box.width / 2.0,
                center_y: node.position.y + node.visual_box.height / 2.0,
                color: theme.node_fill(&node.node.kind).to_string(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.edge.id.clone(),
                source: edge.edge.source.clone(),
                target: edge.edge.target.clone(),
                label: edge.edge.label.clone(),
                animated: edge.edge.animated.unwrap_or(false),
                weight: edge.weight,
                class: edge.class,
                back_edge: edge.back_edge,
                stroke: theme
                    .edge_stroke(edge.edge.label.as_deref(), &weights.negative_tokens)
                    .to_string(),
            })
            .collect();

        LayoutDump {
            direction: layout.direction.as_token().to_string(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
            warnings: warnings.to_vec(),
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
    Ok(())
}
