use crate::ir::NodeKind;
use crate::layout::is_negative_label;
use serde::{Deserialize, Serialize};

/// Presentation lookup keyed by node kind and edge label. The layout engine
/// never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub start_color: String,
    pub end_color: String,
    pub decision_color: String,
    pub query_color: String,
    pub mutation_color: String,
    pub loop_color: String,
    pub node_color: String,
    pub edge_color: String,
    pub positive_edge_color: String,
    pub negative_edge_color: String,
}

impl Theme {
    pub fn flow_builder() -> Self {
        Self {
            name: "flow-builder".to_string(),
            start_color: "#86efac".to_string(),
            end_color: "#fca5a5".to_string(),
            decision_color: "#fdba74".to_string(),
            query_color: "#a78bfa".to_string(),
            mutation_color: "#f472b6".to_string(),
            loop_color: "#f97316".to_string(),
            node_color: "#cbd5e1".to_string(),
            edge_color: "#94a3b8".to_string(),
            positive_edge_color: "#10b981".to_string(),
            negative_edge_color: "#f43f5e".to_string(),
        }
    }

    pub fn monochrome() -> Self {
        Self {
            name: "monochrome".to_string(),
            start_color: "#E5E7EB".to_string(),
            end_color: "#9CA3AF".to_string(),
            decision_color: "#D1D5DB".to_string(),
            query_color: "#F3F4F6".to_string(),
            mutation_color: "#F3F4F6".to_string(),
            loop_color: "#D1D5DB".to_string(),
            node_color: "#FFFFFF".to_string(),
            edge_color: "#4B5563".to_string(),
            positive_edge_color: "#111827".to_string(),
            negative_edge_color: "#6B7280".to_string(),
        }
    }

    pub fn node_fill(&self, kind: &NodeKind) -> &str {
        match kind {
            NodeKind::Start => &self.start_color,
            NodeKind::End => &self.end_color,
            NodeKind::Decision => &self.decision_color,
            NodeKind::Query => &self.query_color,
            NodeKind::Mutation => &self.mutation_color,
            NodeKind::Loop => &self.loop_color,
            _ => &self.node_color,
        }
    }

    /// Negative labels win over positive ones, so "Not true" strokes as negative.
    pub fn edge_stroke(&self, label: Option<&str>, negative_tokens: &[String]) -> &str {
        if is_negative_label(label, negative_tokens) {
            return &self.negative_edge_color;
        }
        let lower = label.unwrap_or_default().to_lowercase();
        if lower.contains("true") || lower.contains("yes") {
            return &self.positive_edge_color;
        }
        &self.edge_color
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::flow_builder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_without_accent_use_node_color() {
        let theme = Theme::flow_builder();
        assert_eq!(theme.node_fill(&NodeKind::Start), "#86efac");
        assert_eq!(theme.node_fill(&NodeKind::Action), "#cbd5e1");
        assert_eq!(
            theme.node_fill(&NodeKind::Other("callout".to_string())),
            "#cbd5e1"
        );
    }

    #[test]
    fn edge_stroke_follows_branch_label() {
        let theme = Theme::flow_builder();
        let tokens = vec!["false".to_string(), "no".to_string()];
        assert_eq!(theme.edge_stroke(Some("True"), &tokens), "#10b981");
        assert_eq!(theme.edge_stroke(Some("FALSE"), &tokens), "#f43f5e");
        assert_eq!(theme.edge_stroke(Some("Not true"), &tokens), "#f43f5e");
        assert_eq!(theme.edge_stroke(None, &tokens), "#94a3b8");
    }
}
