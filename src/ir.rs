use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopBottom),
            "LR" => Some(Self::LeftRight),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
        }
    }
}

/// Semantic type of a flow step. Unknown tokens are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    End,
    Decision,
    Action,
    Query,
    Mutation,
    Loop,
    Subflow,
    Error,
    Other(String),
}

impl NodeKind {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "end" => Self::End,
            "decision" => Self::Decision,
            "action" => Self::Action,
            "query" | "soql" => Self::Query,
            "mutation" | "dml" => Self::Mutation,
            "loop" => Self::Loop,
            "subflow" => Self::Subflow,
            "error" => Self::Error,
            _ => Self::Other(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Decision => "decision",
            Self::Action => "action",
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Loop => "loop",
            Self::Subflow => "subflow",
            Self::Error => "error",
            Self::Other(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    #[serde(rename = "details", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "line", default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<u32>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            detail: None,
            source_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            animated: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    Limit,
    BestPractice,
    Security,
}

impl WarningKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "limit" => Some(Self::Limit),
            "best-practice" => Some(Self::BestPractice),
            "security" => Some(Self::Security),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Graph plus diagnostics, as produced by an oracle for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_accepts_aliases_and_keeps_unknown_names() {
        assert_eq!(NodeKind::parse("SOQL"), NodeKind::Query);
        assert_eq!(NodeKind::parse("dml"), NodeKind::Mutation);
        assert_eq!(NodeKind::parse(" End "), NodeKind::End);
        assert_eq!(
            NodeKind::parse("callout"),
            NodeKind::Other("callout".to_string())
        );
        assert_eq!(NodeKind::parse("callout").as_str(), "callout");
    }

    #[test]
    fn node_uses_payload_field_names() {
        let node: Node = serde_json::from_str(
            r#"{"id":"n1","type":"soql","label":"Get Contacts","details":"SELECT Id","line":4}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Query);
        assert_eq!(node.detail.as_deref(), Some("SELECT Id"));
        assert_eq!(node.source_line, Some(4));

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "query");
        assert_eq!(json["line"], 4);
    }

    #[test]
    fn edge_passes_animated_flag_through() {
        let edge: Edge =
            serde_json::from_str(r#"{"id":"e1","source":"a","target":"b"}"#).unwrap();
        assert_eq!(edge.animated, None);
        let json = serde_json::to_string(&edge).unwrap();
        assert!(!json.contains("animated"));

        let edge: Edge = serde_json::from_str(
            r#"{"id":"e2","source":"a","target":"a","label":"again","animated":true}"#,
        )
        .unwrap();
        assert_eq!(edge.animated, Some(true));
        assert!(edge.is_self_loop());
    }

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("td"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_token("LR"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_token("RL"), None);
        let parsed: Direction = serde_json::from_str("\"TD\"").unwrap();
        assert_eq!(parsed, Direction::TopBottom);
    }

    #[test]
    fn warning_kind_is_kebab_case() {
        let warning: Warning =
            serde_json::from_str(r#"{"type":"best-practice","message":"bulkify"}"#).unwrap();
        assert_eq!(warning.kind, WarningKind::BestPractice);
        assert_eq!(WarningKind::from_token("Security"), Some(WarningKind::Security));
    }
}
