use serde::Serialize;

use crate::config::EdgeWeights;
use crate::ir::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeClass {
    MainPath,
    NegativeBranch,
    SelfLoop,
}

impl EdgeClass {
    pub fn weight(self, weights: &EdgeWeights) -> f32 {
        match self {
            Self::MainPath => weights.main_path,
            Self::NegativeBranch => weights.negative_branch,
            Self::SelfLoop => weights.self_loop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MainPath => "main-path",
            Self::NegativeBranch => "negative-branch",
            Self::SelfLoop => "self-loop",
        }
    }
}

pub fn classify_edge(edge: &Edge, weights: &EdgeWeights) -> EdgeClass {
    if edge.is_self_loop() {
        EdgeClass::SelfLoop
    } else if is_negative_label(edge.label.as_deref(), &weights.negative_tokens) {
        EdgeClass::NegativeBranch
    } else {
        EdgeClass::MainPath
    }
}

pub fn is_negative_label(label: Option<&str>, tokens: &[String]) -> bool {
    let Some(label) = label else {
        return false;
    };
    let lower = label.to_lowercase();
    tokens
        .iter()
        .any(|token| !token.is_empty() && lower.contains(&token.to_lowercase()))
}
