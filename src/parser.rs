use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{Analysis, Edge, Node, NodeKind, Warning, WarningKind};
use crate::oracle::{Oracle, OracleError};

static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<kind>[A-Za-z][\w-]*)\s+(?P<id>[\w.-]+)(?:@(?P<line>\d+))?\s*(?::\s*(?P<label>.*))?$")
        .unwrap()
});
static EDGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<source>[\w.-]+?)\s*(?P<arrow>->|~>)\s*(?P<target>[\w.-]+)(?:\s*\[(?P<label>[^\]]*)\])?$",
    )
    .unwrap()
});
static WARNING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!\s*(?P<kind>[\w-]+)(?:@(?P<line>\d+))?\s*:\s*(?P<message>.+)$").unwrap()
});

/// Deterministic oracle over a small line-oriented flow description:
///
/// ```text
/// start s: Begin
/// decision d@4: Has items?
/// s -> d
/// d -> a [True]
/// a ~> d
/// ! limit@7: SOQL inside loop
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOracle;

impl Oracle for RuleOracle {
    fn analyze(&self, source: &str) -> Result<Analysis, OracleError> {
        parse_flow_rules(source)
    }
}

pub fn parse_flow_rules(input: &str) -> Result<Analysis, OracleError> {
    let mut analysis = Analysis::default();

    for (idx, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let syntax_error = || OracleError::Syntax {
            line: idx + 1,
            text: line.to_string(),
        };

        if let Some(caps) = EDGE_RE.captures(line) {
            let mut edge = Edge::new(
                format!("e{}", analysis.edges.len() + 1),
                &caps["source"],
                &caps["target"],
            );
            edge.label = caps
                .name("label")
                .map(|m| m.as_str().trim().to_string())
                .filter(|label| !label.is_empty());
            if &caps["arrow"] == "~>" {
                edge.animated = Some(true);
            }
            analysis.edges.push(edge);
            continue;
        }

        if let Some(caps) = WARNING_RE.captures(line) {
            let kind = WarningKind::from_token(&caps["kind"]).ok_or_else(syntax_error)?;
            analysis.warnings.push(Warning {
                kind,
                message: caps["message"].trim().to_string(),
                line: parse_line_ref(caps.name("line").map(|m| m.as_str())),
            });
            continue;
        }

        if let Some(caps) = NODE_RE.captures(line) {
            let kind = NodeKind::parse(&caps["kind"]);
            if matches!(kind, NodeKind::Other(_)) {
                return Err(syntax_error());
            }
            let id = caps["id"].to_string();
            let label = caps
                .name("label")
                .map(|m| m.as_str().trim())
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| id.clone());
            let mut node = Node::new(id, kind, label);
            node.source_line = parse_line_ref(caps.name("line").map(|m| m.as_str()));
            analysis.nodes.push(node);
            continue;
        }

        return Err(syntax_error());
    }

    Ok(analysis)
}

fn parse_line_ref(token: Option<&str>) -> Option<u32> {
    token.and_then(|t| t.parse::<u32>().ok()).filter(|line| *line > 0)
}
