use std::fmt;

/// Which end of an edge failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Source,
    Target,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Contract violations of the graph producer. The layout is rejected as a
/// whole; nothing is dropped to make it fit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("duplicate node id `{id}`")]
    DuplicateNode { id: String },
    #[error("edge `{edge}` references missing {end} node `{node}`")]
    MissingEndpoint {
        edge: String,
        end: EdgeEnd,
        node: String,
    },
}
