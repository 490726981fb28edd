//! One analysis at a time: the session hands out tickets, accepts only the
//! newest one, and never keeps a graph from an earlier or failed run.

use std::fmt;

use crate::config::LayoutConfig;
use crate::ir::{Analysis, Direction, Warning};
use crate::layout::{Layout, LayoutError, layout_analysis};
use crate::oracle::{Oracle, OracleError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("nothing to analyze: source is empty")]
    EmptySource,
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("analysis {ticket} was superseded by analysis {latest}")]
    Superseded { ticket: Ticket, latest: u64 },
}

/// Handle for one in-flight analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub layout: Layout,
    pub warnings: Vec<Warning>,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: LayoutConfig,
    direction: Direction,
    generation: u64,
    in_flight: Option<u64>,
    current: Option<Rendered>,
}

impl Session {
    pub fn new(config: LayoutConfig, direction: Direction) -> Self {
        Self {
            config,
            direction,
            generation: 0,
            in_flight: None,
            current: None,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> Option<&Rendered> {
        self.current.as_ref()
    }

    /// Starts a new analysis. Any ticket handed out earlier is now stale.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        tracing::debug!(generation = self.generation, "analysis started");
        Ticket(self.generation)
    }

    /// Settles the analysis behind `ticket`.
    ///
    /// A stale ticket leaves the session untouched. Otherwise the previous
    /// graph is replaced wholesale on success and dropped on failure.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Analysis, OracleError>,
    ) -> Result<&Rendered, SessionError> {
        if self.in_flight != Some(ticket.0) {
            tracing::debug!(%ticket, latest = self.generation, "stale analysis discarded");
            return Err(SessionError::Superseded {
                ticket,
                latest: self.generation,
            });
        }
        self.in_flight = None;
        self.current = None;

        let analysis = result?;
        let layout = layout_analysis(&analysis, self.direction, &self.config)?;
        tracing::debug!(
            generation = ticket.0,
            nodes = layout.nodes.len(),
            warnings = analysis.warnings.len(),
            "analysis rendered"
        );
        Ok(&*self.current.insert(Rendered {
            layout,
            warnings: analysis.warnings,
            generation: ticket.0,
        }))
    }

    pub fn analyze(
        &mut self,
        oracle: &dyn Oracle,
        source: &str,
    ) -> Result<&Rendered, SessionError> {
        if source.trim().is_empty() {
            return Err(SessionError::EmptySource);
        }
        let ticket = self.begin();
        let result = oracle.analyze(source);
        self.complete(ticket, result)
    }

    /// Drops the current graph and invalidates anything in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.current = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LayoutConfig::default(), Direction::TopBottom)
    }
}
