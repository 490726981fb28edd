#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod oracle;
pub mod parser;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig};
pub use ir::{Analysis, Direction, Edge, Node, NodeKind};
pub use layout::{Layout, LayoutError, compute_layout, layout_analysis};
pub use oracle::{Oracle, OracleError};
pub use session::{Session, SessionError};
pub use theme::Theme;
