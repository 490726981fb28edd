use crate::config::SizingConfig;
use crate::ir::NodeKind;

use super::types::Size;

/// Box used for rank spacing. Start, end and the "normal" kinds share one
/// width so their centers line up on the same axis.
pub fn layout_box(kind: &NodeKind, sizing: &SizingConfig) -> Size {
    match kind {
        NodeKind::Decision => sizing.layout_decision,
        NodeKind::Start | NodeKind::End => sizing.layout_terminal,
        _ => sizing.layout_default,
    }
}

/// True rendered footprint, used to turn a solver center into a top-left corner.
pub fn visual_box(kind: &NodeKind, sizing: &SizingConfig) -> Size {
    match kind {
        NodeKind::Decision => sizing.visual_decision,
        NodeKind::Start | NodeKind::End => sizing.visual_terminal,
        _ => sizing.visual_default,
    }
}
