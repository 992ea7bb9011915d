use super::node::{NodeKind, Position};

const LANE_TOP: f64 = 40.0;
const ROW_HEIGHT: f64 = 90.0;

/// Horizontal position of each kind's lane, left to right in data-flow order.
fn lane_x(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::SourceField => 40.0,
        NodeKind::Constant => 260.0,
        NodeKind::Conditional => 480.0,
        NodeKind::Function => 700.0,
        NodeKind::TargetField => 960.0,
    }
}

/// Position of the `index`-th node (zero-based) placed in `kind`'s lane.
pub fn lane_position(kind: NodeKind, index: usize) -> Position {
    Position {
        x: lane_x(kind),
        y: LANE_TOP + ROW_HEIGHT * index as f64,
    }
}
