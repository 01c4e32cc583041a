use super::hierarchy::{Hierarchy, NodeId};
use super::types::Part;

/// Angular partition: each node gets `area(node)` worth of the running
/// offset along its ring, and its children share that same span one ring out.
///
/// `special_first_innermost_sector` rotates the starting node of the first
/// ring by one position.
pub fn sunburst(
    tree: &Hierarchy,
    roots: &[NodeId],
    area: impl Fn(NodeId) -> f64,
    origin: (f64, f64),
    clockwise_sectors: bool,
    special_first_innermost_sector: bool,
) -> Vec<Part> {
    let mut result = Vec::with_capacity(tree.len());
    lay_subtree(
        tree,
        roots,
        &area,
        origin,
        0,
        clockwise_sectors,
        special_first_innermost_sector,
        &mut result,
    );
    result
}

#[allow(clippy::too_many_arguments)]
fn lay_subtree(
    tree: &Hierarchy,
    nodes: &[NodeId],
    area: &impl Fn(NodeId) -> f64,
    (x0, y0): (f64, f64),
    depth: usize,
    clockwise_sectors: bool,
    special_first_innermost_sector: bool,
    result: &mut Vec<Part>,
) {
    let count = nodes.len();
    let mut offset = x0;
    for i in 0..count {
        let index = if clockwise_sectors { i } else { count - i - 1 };
        let index = if depth == 1 && special_first_innermost_sector {
            (index + 1) % count
        } else {
            index
        };
        let node = nodes[index];
        let span = area(node);
        result.push(Part {
            node,
            x0: offset,
            x1: offset + span,
            y0,
            y1: y0 + 1.0,
        });
        let children = tree.children(node);
        if !children.is_empty() {
            lay_subtree(
                tree,
                children,
                area,
                (offset, y0 + 1.0),
                depth + 1,
                clockwise_sectors,
                special_first_innermost_sector,
                result,
            );
        }
        offset += span;
    }
}
