use super::hierarchy::{Hierarchy, NodeId};
use super::types::Part;

const GOLDEN_RATIO: f64 = 1.618;
const MAX_TOP_PADDING_RATIO: f64 = 0.33;
const MAX_PADDING_RATIO: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreemapRect {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl TreemapRect {
    pub fn new(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }
}

/// A strip of consecutive siblings laid side by side. `dependent_size` is the
/// strip thickness; `section_sizes` the length of each member along the strip.
#[derive(Debug, Clone)]
struct LayoutElement {
    count: usize,
    dependent_size: f64,
    section_sizes: Vec<f64>,
}

pub fn get_top_padding(requested: f64, full_height: f64) -> f64 {
    requested.min(full_height * MAX_TOP_PADDING_RATIO)
}

fn lay_vector(nodes: &[NodeId], independent_size: f64, area: &dyn Fn(NodeId) -> f64) -> LayoutElement {
    let total: f64 = nodes.iter().map(|n| area(*n)).sum();
    // zero-area strips collapse to a point at the current corner
    let dependent_size = if total > 0.0 && independent_size > 0.0 {
        total / independent_size
    } else {
        0.0
    };
    let section_sizes = nodes
        .iter()
        .map(|n| {
            if dependent_size > 0.0 {
                area(*n) / dependent_size
            } else {
                0.0
            }
        })
        .collect();
    LayoutElement {
        count: nodes.len(),
        dependent_size,
        section_sizes,
    }
}

/// Worst aspect ratio of a strip, in `(0, 1]` where 1 is perfectly square.
fn least_squarish_aspect_ratio(element: &LayoutElement) -> f64 {
    element.section_sizes.iter().fold(1.0_f64, |worst, size| {
        worst
            .min(size / element.dependent_size)
            .min(element.dependent_size / size)
    })
}

/// Grows the strip one node at a time while its worst aspect ratio improves.
/// A tie keeps the grown strip and stops; a drop backs off to the last one.
fn best_vector(nodes: &[NodeId], independent_size: f64, area: &dyn Fn(NodeId) -> f64) -> LayoutElement {
    let mut previous = lay_vector(&nodes[..1], independent_size, area);
    let mut previous_ratio = least_squarish_aspect_ratio(&previous);
    for count in 2..=nodes.len() {
        let current = lay_vector(&nodes[..count], independent_size, area);
        let ratio = least_squarish_aspect_ratio(&current);
        if ratio < previous_ratio {
            break;
        }
        let tied = ratio == previous_ratio;
        previous = current;
        previous_ratio = ratio;
        if tied {
            break;
        }
    }
    previous
}

fn vector_node_coordinates(
    element: &LayoutElement,
    nodes: &[NodeId],
    x0: f64,
    y0: f64,
    vertical: bool,
) -> Vec<Part> {
    let mut offset = 0.0;
    element
        .section_sizes
        .iter()
        .zip(nodes)
        .map(|(size, node)| {
            let start = offset;
            offset += size;
            let (px0, py0) = if vertical {
                (x0 + start, y0)
            } else {
                (x0, y0 + start)
            };
            let (px1, py1) = if vertical {
                (px0 + size, py0 + element.dependent_size)
            } else {
                (px0 + element.dependent_size, py0 + size)
            };
            Part {
                node: *node,
                x0: px0,
                y0: py0,
                x1: px1,
                y1: py1,
            }
        })
        .collect()
}

/// Squarified treemap of `nodes` (siblings, largest first) inside `rect`.
/// `area` maps a node to its pixel area; children are recursed into their
/// parent's rectangle minus padding.
pub fn treemap(
    tree: &Hierarchy,
    nodes: &[NodeId],
    area: &dyn Fn(NodeId) -> f64,
    top_padding: &dyn Fn(NodeId) -> f64,
    padding: &dyn Fn(NodeId) -> f64,
    rect: TreemapRect,
) -> Vec<Part> {
    if nodes.is_empty() {
        return Vec::new();
    }
    // bias toward landscape rectangles with a golden ratio of width to height
    let vertical = rect.width / GOLDEN_RATIO <= rect.height;
    let independent_size = if vertical { rect.width } else { rect.height };
    let element = best_vector(nodes, independent_size, area);
    let vector = vector_node_coordinates(&element, nodes, rect.x0, rect.y0, vertical);

    let mut result = vector.clone();
    for part in &vector {
        let children = tree.children(part.node);
        if part.x0 == part.x1 || part.y0 == part.y1 || children.is_empty() {
            continue;
        }
        let full_width = part.x1 - part.x0;
        let full_height = part.y1 - part.y0;
        let node_padding = padding(part.node);
        let padding_top = get_top_padding(top_padding(part.node), full_height);
        let padding_side = node_padding.min(full_width * MAX_PADDING_RATIO);
        let padding_bottom = node_padding.min(full_height * MAX_PADDING_RATIO);
        let width = full_width - 2.0 * padding_side;
        let height = full_height - padding_top - padding_bottom;
        let shrink = (width * height) / (full_width * full_height);
        let child_area = |id: NodeId| shrink * area(id);
        result.extend(treemap(
            tree,
            children,
            &child_area,
            top_padding,
            padding,
            TreemapRect::new(part.x0 + padding_side, part.y0 + padding_top, width, height),
        ));
    }

    let dependent = element.dependent_size;
    let remaining = if vertical {
        TreemapRect::new(rect.x0, rect.y0 + dependent, rect.width, rect.height - dependent)
    } else {
        TreemapRect::new(rect.x0 + dependent, rect.y0, rect.width - dependent, rect.height)
    };
    result.extend(treemap(
        tree,
        &nodes[element.count..],
        area,
        top_padding,
        padding,
        remaining,
    ));
    result
}
