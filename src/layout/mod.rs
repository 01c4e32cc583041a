pub mod circline;
pub mod fill_text;
pub mod geometry;
pub mod hierarchy;
pub mod link_text;
pub mod optimize;
pub mod sunburst;
pub(crate) mod text;
pub mod treemap;
pub(crate) mod types;
pub use types::*;

use crate::color::{fill_text_color, parse_color};
use crate::config::PartitionConfig;
use crate::spec::{FillContext, LayerFillLabel, PartitionSpec, ResolvedFillLabel, ValueFormatter};
use crate::text_metrics::TextMeasure;
use circline::ring_sector_construction;
use fill_text::{FillTextInput, FillTextSettings, RectangleConstruction, fill_text_layout, in_sector_rotation};
use geometry::{Pixels, Point, Radius, TAU, mean_angle, true_bearing_to_standard_position_angle};
use hierarchy::{Hierarchy, NodeId};
use link_text::{LinkLabelFrame, LinkLabelInput, link_text_layout};
use std::collections::HashSet;
use treemap::{TreemapRect, get_top_padding};

pub use text::FastTextMeasure;

const DEFAULT_FILL_COLOR: &str = "rgba(128,0,0,0.5)";
/// Treemap rectangles shorter than this show no text.
const MIN_TREEMAP_TEXT_HEIGHT: Pixels = 8.0;

/// Pixel frame of one chart: drawing area inside the margins and, for
/// sunbursts, the disk.
#[derive(Debug, Clone, Copy)]
struct ChartFrame {
    inner_width: Pixels,
    inner_height: Pixels,
    disk_center: Point,
    outer_radius: Radius,
    inner_radius: Radius,
}

impl ChartFrame {
    fn new(config: &PartitionConfig) -> Self {
        let margin = config.margin;
        let inner_width = config.width * (1.0 - margin.left.min(1.0) - margin.right.min(1.0));
        let inner_height = config.height * (1.0 - margin.top.min(1.0) - margin.bottom.min(1.0));
        let left = config.width * margin.left;
        let top = config.height * margin.top;
        let disk_center = match config.partition_layout {
            PartitionLayout::Sunburst => Point::new(left + inner_width / 2.0, top + inner_height / 2.0),
            PartitionLayout::Treemap => Point::new(left, top),
        };
        let shorter = inner_width.min(inner_height);
        let outer_radius = (config.outer_size_ratio * shorter).min(shorter - config.sector_line_width) / 2.0;
        Self {
            inner_width,
            inner_height,
            disk_center,
            outer_radius,
            inner_radius: config.empty_size_ratio * outer_radius,
        }
    }
}

fn null_shape_view_model(config: &PartitionConfig, frame: &ChartFrame) -> ShapeViewModel {
    ShapeViewModel {
        partition_layout: config.partition_layout,
        width: config.width,
        height: config.height,
        disk_center: frame.disk_center,
        outer_radius: 0.0,
        quad_view_model: Vec::new(),
        row_sets: Vec::new(),
        outside_links_view_model: Vec::new(),
        link_label_view_models: Vec::new(),
        link_label_style: link_label_style(config),
        hierarchy: None,
    }
}

fn link_label_style(config: &PartitionConfig) -> LinkLabelStyle {
    let link_label = &config.link_label;
    let text_color = fill_text_color(
        &link_label.text_color,
        link_label.text_invertible,
        link_label.text_contrast,
        &config.background_color,
        &config.background_color,
    );
    LinkLabelStyle {
        font_size: link_label.font_size,
        line_width: link_label.line_width,
        label_font: link_label.font.clone(),
        value_font: link_label.value_font.clone(),
        stroke_color: text_color.clone(),
        text_color,
    }
}

/// Lateral and bottom padding of a treemap node's children.
fn treemap_groove(depth: usize) -> Pixels {
    match depth {
        0 => 0.0,
        1 => 2.0,
        _ => 1.0,
    }
}

fn normalize_color(color: &str) -> String {
    parse_color(color).map_or_else(|| color.to_string(), |rgba| rgba.to_css())
}

fn has_room(config: &PartitionConfig, node: &ShapeTreeNode) -> bool {
    match config.partition_layout {
        PartitionLayout::Sunburst => {
            let diff = node.x1 - node.x0;
            let angular = if diff < 0.0 { TAU + diff } else { diff };
            angular * node.y_mid_px > config.min_font_size.max(config.link_label.maximum_section)
        }
        PartitionLayout::Treemap => {
            node.x1 - node.x0 > config.min_font_size && node.y1px - node.y0px > config.min_font_size
        }
    }
}

fn sector_fill_origin(config: &PartitionConfig, node: &ShapeTreeNode) -> Point {
    let angle = true_bearing_to_standard_position_angle((node.x0 + node.x1) / 2.0);
    let inner_bias = if config.fill_outside { 9.0 } else { 1.0 };
    let outer_bias = 10.0 - inner_bias;
    let radius = (inner_bias * node.y0px + outer_bias * node.y1px) / 10.0;
    Point::new(angle.cos() * radius, angle.sin() * radius)
}

fn rectangle_fill_origin(node: &ShapeTreeNode) -> Point {
    Point::new((node.x0 + node.x1) / 2.0, (node.y0px + node.y1px) / 2.0)
}

/// Builds the render-ready view-model of a partition chart. Degenerate input
/// (no facts, a negative or non-finite value, a non-positive total) yields an
/// empty view-model rather than an error.
pub fn shape_view_model<F>(
    measure: &dyn TextMeasure,
    config: &PartitionConfig,
    spec: &PartitionSpec<F>,
    facts: &[F],
) -> ShapeViewModel {
    let frame = ChartFrame::new(config);
    if facts.is_empty() {
        tracing::debug!("no facts to lay out");
        return null_shape_view_model(config, &frame);
    }
    if let Some(bad) = facts
        .iter()
        .map(|fact| (spec.value_accessor)(fact))
        .find(|value| !value.is_finite() || *value < 0.0)
    {
        tracing::debug!(value = bad, "rejecting facts with an invalid value");
        return null_shape_view_model(config, &frame);
    }
    if !(frame.inner_width > 0.0 && frame.inner_height > 0.0) {
        tracing::debug!(
            width = frame.inner_width,
            height = frame.inner_height,
            "chart has no drawable area"
        );
        return null_shape_view_model(config, &frame);
    }

    let tree = Hierarchy::group_by_rollup(
        facts,
        |fact| (spec.value_accessor)(fact),
        &spec.group_by(),
        spec.aggregator,
    );
    let total = tree.total();
    if !(total > 0.0 && total.is_finite()) {
        tracing::debug!(total, "rejecting facts with a non-positive total");
        return null_shape_view_model(config, &frame);
    }

    let is_sunburst = config.partition_layout == PartitionLayout::Sunburst;
    let parts = if is_sunburst {
        let scale = TAU / total;
        sunburst::sunburst(
            &tree,
            &[Hierarchy::ROOT],
            |id| tree.node(id).value * scale,
            (0.0, -1.0),
            config.clockwise_sectors,
            config.special_first_innermost_sector,
        )
    } else {
        let scale = frame.inner_width * frame.inner_height / total;
        let top_groove = |id: NodeId| match tree.node(id).depth {
            0 => treemap_groove(0),
            _ => config.treemap_top_groove,
        };
        treemap::treemap(
            &tree,
            &[Hierarchy::ROOT],
            &|id| tree.node(id).value * scale,
            &top_groove,
            &|id| treemap_groove(tree.node(id).depth),
            TreemapRect::new(0.0, 0.0, frame.inner_width, frame.inner_height),
        )
    };

    let shown: Vec<Part> = parts
        .into_iter()
        .filter(|part| {
            let node = tree.node(part.node);
            node.depth > 0 && spec.layer(node.depth).is_none_or(|layer| layer.shows(&node.key))
        })
        .collect();
    let tree_height = shown.iter().map(|part| tree.node(part.node).depth).max().unwrap_or(0);
    let ring_thickness = if tree_height > 0 {
        (frame.outer_radius - frame.inner_radius) / tree_height as f64
    } else {
        0.0
    };

    let formatter = spec.effective_formatter(config);
    let default_fill_label = LayerFillLabel::default().resolve(config, &formatter);
    let mut fill_labels: Vec<ResolvedFillLabel> = spec
        .layers
        .iter()
        .map(|layer| layer.fill_label.resolve(config, &formatter))
        .collect();
    fill_labels.push(default_fill_label);
    let fill_label_of = |depth: usize| &fill_labels[depth.clamp(1, fill_labels.len()) - 1];

    let quads: Vec<QuadViewModel> = shown
        .iter()
        .map(|part| {
            let shape = shape_tree_node(&tree, part, is_sunburst, frame.inner_radius, ring_thickness);
            let fill_color = normalize_color(&fill_color(spec, &tree, &shape));
            let fill_label = fill_label_of(shape.depth);
            let text_color = if !is_sunburst && shape.y1px - shape.y0px < MIN_TREEMAP_TEXT_HEIGHT {
                "transparent".to_string()
            } else {
                fill_text_color(
                    &fill_label.text_color,
                    fill_label.text_invertible,
                    fill_label.text_contrast,
                    &fill_color,
                    &config.background_color,
                )
            };
            QuadViewModel {
                shape,
                fill_color,
                text_color,
                stroke_width: config.sector_line_width,
                stroke_style: config.sector_line_stroke.clone(),
            }
        })
        .collect();
    tracing::debug!(
        nodes = quads.len(),
        tree_height,
        layout = ?config.partition_layout,
        "laid out partition"
    );

    let label_of = |shape: &ShapeTreeNode| {
        spec.layer(shape.depth)
            .map_or_else(|| shape.data_name.clone(), |layer| layer.node_label.label(&shape.data_name))
    };
    let value_text_of = |shape: &ShapeTreeNode, formatter: &ValueFormatter| {
        let parent_value = shape.parent.map_or(total, |parent| tree.node(parent).value);
        formatter.format(spec.value_getter.get(shape.value, parent_value))
    };

    let fill_inputs: Vec<FillTextInput<'_>> = quads
        .iter()
        .filter(|quad| has_room(config, &quad.shape))
        .map(|quad| FillTextInput {
            node: quad,
            origin: if is_sunburst {
                sector_fill_origin(config, &quad.shape)
            } else {
                rectangle_fill_origin(&quad.shape)
            },
            label: label_of(&quad.shape),
            value_text: value_text_of(&quad.shape, &fill_label_of(quad.shape.depth).value_formatter),
        })
        .collect();
    let settings = FillTextSettings {
        layers: &fill_labels,
        layer_count: spec.layers.len(),
        max_row_count: config.max_row_count,
        background_color: &config.background_color,
        left_align: !is_sunburst,
        middle_align: is_sunburst,
    };
    let row_sets = if is_sunburst {
        fill_text_layout(
            measure,
            &fill_inputs,
            |quad: &QuadViewModel| ring_sector_construction(config, frame.inner_radius, ring_thickness, &quad.shape),
            |node: &ShapeTreeNode| {
                in_sector_rotation(
                    config.horizontal_text_enforcer,
                    config.horizontal_text_angle_threshold,
                    node,
                )
            },
            &settings,
        )
    } else {
        let top_groove = config.treemap_top_groove;
        fill_text_layout(
            measure,
            &fill_inputs,
            |quad: &QuadViewModel| {
                let shape = &quad.shape;
                let y1 = if shape.depth < tree_height {
                    shape.y0px + get_top_padding(top_groove, shape.y1px - shape.y0px)
                } else {
                    shape.y1px
                };
                RectangleConstruction {
                    x0: shape.x0,
                    y0: shape.y0px,
                    x1: shape.x1,
                    y1,
                }
            },
            |_: &ShapeTreeNode| 0.0,
            &settings,
        )
    };

    let filled: HashSet<&str> = row_sets
        .iter()
        .filter(|row_set| !row_set.rows.is_empty())
        .map(|row_set| row_set.id.as_str())
        .collect();

    let outside_links_view_model = if is_sunburst && config.fill_outside {
        let padding = config.link_label.radius_padding;
        fill_inputs
            .iter()
            .filter(|input| filled.contains(input.node.shape.id().as_str()))
            .map(|input| {
                let shape = &input.node.shape;
                let angle = true_bearing_to_standard_position_angle(mean_angle(shape.x0, shape.x1));
                let (cos, sin) = (angle.cos(), angle.sin());
                let radius = shape.y1px;
                OutsideLinksViewModel {
                    points: vec![
                        [cos * radius, sin * radius],
                        [cos * (radius + padding), sin * (radius + padding)],
                    ],
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let link_label_view_models = if is_sunburst && !config.fill_outside {
        let without_room: Vec<LinkLabelInput<'_>> = quads
            .iter()
            .filter(|quad| !filled.contains(quad.shape.id().as_str()))
            .map(|quad| LinkLabelInput {
                node: &quad.shape,
                text: label_of(&quad.shape),
                value_text: value_text_of(&quad.shape, &formatter),
            })
            .collect();
        let link_frame = LinkLabelFrame {
            width: config.width,
            height: config.height,
            disk_center: frame.disk_center,
            anchor_radius: frame.outer_radius + config.link_label.radius_padding,
        };
        link_text_layout(measure, &config.link_label, link_frame, &without_room)
    } else {
        Vec::new()
    };
    tracing::debug!(
        row_sets = filled.len(),
        link_labels = link_label_view_models.len(),
        "placed text"
    );

    ShapeViewModel {
        partition_layout: config.partition_layout,
        width: config.width,
        height: config.height,
        disk_center: frame.disk_center,
        outer_radius: frame.outer_radius,
        quad_view_model: quads,
        row_sets,
        outside_links_view_model,
        link_label_view_models,
        link_label_style: link_label_style(config),
        hierarchy: Some(tree),
    }
}

fn shape_tree_node(
    tree: &Hierarchy,
    part: &Part,
    is_sunburst: bool,
    inner_radius: Radius,
    ring_thickness: Pixels,
) -> ShapeTreeNode {
    let node = tree.node(part.node);
    let ring_px = |ring: f64| inner_radius + ring * ring_thickness;
    let (y0px, y1px, y_mid_px) = if is_sunburst {
        (
            ring_px(part.y0),
            ring_px(part.y1),
            ring_px((part.y0 + part.y1) / 2.0),
        )
    } else {
        (part.y0, part.y1, (part.y0 + part.y1) / 2.0)
    };
    ShapeTreeNode {
        node: part.node,
        parent: node.parent,
        data_name: node.key.clone(),
        depth: node.depth,
        value: node.value,
        sort_index: node.sort_index,
        x0: part.x0,
        x1: part.x1,
        y0: part.y0,
        y1: part.y1,
        y0px,
        y1px,
        y_mid_px,
    }
}

fn fill_color<F>(spec: &PartitionSpec<F>, tree: &Hierarchy, shape: &ShapeTreeNode) -> String {
    let Some(strategy) = spec.layer(shape.depth).and_then(|layer| layer.fill_color.as_ref()) else {
        return DEFAULT_FILL_COLOR.to_string();
    };
    let sibling_count = shape
        .parent
        .map_or(1, |parent| tree.children(parent).len());
    let root_sort_index = tree
        .path(shape.node)
        .first()
        .map_or(shape.sort_index, |id| tree.node(*id).sort_index);
    let context = FillContext {
        key: &shape.data_name,
        depth: shape.depth,
        sort_index: shape.sort_index,
        value: shape.value,
        sibling_count,
        root_sort_index,
    };
    strategy
        .resolve(&context)
        .unwrap_or_else(|| DEFAULT_FILL_COLOR.to_string())
}
