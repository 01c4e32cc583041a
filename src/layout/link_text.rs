use super::geometry::{Pixels, Point, Radius, TAU, mean_angle, true_bearing_to_standard_position_angle};
use super::optimize::{integer_snap, monotonic_hill_climb};
use super::text::{ELLIPSIS, cut_to_length, grapheme_count};
use super::types::{LinkLabelVM, ShapeTreeNode, TextAlign};
use crate::config::LinkLabelConfig;
use crate::text_metrics::{TextBox, TextMeasure, TextMetrics};

/// An outer node whose text did not fit inside its shape.
pub struct LinkLabelInput<'a> {
    pub node: &'a ShapeTreeNode,
    pub text: String,
    pub value_text: String,
}

/// Chart frame the labels have to stay within, relative to the disk center.
#[derive(Debug, Clone, Copy)]
pub struct LinkLabelFrame {
    pub width: Pixels,
    pub height: Pixels,
    pub disk_center: Point,
    /// Where the leader lines leave the disk.
    pub anchor_radius: Radius,
}

/// Space between a link label's text and its value: one en.
pub fn label_value_gap(font_size: Pixels) -> Pixels {
    font_size / 2.0
}

/// Angular distance of a sector's middle from the east-west axis.
fn distance_from_horizontal(node: &ShapeTreeNode) -> f64 {
    let bearing = mean_angle(node.x0, node.x1);
    (bearing - TAU / 4.0).abs().min((bearing - 3.0 * TAU / 4.0).abs())
}

fn measure_one(measure: &dyn TextMeasure, font_size: Pixels, text_box: TextBox) -> TextMetrics {
    measure
        .measure(font_size, std::slice::from_ref(&text_box))
        .into_iter()
        .next()
        .unwrap_or(TextMetrics {
            width: 0.0,
            em_height_ascent: 0.0,
            em_height_descent: 0.0,
        })
}

/// Longest prefix of `text` (in grapheme clusters) whose rendering fits
/// `allotted_width`; a lone character plus ellipsis counts as no text.
fn fit_text(
    measure: &dyn TextMeasure,
    config: &LinkLabelConfig,
    text: &str,
    allotted_width: Pixels,
) -> String {
    let desired_length = grapheme_count(text).min(config.max_text_length);
    if desired_length == 0 || !(allotted_width > 0.0) {
        return String::new();
    }
    let width_of = |length: f64| {
        measure_one(
            measure,
            config.font_size,
            TextBox {
                text: cut_to_length(text, length as usize),
                font: config.font.clone(),
            },
        )
        .width
    };
    let visible_length = monotonic_hill_climb(width_of, desired_length as f64, allotted_width, integer_snap, 1.0)
        .map_or(0, |length| length as usize);
    if visible_length < 2 && desired_length >= 2 {
        return String::new();
    }
    cut_to_length(text, visible_length)
}

/// Lays out leader-lined labels for nodes of the outermost layer that got no
/// in-shape text. Labels stack outward from the horizontal axis in four
/// quadrant pools, so labels of one pool never overlap.
pub fn link_text_layout(
    measure: &dyn TextMeasure,
    config: &LinkLabelConfig,
    frame: LinkLabelFrame,
    inputs: &[LinkLabelInput<'_>],
) -> Vec<LinkLabelVM> {
    let Some(max_depth) = inputs.iter().map(|input| input.node.depth).max() else {
        return Vec::new();
    };
    let mut candidates: Vec<&LinkLabelInput<'_>> =
        inputs.iter().filter(|input| input.node.depth == max_depth).collect();
    candidates.sort_by(|a, b| {
        let extent = |input: &LinkLabelInput<'_>| (input.node.x1 - input.node.x0).abs();
        extent(b).total_cmp(&extent(a))
    });
    candidates.truncate(config.max_count);
    candidates.sort_by(|a, b| distance_from_horizontal(a.node).total_cmp(&distance_from_horizontal(b.node)));

    let y_relative_increment = config.stem_angle.sin() * config.minimum_stem_length;
    let row_pitch = config.font_size + config.spacing;
    let mut current_y = [-frame.height; 4];

    let mut labels = Vec::with_capacity(candidates.len());
    for input in candidates {
        let node = input.node;
        let angle = true_bearing_to_standard_position_angle(mean_angle(node.x0, node.x1));
        let (cos, sin) = (angle.cos(), angle.sin());
        let from = [cos * node.y1px, sin * node.y1px];
        let (x, y) = (cos * frame.anchor_radius, sin * frame.anchor_radius);

        let north = if y >= 0.0 { 1.0 } else { -1.0 };
        let right_side = x >= 0.0;
        let west = if right_side { 1.0 } else { -1.0 };
        let pool = usize::from(right_side) + if north > 0.0 { 0 } else { 2 };
        let y_offset = (current_y[pool] + row_pitch)
            .max(north * y + y_relative_increment)
            .max(row_pitch / 2.0);
        current_y[pool] = y_offset;
        let cy = north * y_offset;

        let rise = (cy - y).abs();
        let run = (rise / config.stem_angle.tan()).max(config.minimum_stem_length * config.stem_angle.cos());
        let stem_to_x = x + west * run;
        let stem_end_x = stem_to_x + west * config.horizontal_stem_length;
        let translate = [stem_end_x + west * config.gap, cy];

        let screen_y = frame.disk_center.y - cy;
        if screen_y - config.font_size / 2.0 < 0.0 || screen_y + config.font_size / 2.0 > frame.height {
            tracing::debug!(id = %node.id(), "link label falls outside the chart");
            continue;
        }

        let available = if right_side {
            frame.width - frame.disk_center.x - translate[0]
        } else {
            translate[0] + frame.disk_center.x
        };
        let value_metrics = measure_one(
            measure,
            config.font_size,
            TextBox {
                text: input.value_text.clone(),
                font: config.value_font.clone(),
            },
        );
        let value_width = if input.value_text.is_empty() {
            0.0
        } else {
            value_metrics.width
        };
        let text_gap = if value_width > 0.0 { label_value_gap(config.font_size) } else { 0.0 };
        let text = fit_text(measure, config, &input.text, available - value_width - text_gap);
        if text.is_empty() || text == ELLIPSIS {
            tracing::debug!(id = %node.id(), "link label text does not fit");
            continue;
        }
        let label_metrics = measure_one(
            measure,
            config.font_size,
            TextBox {
                text: text.clone(),
                font: config.font.clone(),
            },
        );

        labels.push(LinkLabelVM {
            id: node.id(),
            link_labels: vec![from, [x, y], [stem_to_x, cy], [stem_end_x, cy]],
            translate,
            text_align: if right_side { TextAlign::Left } else { TextAlign::Right },
            text,
            value_text: input.value_text.clone(),
            width: label_metrics.width,
            value_width,
            vertical_offset: -(label_metrics.em_height_descent + label_metrics.em_height_ascent) / 2.0,
        });
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text::FastTextMeasure;

    fn outer_node(x0: f64, x1: f64, depth: usize) -> ShapeTreeNode {
        let mut node = ShapeTreeNode::test_sector(x0, x1, 0.0);
        node.depth = depth;
        node.y0px = 40.0;
        node.y1px = 60.0;
        node
    }

    fn frame() -> LinkLabelFrame {
        LinkLabelFrame {
            width: 600.0,
            height: 300.0,
            disk_center: Point::new(300.0, 150.0),
            anchor_radius: 70.0,
        }
    }

    fn inputs<'a>(nodes: &'a [ShapeTreeNode], text: &str) -> Vec<LinkLabelInput<'a>> {
        nodes
            .iter()
            .map(|node| LinkLabelInput {
                node,
                text: text.to_string(),
                value_text: "12".to_string(),
            })
            .collect()
    }

    #[test]
    fn labels_in_one_pool_never_overlap() {
        let config = LinkLabelConfig::default();
        let step = TAU / 4.0 / 6.0;
        // six slim sectors in the north-east quadrant
        let nodes: Vec<ShapeTreeNode> = (0..6)
            .map(|i| outer_node(i as f64 * step, i as f64 * step + step * 0.9, 2))
            .collect();
        let labels = link_text_layout(&FastTextMeasure, &config, frame(), &inputs(&nodes, "Label"));
        assert_eq!(labels.len(), 6);
        let mut ys: Vec<f64> = labels.iter().map(|label| label.translate[1]).collect();
        ys.sort_by(f64::total_cmp);
        for pair in ys.windows(2) {
            assert!(pair[1] - pair[0] >= config.font_size + config.spacing - 1e-9);
        }
        assert!(labels.iter().all(|label| label.text_align == TextAlign::Left));
        assert!(labels.iter().all(|label| label.link_labels.len() == 4));
    }

    #[test]
    fn only_the_deepest_layer_gets_labels() {
        let config = LinkLabelConfig::default();
        let nodes = vec![outer_node(0.1, 0.2, 1), outer_node(1.0, 1.1, 2)];
        let labels = link_text_layout(&FastTextMeasure, &config, frame(), &inputs(&nodes, "Label"));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].id, nodes[1].id());
    }

    #[test]
    fn long_text_is_cut_with_an_ellipsis() {
        let config = LinkLabelConfig::default();
        let nodes = vec![outer_node(TAU / 4.0 - 0.05, TAU / 4.0 + 0.05, 1)];
        let long = "An extraordinarily long category name that cannot possibly fit beside the chart";
        let labels = link_text_layout(&FastTextMeasure, &config, frame(), &inputs(&nodes, long));
        assert_eq!(labels.len(), 1);
        assert!(labels[0].text.ends_with(ELLIPSIS));
        assert!(grapheme_count(&labels[0].text) > 2);
        let right_edge = labels[0].translate[0] + labels[0].width + labels[0].value_width;
        assert!(right_edge <= frame().width - frame().disk_center.x);
    }

    #[test]
    fn labels_without_room_are_dropped() {
        let config = LinkLabelConfig::default();
        let narrow = LinkLabelFrame {
            width: 160.0,
            disk_center: Point::new(80.0, 150.0),
            ..frame()
        };
        let nodes = vec![outer_node(TAU / 4.0 - 0.05, TAU / 4.0 + 0.05, 1)];
        let labels = link_text_layout(&FastTextMeasure, &config, narrow, &inputs(&nodes, "Label"));
        assert!(labels.is_empty());
    }

    #[test]
    fn max_count_keeps_the_widest() {
        let config = LinkLabelConfig {
            max_count: 1,
            ..LinkLabelConfig::default()
        };
        let nodes = vec![outer_node(0.5, 0.6, 1), outer_node(1.0, 1.4, 1)];
        let labels = link_text_layout(&FastTextMeasure, &config, frame(), &inputs(&nodes, "Label"));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].id, nodes[1].id());
    }
}
