use super::circline::{CirclineArc, INFINITY_RADIUS, RingSectorConstruction, conjunctive_constraint};
use super::geometry::{Circle, Pixels, Point, Radian, TAU, true_bearing_to_standard_position_angle, wrap_to_tau};
use super::optimize::{integer_snap, monotonic_hill_climb};
use super::types::{QuadViewModel, RowBox, RowSet, RowSpace, ShapeTreeNode, TextRow, VerticalAlignment};
use crate::color::fill_text_color;
use crate::config::ResolvedPadding;
use crate::spec::ResolvedFillLabel;
use crate::text_metrics::{TextBox, TextMeasure};

/// Share of the font size the glyphs overhang the row box.
const OVERHANG: f64 = 0.05;

/// Axis-aligned text container in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleConstruction {
    pub x0: Pixels,
    pub y0: Pixels,
    pub x1: Pixels,
    pub y1: Pixels,
}

/// Answers where row `row_index` of `total_row_count` goes inside a shape and
/// how long it may be.
pub trait ShapeRowGeometry {
    #[allow(clippy::too_many_arguments)]
    fn row_space(
        &self,
        origin: Point,
        total_row_count: usize,
        line_pitch: Pixels,
        row_index: usize,
        font_size: Pixels,
        rotation: Radian,
        vertical_alignment: VerticalAlignment,
        padding: ResolvedPadding,
    ) -> RowSpace;
}

impl ShapeRowGeometry for RectangleConstruction {
    fn row_space(
        &self,
        origin: Point,
        total_row_count: usize,
        line_pitch: Pixels,
        row_index: usize,
        font_size: Pixels,
        _rotation: Radian,
        vertical_alignment: VerticalAlignment,
        padding: ResolvedPadding,
    ) -> RowSpace {
        get_rectangle_row_geometry(
            self,
            origin,
            total_row_count,
            line_pitch,
            row_index,
            font_size,
            vertical_alignment,
            padding,
        )
    }
}

impl ShapeRowGeometry for RingSectorConstruction {
    fn row_space(
        &self,
        origin: Point,
        total_row_count: usize,
        line_pitch: Pixels,
        row_index: usize,
        font_size: Pixels,
        rotation: Radian,
        _vertical_alignment: VerticalAlignment,
        _padding: ResolvedPadding,
    ) -> RowSpace {
        get_sector_row_geometry(
            self,
            origin,
            total_row_count,
            line_pitch,
            row_index,
            font_size,
            rotation,
        )
    }
}

/// Geometric progression of integer font sizes from `min` to `max`, stepping
/// by about `ideal_jump`. Duplicates after rounding are dropped.
pub fn font_size_ladder(min: Pixels, max: Pixels, ideal_jump: f64) -> Vec<Pixels> {
    let magnification = max / min;
    let jump_count = (magnification.ln() / ideal_jump.ln()).round();
    if !(jump_count >= 1.0) || !min.is_finite() || min <= 0.0 {
        return vec![min.round()];
    }
    let jump_count = jump_count as usize;
    let real_jump = magnification.powf(1.0 / jump_count as f64);
    let mut sizes: Vec<Pixels> = Vec::with_capacity(jump_count + 1);
    for i in 0..=jump_count {
        let size = (min * real_jump.powi(i as i32)).round();
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}

fn vertical_anchor(
    container: &RectangleConstruction,
    vertical_alignment: VerticalAlignment,
    line_pitch: Pixels,
    total_row_count: usize,
    row_index: usize,
    padding_top: Pixels,
    padding_bottom: Pixels,
    font_size: Pixels,
) -> Pixels {
    let rows = total_row_count as f64;
    let index = row_index as f64;
    match vertical_alignment {
        VerticalAlignment::Top => {
            -(container.y0 + line_pitch * index + padding_top + font_size * OVERHANG)
        }
        VerticalAlignment::Bottom => {
            -(container.y1 - line_pitch * (rows - 1.0 - index) - padding_bottom - font_size * OVERHANG)
        }
        VerticalAlignment::Middle => -((container.y0 + container.y1) / 2.0 + line_pitch * (index - rows) / 2.0),
    }
}

/// Row placement inside a rectangle. The anchor's y is negated screen y, so
/// rows share the y-up convention of sector text.
#[allow(clippy::too_many_arguments)]
pub fn get_rectangle_row_geometry(
    container: &RectangleConstruction,
    origin: Point,
    total_row_count: usize,
    line_pitch: Pixels,
    row_index: usize,
    font_size: Pixels,
    vertical_alignment: VerticalAlignment,
    padding: ResolvedPadding,
) -> RowSpace {
    // taper out the top padding with small fonts
    let top_adjustment = if font_size < 6.0 {
        0.0
    } else {
        (font_size / 16.0).clamp(1.0, 2.0)
    };
    let adjusted_top = padding.top + top_adjustment;
    let room = container.y1 - container.y0 - adjusted_top - padding.bottom;
    if total_row_count == 0 || room / (total_row_count as f64) < line_pitch {
        return RowSpace {
            row_anchor_x: f64::NAN,
            row_anchor_y: f64::NAN,
            maximum_row_length: 0.0,
        };
    }
    RowSpace {
        row_anchor_x: origin.x + padding.left / 2.0 - padding.right / 2.0,
        row_anchor_y: vertical_anchor(
            container,
            vertical_alignment,
            line_pitch,
            total_row_count,
            row_index,
            adjusted_top,
            padding.bottom,
            font_size,
        ),
        maximum_row_length: container.x1 - container.x0 - padding.left - padding.right,
    }
}

/// A huge circle whose near edge runs through the row, perpendicular to the
/// text direction; `offset_sign` shifts it to the row's top or bottom edge.
fn make_row_circline(
    origin: Point,
    radial_offset: Pixels,
    rotation: Radian,
    font_size: Pixels,
    offset_sign: f64,
) -> Circle {
    let offset = offset_sign * font_size / 2.0;
    let top_radius = INFINITY_RADIUS - offset;
    Circle::new(
        origin.x + top_radius * (-rotation + TAU / 4.0).cos(),
        origin.y + top_radius * (-rotation + TAU / 2.0).cos(),
        INFINITY_RADIUS + radial_offset,
    )
}

/// Row placement inside a ring sector: the row's top and bottom edges are
/// each clipped against the sector outline, and the overlap of the two
/// chords is the usable length.
pub fn get_sector_row_geometry(
    construction: &RingSectorConstruction,
    origin: Point,
    total_row_count: usize,
    line_pitch: Pixels,
    row_index: usize,
    font_size: Pixels,
    rotation: Radian,
) -> RowSpace {
    let no_room = RowSpace {
        row_anchor_x: origin.x,
        row_anchor_y: origin.y,
        maximum_row_length: 0.0,
    };
    let offset = (total_row_count as f64 / 2.0) * font_size + font_size / 2.0
        - line_pitch * row_index as f64;

    let top = make_row_circline(origin, offset, rotation, font_size, 1.0);
    let bottom = make_row_circline(origin, offset, rotation, font_size, -1.0);
    let mid = make_row_circline(origin, offset, rotation, 0.0, 0.0);

    let first_valid = |circle: Circle| {
        conjunctive_constraint(construction, CirclineArc::full(circle.x, circle.y, circle.r))
            .first()
            .copied()
    };
    let (Some(valid_top), Some(valid_bottom)) = (first_valid(top), first_valid(bottom)) else {
        return no_room;
    };
    let from = valid_top.from.max(valid_bottom.from);
    let to = valid_top.to.min(valid_bottom.to);
    let mid_angle = (from + to) / 2.0;
    // small-angle approximation of the chord
    let cheap_tangent = (to - from).max(0.0);
    RowSpace {
        row_anchor_x: mid.r * mid_angle.cos() + mid.x,
        row_anchor_y: mid.r * mid_angle.sin() + mid.y,
        maximum_row_length: cheap_tangent * INFINITY_RADIUS,
    }
}

/// Text rotation of a sector's label: radial for narrow sectors, pulled
/// toward horizontal for wide ones, and never upside down.
pub fn in_sector_rotation(
    horizontal_text_enforcer: f64,
    horizontal_text_angle_threshold: Radian,
    node: &ShapeTreeNode,
) -> Radian {
    let mut rotation = true_bearing_to_standard_position_angle((node.x0 + node.x1) / 2.0);
    if (node.x1 - node.x0).abs() > horizontal_text_angle_threshold && horizontal_text_enforcer > 0.0 {
        rotation *= 1.0 - horizontal_text_enforcer;
    }
    if TAU / 4.0 < rotation && rotation < 3.0 * TAU / 4.0 {
        rotation = wrap_to_tau(rotation - TAU / 2.0);
    }
    rotation
}

fn word_spacing(font_size: Pixels) -> Pixels {
    font_size / 4.0
}

/// Everything about one node that row packing needs besides its shape.
struct RowSetRequest<'a, C> {
    id: String,
    boxes: &'a [TextBox],
    container: &'a C,
    origin: Point,
    rotation: Radian,
    vertical_alignment: VerticalAlignment,
    left_align: bool,
    padding: ResolvedPadding,
    max_row_count: usize,
}

/// Packs the words at one font size, trying one row, then two, and so on.
/// Returns the last attempt and whether every word found a place in it.
fn try_font_size<C: ShapeRowGeometry>(
    measure: &dyn TextMeasure,
    request: &RowSetRequest<'_, C>,
    font_size: Pixels,
) -> (RowSet, bool) {
    let mut row_set = RowSet::identity(request.id.clone());
    row_set.font_size = font_size;
    row_set.rotation = request.rotation;
    row_set.vertical_alignment = request.vertical_alignment;
    row_set.left_align = request.left_align;

    let metrics = measure.measure(font_size, request.boxes);
    if metrics.len() != request.boxes.len() {
        tracing::warn!(
            expected = request.boxes.len(),
            got = metrics.len(),
            "text measurement returned a mismatched box count"
        );
        return (row_set, false);
    }
    let measured: Vec<RowBox> = request
        .boxes
        .iter()
        .zip(&metrics)
        .map(|(text_box, m)| RowBox {
            text: text_box.text.clone(),
            font: text_box.font.clone(),
            font_size,
            width: m.width,
            vertical_offset: -(m.em_height_descent + m.em_height_ascent) / 2.0,
            word_beginning: f64::NAN,
        })
        .collect();
    let spacing = word_spacing(font_size);
    let line_pitch = font_size;

    let mut placed = 0;
    for target_row_count in 1..=request.max_row_count {
        placed = 0;
        let mut rows: Vec<TextRow> = Vec::with_capacity(target_row_count);
        for row_index in 0..target_row_count {
            let space = request.container.row_space(
                request.origin,
                target_row_count,
                line_pitch,
                row_index,
                font_size,
                request.rotation,
                request.vertical_alignment,
                request.padding,
            );
            let mut row = TextRow::empty();
            row.row_anchor_x = space.row_anchor_x;
            row.row_anchor_y = space.row_anchor_y;
            row.maximum_length = space.maximum_row_length;

            let mut row_length = 0.0;
            while let Some(word) = measured.get(placed) {
                let word_beginning = row_length;
                let next_length = row_length + word.width + spacing;
                if next_length > row.maximum_length {
                    break;
                }
                row_length = next_length;
                row.row_words.push(RowBox {
                    word_beginning,
                    ..word.clone()
                });
                row.length = row_length;
                placed += 1;
            }
            rows.push(row);
        }
        row_set.rows = rows;
        let every_row_used = row_set
            .rows
            .iter()
            .all(|row| row.row_words.iter().any(|word| !word.text.is_empty()));
        if placed == measured.len() && every_row_used {
            break;
        }
    }
    (row_set, placed == measured.len())
}

/// Largest font size from `font_sizes` at which every word fits, with the
/// fewest rows at that size; an empty row set if none does.
fn get_row_set<C: ShapeRowGeometry>(
    measure: &dyn TextMeasure,
    request: &RowSetRequest<'_, C>,
    font_sizes: &[Pixels],
) -> RowSet {
    let Some(largest_index) = font_sizes.len().checked_sub(1) else {
        return RowSet::identity(request.id.clone());
    };
    let largest = largest_index as f64;
    let response = |i: f64| {
        let (_, completed) = try_font_size(measure, request, font_sizes[i as usize]);
        i + if completed { 0.0 } else { largest + 1.0 }
    };
    let Some(index) = monotonic_hill_climb(response, largest, largest, integer_snap, 0.0) else {
        return RowSet::identity(request.id.clone());
    };
    let (mut row_set, completed) = try_font_size(measure, request, font_sizes[index as usize]);
    if completed {
        row_set.rows.retain(|row| !row.row_words.is_empty());
    } else {
        row_set.rows.clear();
    }
    row_set
}

/// One node queued for fill text.
pub struct FillTextInput<'a> {
    pub node: &'a QuadViewModel,
    pub origin: Point,
    pub label: String,
    pub value_text: String,
}

fn text_boxes(input: &FillTextInput<'_>, fill_label: &ResolvedFillLabel) -> Vec<TextBox> {
    let label_words = input.label.split_whitespace().map(|text| TextBox {
        text: text.to_string(),
        font: fill_label.font.clone(),
    });
    let value_words = input.value_text.split_whitespace().map(|text| TextBox {
        text: text.to_string(),
        font: fill_label.value_font.clone(),
    });
    label_words.chain(value_words).collect()
}

pub struct FillTextSettings<'a> {
    /// Fill label settings per layer; the extra last entry serves nodes
    /// deeper than the layer list.
    pub layers: &'a [ResolvedFillLabel],
    pub layer_count: usize,
    pub max_row_count: usize,
    pub background_color: &'a str,
    pub left_align: bool,
    pub middle_align: bool,
}

/// Fits the label and value of each node inside its shape. Nodes are served
/// largest value first; unless a layer maximizes its font size, a node's
/// size caps the candidates of the smaller nodes on the same layer.
pub fn fill_text_layout<C: ShapeRowGeometry>(
    measure: &dyn TextMeasure,
    inputs: &[FillTextInput<'_>],
    shape: impl Fn(&QuadViewModel) -> C,
    rotation: impl Fn(&ShapeTreeNode) -> Radian,
    settings: &FillTextSettings<'_>,
) -> Vec<RowSet> {
    if settings.layers.is_empty() {
        return Vec::new();
    }
    let mut ladders: Vec<Vec<Pixels>> = settings
        .layers
        .iter()
        .map(|l| font_size_ladder(l.min_font_size, l.max_font_size, l.ideal_font_size_jump))
        .collect();

    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by(|a, b| {
        let (a, b) = (inputs[*a].node.shape.value, inputs[*b].node.shape.value);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut row_sets = Vec::with_capacity(inputs.len());
    for index in order {
        let input = &inputs[index];
        let node = input.node;
        let layer_index = node.shape.depth.clamp(1, ladders.len()) - 1;
        let fill_label = &settings.layers[layer_index];
        let vertical_alignment = if settings.middle_align {
            VerticalAlignment::Middle
        } else if node.shape.depth < settings.layer_count {
            VerticalAlignment::Bottom
        } else {
            VerticalAlignment::Top
        };
        let boxes = text_boxes(input, fill_label);
        let container = shape(node);
        let request = RowSetRequest {
            id: node.shape.id(),
            boxes: &boxes,
            container: &container,
            origin: input.origin,
            rotation: rotation(&node.shape),
            vertical_alignment,
            left_align: settings.left_align,
            padding: fill_label.padding.resolve(),
            max_row_count: settings.max_row_count,
        };
        let mut row_set = get_row_set(measure, &request, &ladders[layer_index]);
        row_set.fill_text_color = fill_text_color(
            &fill_label.text_color,
            fill_label.text_invertible,
            fill_label.text_contrast,
            &node.fill_color,
            settings.background_color,
        );
        // only placed text caps the layer; a failed node leaves the ladder intact,
        // unlike the NaN-filtered ladder that emptied the layer after one failure
        if !row_set.rows.is_empty() && !fill_label.maximize_font_size {
            let achieved = row_set.font_size;
            ladders[layer_index].retain(|size| *size <= achieved);
        }
        tracing::trace!(
            id = %row_set.id,
            font_size = row_set.font_size,
            rows = row_set.rows.len(),
            "fill text"
        );
        row_sets.push(row_set);
    }
    row_sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Padding, PartitionConfig};
    use crate::layout::circline::ring_sector_construction;
    use crate::layout::text::FastTextMeasure;
    use crate::spec::LayerFillLabel;
    use crate::text_metrics::{Font, TextMetrics};

    fn zero_padding() -> ResolvedPadding {
        Padding::Uniform(0.0).resolve()
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> RectangleConstruction {
        RectangleConstruction { x0, y0, x1, y1 }
    }

    /// Every character is exactly one font size wide.
    fn monospace(font_size: f64, boxes: &[TextBox]) -> Vec<TextMetrics> {
        boxes
            .iter()
            .map(|b| TextMetrics {
                width: b.text.chars().count() as f64 * font_size,
                em_height_ascent: font_size * 0.8,
                em_height_descent: font_size * 0.2,
            })
            .collect()
    }

    fn boxes(words: &[&str]) -> Vec<TextBox> {
        words
            .iter()
            .map(|w| TextBox {
                text: w.to_string(),
                font: Font::default(),
            })
            .collect()
    }

    #[test]
    fn rectangle_row_spans_the_unpadded_width() {
        let space = get_rectangle_row_geometry(
            &rect(0.0, 0.0, 200.0, 100.0),
            Point::new(100.0, 50.0),
            1,
            50.0,
            0,
            50.0,
            VerticalAlignment::Middle,
            zero_padding(),
        );
        assert_eq!(space.maximum_row_length, 200.0);
        assert_eq!(space.row_anchor_x, 100.0);
    }

    #[test]
    fn rectangle_rows_that_overflow_have_no_room() {
        let space = get_rectangle_row_geometry(
            &rect(0.0, 0.0, 200.0, 30.0),
            Point::new(100.0, 15.0),
            2,
            20.0,
            1,
            20.0,
            VerticalAlignment::Top,
            zero_padding(),
        );
        assert_eq!(space.maximum_row_length, 0.0);
        assert!(space.row_anchor_x.is_nan());
    }

    #[test]
    fn rectangle_alignment_moves_the_anchor() {
        let container = rect(0.0, 0.0, 100.0, 100.0);
        let anchor = |alignment| {
            get_rectangle_row_geometry(
                &container,
                Point::new(50.0, 50.0),
                1,
                10.0,
                0,
                10.0,
                alignment,
                zero_padding(),
            )
            .row_anchor_y
        };
        // y is negated: top rows have the largest anchor
        assert!(anchor(VerticalAlignment::Top) > anchor(VerticalAlignment::Middle));
        assert!(anchor(VerticalAlignment::Middle) > anchor(VerticalAlignment::Bottom));
    }

    #[test]
    fn ladder_is_geometric_and_deduplicated() {
        let sizes = font_size_ladder(8.0, 64.0, 1.05);
        assert_eq!(sizes.first(), Some(&8.0));
        assert_eq!(sizes.last(), Some(&64.0));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(font_size_ladder(12.0, 12.0, 1.05), vec![12.0]);
    }

    #[test]
    fn rotation_is_never_upside_down() {
        let config = PartitionConfig::default();
        for i in 0..36 {
            let x0 = i as f64 * TAU / 36.0;
            let node = ShapeTreeNode::test_sector(x0, x0 + TAU / 72.0, 0.0);
            let rotation = in_sector_rotation(
                config.horizontal_text_enforcer,
                config.horizontal_text_angle_threshold,
                &node,
            );
            assert!(!(TAU / 4.0 < rotation && rotation < 3.0 * TAU / 4.0), "rotation {rotation}");
        }
    }

    #[test]
    fn wide_sectors_get_horizontal_text() {
        let node = ShapeTreeNode::test_sector(0.0, TAU / 2.0, 0.0);
        assert_eq!(in_sector_rotation(1.0, TAU / 12.0, &node), 0.0);
    }

    fn request<'a>(
        words: &'a [TextBox],
        container: &'a RectangleConstruction,
        max_row_count: usize,
    ) -> RowSetRequest<'a, RectangleConstruction> {
        RowSetRequest {
            id: "1|0|0".to_string(),
            boxes: words,
            container,
            origin: Point::new(
                (container.x0 + container.x1) / 2.0,
                (container.y0 + container.y1) / 2.0,
            ),
            rotation: 0.0,
            vertical_alignment: VerticalAlignment::Middle,
            left_align: false,
            padding: zero_padding(),
            max_row_count,
        }
    }

    #[test]
    fn wraps_onto_more_rows_before_giving_up() {
        let words = boxes(&["aaaa", "bbbb"]);
        let container = rect(0.0, 0.0, 60.0, 100.0);
        // one row needs (4 + 0.25) * 2 * 10 = 85px, two rows 42.5px each
        let (row_set, completed) = try_font_size(&monospace, &request(&words, &container, 3), 10.0);
        assert!(completed);
        assert_eq!(row_set.rows.len(), 2);
        assert_eq!(row_set.word_count(), 2);
        assert_eq!(row_set.rows[1].row_words[0].text, "bbbb");
        assert_eq!(row_set.rows[0].row_words[0].word_beginning, 0.0);
    }

    #[test]
    fn row_limit_makes_the_attempt_fail() {
        let words = boxes(&["aaaa", "bbbb"]);
        let container = rect(0.0, 0.0, 60.0, 100.0);
        let (_, completed) = try_font_size(&monospace, &request(&words, &container, 1), 10.0);
        assert!(!completed);
    }

    #[test]
    fn row_set_takes_the_largest_fitting_size() {
        let words = boxes(&["abc"]);
        let container = rect(0.0, 0.0, 100.0, 100.0);
        let sizes = [8.0, 10.0, 20.0, 30.0, 40.0];
        // "abc" at size s needs 3.25 * s <= 100, so 30 is the largest
        let row_set = get_row_set(&monospace, &request(&words, &container, 2), &sizes);
        assert_eq!(row_set.font_size, 30.0);
        assert_eq!(row_set.rows.len(), 1);
    }

    #[test]
    fn row_set_is_all_or_nothing() {
        let words = boxes(&["unbreakablyverylongword"]);
        let container = rect(0.0, 0.0, 40.0, 40.0);
        let row_set = get_row_set(&monospace, &request(&words, &container, 12), &[8.0, 9.0]);
        assert!(row_set.rows.is_empty());
        assert!(row_set.is_empty());
    }

    #[test]
    fn sector_rows_fit_inside_a_half_disk() {
        let config = PartitionConfig::default();
        let mut node = ShapeTreeNode::test_sector(0.0, TAU / 2.0, 0.0);
        node.y0px = 0.0;
        node.y1px = 100.0;
        let construction = ring_sector_construction(&config, 0.0, 100.0, &node);
        let origin = Point::new(50.0, 0.0);
        let space = get_sector_row_geometry(&construction, origin, 1, 10.0, 0, 10.0, 0.0);
        assert!(space.maximum_row_length > 0.0);
        assert!(space.maximum_row_length < 200.0);
    }

    #[test]
    fn smaller_nodes_never_get_a_larger_font() {
        let config = PartitionConfig::default();
        let fill_label = LayerFillLabel::default().resolve(&config, &Default::default());
        let layers = vec![fill_label.clone(), fill_label];
        let make = |x0: f64, x1: f64, value: f64| {
            let mut shape = ShapeTreeNode::test_sector(x0, x1, 0.0);
            shape.value = value;
            shape.x0 = x0;
            shape.x1 = x1;
            shape.y0px = 0.0;
            shape.y1px = 80.0;
            QuadViewModel {
                shape,
                fill_color: "#ffffff".to_string(),
                text_color: "#000000".to_string(),
                stroke_width: 1.0,
                stroke_style: "white".to_string(),
            }
        };
        // the small node has the larger box; capping keeps it at or below the big one
        let big = make(0.0, 100.0, 10.0);
        let small = make(100.0, 400.0, 1.0);
        let inputs = vec![
            FillTextInput {
                node: &small,
                origin: Point::new(250.0, 40.0),
                label: "Word".to_string(),
                value_text: String::new(),
            },
            FillTextInput {
                node: &big,
                origin: Point::new(50.0, 40.0),
                label: "Word".to_string(),
                value_text: String::new(),
            },
        ];
        let settings = FillTextSettings {
            layers: &layers,
            layer_count: 1,
            max_row_count: 2,
            background_color: "#ffffff",
            left_align: true,
            middle_align: false,
        };
        let row_sets = fill_text_layout(
            &FastTextMeasure,
            &inputs,
            |n: &QuadViewModel| rect(n.shape.x0, n.shape.y0px, n.shape.x1, n.shape.y1px),
            |_| 0.0,
            &settings,
        );
        assert_eq!(row_sets.len(), 2);
        // served largest value first
        assert_eq!(row_sets[0].id, big.shape.id());
        assert!(!row_sets[0].rows.is_empty());
        assert!(!row_sets[1].rows.is_empty());
        assert!(row_sets[1].font_size <= row_sets[0].font_size);
        assert_eq!(row_sets[0].vertical_alignment, VerticalAlignment::Top);
    }
}
