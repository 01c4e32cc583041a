use serde::{Deserialize, Serialize};

use super::geometry::{Pixels, Point, Radian, Radius, TAU};
use super::hierarchy::{Hierarchy, NodeId};
use crate::text_metrics::Font;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionLayout {
    #[default]
    Sunburst,
    Treemap,
}

/// Raw placement of one hierarchy node, as produced by the space
/// partitioning algorithms. Sunburst parts carry angles in `x` and ring
/// indices in `y`; treemap parts carry pixels in both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Part {
    pub node: NodeId,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeTreeNode {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub data_name: String,
    pub depth: usize,
    pub value: f64,
    pub sort_index: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub y0px: Pixels,
    pub y1px: Pixels,
    pub y_mid_px: Pixels,
}

impl ShapeTreeNode {
    /// Key correlating a node's text and link geometry within one layout pass.
    pub fn id(&self) -> String {
        format!("{}|{}|{}", self.depth, self.x0, self.y0)
    }

    #[cfg(test)]
    pub(crate) fn test_sector(x0: f64, x1: f64, y0: f64) -> Self {
        Self {
            node: 1,
            parent: Some(0),
            data_name: "test".to_string(),
            depth: 1,
            value: 1.0,
            sort_index: 0,
            x0,
            x1,
            y0,
            y1: y0 + 1.0,
            y0px: 0.0,
            y1px: 0.0,
            y_mid_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadViewModel {
    #[serde(flatten)]
    pub shape: ShapeTreeNode,
    pub fill_color: String,
    pub text_color: String,
    pub stroke_width: Pixels,
    pub stroke_style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Middle => "middle",
            VerticalAlignment::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowBox {
    pub text: String,
    pub font: Font,
    pub font_size: Pixels,
    pub width: Pixels,
    pub vertical_offset: Pixels,
    pub word_beginning: Pixels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRow {
    pub row_words: Vec<RowBox>,
    pub row_anchor_x: Pixels,
    pub row_anchor_y: Pixels,
    pub maximum_length: Pixels,
    pub length: Pixels,
}

impl TextRow {
    pub(crate) fn empty() -> Self {
        Self {
            row_words: Vec::new(),
            row_anchor_x: f64::NAN,
            row_anchor_y: f64::NAN,
            maximum_length: 0.0,
            length: 0.0,
        }
    }
}

/// Word-wrapped in-shape text of one node. Either every word of the node's
/// label and value is placed, or `rows` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSet {
    pub id: String,
    pub rows: Vec<TextRow>,
    pub font_size: Pixels,
    pub fill_text_color: String,
    pub rotation: Radian,
    pub vertical_alignment: VerticalAlignment,
    pub left_align: bool,
}

impl RowSet {
    pub(crate) fn identity(id: String) -> Self {
        Self {
            id,
            rows: Vec::new(),
            font_size: 0.0,
            fill_text_color: String::new(),
            rotation: 0.0,
            vertical_alignment: VerticalAlignment::Middle,
            left_align: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.row_words.is_empty())
    }

    pub fn word_count(&self) -> usize {
        self.rows.iter().map(|row| row.row_words.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSpace {
    pub row_anchor_x: Pixels,
    pub row_anchor_y: Pixels,
    pub maximum_row_length: Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLabelVM {
    pub id: String,
    pub link_labels: Vec<[Pixels; 2]>,
    pub translate: [Pixels; 2],
    pub text_align: TextAlign,
    pub text: String,
    pub value_text: String,
    pub width: Pixels,
    pub value_width: Pixels,
    pub vertical_offset: Pixels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLabelStyle {
    pub font_size: Pixels,
    pub line_width: Pixels,
    pub label_font: Font,
    pub value_font: Font,
    pub text_color: String,
    pub stroke_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutsideLinksViewModel {
    pub points: Vec<[Pixels; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerValue {
    pub group_by_rollup: String,
    pub value: f64,
    pub depth: usize,
    pub sort_index: usize,
}

/// Render-ready description of a partition chart. Coordinates of sectors,
/// rows and link labels are relative to `disk_center` with +y pointing up;
/// treemap rectangles use screen orientation (+y down) from the same origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeViewModel {
    pub partition_layout: PartitionLayout,
    pub width: Pixels,
    pub height: Pixels,
    pub disk_center: Point,
    pub outer_radius: Radius,
    pub quad_view_model: Vec<QuadViewModel>,
    pub row_sets: Vec<RowSet>,
    pub outside_links_view_model: Vec<OutsideLinksViewModel>,
    pub link_label_view_models: Vec<LinkLabelVM>,
    pub link_label_style: LinkLabelStyle,
    #[serde(skip)]
    pub hierarchy: Option<Hierarchy>,
}

impl ShapeViewModel {
    pub fn is_empty(&self) -> bool {
        self.quad_view_model.is_empty()
    }

    /// Shapes under a pointer given as an offset from `disk_center` in screen
    /// orientation (+y down).
    pub fn pick_quads(&self, x: Pixels, y: Pixels) -> Vec<&QuadViewModel> {
        match self.partition_layout {
            PartitionLayout::Sunburst => {
                let bearing = (y.atan2(x) + TAU / 4.0 + TAU) % TAU;
                let radius = x.hypot(y);
                self.quad_view_model
                    .iter()
                    .filter(|quad| {
                        let s = &quad.shape;
                        s.x0 <= bearing && bearing <= s.x1 && s.y0px <= radius && radius <= s.y1px
                    })
                    .collect()
            }
            PartitionLayout::Treemap => self
                .quad_view_model
                .iter()
                .filter(|quad| {
                    let s = &quad.shape;
                    s.x0 <= x && x < s.x1 && s.y0px < y && y <= s.y1px
                })
                .collect(),
        }
    }

    pub fn pick_deepest(&self, x: Pixels, y: Pixels) -> Option<&QuadViewModel> {
        self.pick_quads(x, y)
            .into_iter()
            .max_by_key(|quad| quad.shape.depth)
    }

    /// Layer values from the first layer down to the given node.
    pub fn layer_values(&self, quad: &QuadViewModel) -> Vec<LayerValue> {
        let Some(hierarchy) = &self.hierarchy else {
            return Vec::new();
        };
        hierarchy
            .path(quad.shape.node)
            .into_iter()
            .map(|id| {
                let node = hierarchy.node(id);
                LayerValue {
                    group_by_rollup: node.key.clone(),
                    value: node.value,
                    depth: node.depth,
                    sort_index: node.sort_index,
                }
            })
            .collect()
    }
}
