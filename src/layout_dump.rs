use crate::layout::{PartitionLayout, ShapeViewModel};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub layout: PartitionLayout,
    pub width: f64,
    pub height: f64,
    pub disk_center: [f64; 2],
    pub outer_radius: f64,
    pub nodes: Vec<NodeDump>,
    pub link_labels: Vec<LinkLabelDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0px: f64,
    pub y1px: f64,
    pub fill_color: String,
    pub font_size: Option<f64>,
    /// Fill text, one entry per row.
    pub rows: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkLabelDump {
    pub id: String,
    pub text: String,
    pub value_text: String,
    pub translate: [f64; 2],
    pub points: Vec<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_view_model(model: &ShapeViewModel) -> Self {
        let row_sets: HashMap<&str, _> = model
            .row_sets
            .iter()
            .filter(|row_set| !row_set.rows.is_empty())
            .map(|row_set| (row_set.id.as_str(), row_set))
            .collect();

        let nodes = model
            .quad_view_model
            .iter()
            .map(|quad| {
                let shape = &quad.shape;
                let id = shape.id();
                let row_set = row_sets.get(id.as_str());
                NodeDump {
                    name: shape.data_name.clone(),
                    depth: shape.depth,
                    value: shape.value,
                    x0: shape.x0,
                    x1: shape.x1,
                    y0px: shape.y0px,
                    y1px: shape.y1px,
                    fill_color: quad.fill_color.clone(),
                    font_size: row_set.map(|row_set| row_set.font_size),
                    rows: row_set
                        .map(|row_set| {
                            row_set
                                .rows
                                .iter()
                                .map(|row| {
                                    row.row_words
                                        .iter()
                                        .map(|word| word.text.as_str())
                                        .collect::<Vec<_>>()
                                        .join(" ")
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    id,
                }
            })
            .collect();

        let link_labels = model
            .link_label_view_models
            .iter()
            .map(|label| LinkLabelDump {
                id: label.id.clone(),
                text: label.text.clone(),
                value_text: label.value_text.clone(),
                translate: label.translate,
                points: label.link_labels.clone(),
            })
            .collect();

        LayoutDump {
            layout: model.partition_layout,
            width: model.width,
            height: model.height,
            disk_center: [model.disk_center.x, model.disk_center.y],
            outer_radius: model.outer_radius,
            nodes,
            link_labels,
        }
    }
}

pub fn layout_dump_json(model: &ShapeViewModel) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_view_model(model))?)
}

pub fn write_layout_dump(path: &Path, model: &ShapeViewModel) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_view_model(model);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
