use partition_chart::{PartitionLayout, RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    value_field: Option<String>,
    #[serde(default)]
    layers: Vec<String>,
    layout: Option<PartitionLayout>,
    width: Option<f64>,
    height: Option<f64>,
    fast_text: Option<bool>,
}

fn build_render_options(options: PartitionRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::elastic_default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family.clone();
        let partition = &mut render_options.partition;
        partition.fill_label.font.family = font_family.clone();
        partition.fill_label.value_font.family = font_family.clone();
        partition.link_label.font.family = font_family.clone();
        partition.link_label.value_font.family = font_family;
    }
    if let Some(value_field) = options.value_field {
        render_options.value_field = value_field;
    }
    render_options.layer_fields = options.layers;
    if let Some(layout) = options.layout {
        render_options.partition.partition_layout = layout;
    }
    if let Some(width) = options.width {
        render_options.partition.width = width;
    }
    if let Some(height) = options.height {
        render_options.partition.height = height;
    }
    // no system fonts to measure with in the browser
    render_options.fast_text = options.fast_text.unwrap_or(true);

    render_options
}

#[wasm_bindgen]
pub fn render_partition_svg(facts_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<PartitionRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        PartitionRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(facts_json, &render_options).map_err(|error| JsValue::from_str(&format!("{error:#}")))
}
