pub mod animation;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod spec;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, PartitionConfig};
pub use layout::{FastTextMeasure, PartitionLayout, ShapeViewModel, shape_view_model};
pub use spec::{FillColor, Layer, PartitionSpec, ValueFormatter, ValueGetter};
pub use text_metrics::{FontTextMeasure, TextMeasure};
pub use theme::Theme;

use anyhow::Result;

/// Everything needed to turn a facts document into a chart.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub partition: PartitionConfig,
    pub value_field: String,
    /// One layer per field, outermost last.
    pub layer_fields: Vec<String>,
    /// Estimate text widths instead of reading font files.
    pub fast_text: bool,
}

impl RenderOptions {
    pub fn from_config(config: Config) -> Self {
        Self {
            theme: config.theme,
            partition: config.partition,
            value_field: "value".to_string(),
            layer_fields: Vec::new(),
            fast_text: false,
        }
    }

    pub fn elastic_default() -> Self {
        Self::from_config(Config::themed(Theme::elastic_default()))
    }

    pub fn modern() -> Self {
        Self::from_config(Config::themed(Theme::modern()))
    }

    pub fn with_fields(mut self, value_field: impl Into<String>, layer_fields: &[&str]) -> Self {
        self.value_field = value_field.into();
        self.layer_fields = layer_fields.iter().map(|field| field.to_string()).collect();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::elastic_default()
    }
}

/// Parses `facts_source` and lays it out as described by `options`.
pub fn layout_facts(facts_source: &str, options: &RenderOptions) -> Result<ShapeViewModel> {
    if options.layer_fields.is_empty() {
        anyhow::bail!("at least one layer field is required");
    }
    let facts = data::parse_facts(facts_source)?;
    data::validate_facts(&facts, &options.value_field, &options.layer_fields)?;
    let spec = data::spec_from_fields(&options.value_field, &options.layer_fields, &options.theme.palette);
    let model = if options.fast_text {
        shape_view_model(&FastTextMeasure, &options.partition, &spec, &facts)
    } else {
        shape_view_model(&FontTextMeasure, &options.partition, &spec, &facts)
    };
    if model.is_empty() {
        tracing::warn!(facts = facts.len(), "nothing to draw");
    }
    Ok(model)
}

pub fn render_with_options(facts_source: &str, options: &RenderOptions) -> Result<String> {
    let model = layout_facts(facts_source, options)?;
    Ok(render::render_svg(&model, &options.theme))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTS: &str = r#"[
        {"region": "Europe", "country": "France", "sales": 30},
        {"region": "Europe", "country": "Germany", "sales": 20},
        {"region": "Asia", "country": "Japan", "sales": 25}
    ]"#;

    #[test]
    fn renders_a_sunburst() {
        let mut options = RenderOptions::modern().with_fields("sales", &["region", "country"]);
        options.fast_text = true;
        options.partition.width = 600.0;
        options.partition.height = 400.0;
        let svg = render_with_options(FACTS, &options).expect("renders");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Europe"));
        assert!(svg.matches("<path").count() >= 5);
    }

    #[test]
    fn layer_fields_are_required() {
        let options = RenderOptions::default().with_fields("sales", &[]);
        assert!(render_with_options(FACTS, &options).is_err());
    }

    #[test]
    fn bad_facts_surface_as_errors() {
        let options = RenderOptions::default().with_fields("sales", &["city"]);
        let error = render_with_options(FACTS, &options).expect_err("city is missing");
        assert!(error.to_string().contains("city"));
    }
}
