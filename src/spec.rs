//! Chart specification: the layers a fact table is grouped into and the
//! strategies used to label, colour and format them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::color::TextContrast;
use crate::config::{Padding, PartitionConfig};
use crate::layout::hierarchy::{Aggregator, GroupBy};
use crate::layout::text::format_number;
use crate::text_metrics::Font;

pub type ValueFormatFn = Arc<dyn Fn(f64) -> String + Send + Sync>;
pub type FillColorFn = Arc<dyn Fn(&FillContext<'_>) -> String + Send + Sync>;
pub type NodeLabelFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type ShowFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormatter {
    /// Two decimals at most, zero fractions dropped.
    #[default]
    Plain,
    Fixed(usize),
    /// Rounded, with a `%` suffix; meant for percent values.
    Percent,
    #[serde(skip)]
    Custom(ValueFormatFn),
}

impl ValueFormatter {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueFormatter::Plain => format_number(value),
            ValueFormatter::Fixed(decimals) => format!("{value:.decimals$}"),
            ValueFormatter::Percent => format!("{}%", value.round()),
            ValueFormatter::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueFormatter::Plain => f.write_str("Plain"),
            ValueFormatter::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            ValueFormatter::Percent => f.write_str("Percent"),
            ValueFormatter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Which number a node's label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueGetter {
    #[default]
    Value,
    /// Share of the parent's value, 0 to 100.
    Percent,
}

impl ValueGetter {
    pub fn get(self, value: f64, parent_value: f64) -> f64 {
        match self {
            ValueGetter::Value => value,
            ValueGetter::Percent if parent_value > 0.0 => 100.0 * value / parent_value,
            ValueGetter::Percent => 0.0,
        }
    }
}

/// What the fill colour of a shape is derived from.
pub struct FillContext<'a> {
    pub key: &'a str,
    pub depth: usize,
    pub sort_index: usize,
    pub value: f64,
    pub sibling_count: usize,
    /// Sort index of the shape's first-layer ancestor (itself on layer 1).
    pub root_sort_index: usize,
}

#[derive(Clone)]
pub enum FillColor {
    Constant(String),
    /// Indexed by depth, starting at the first layer.
    DepthPalette(Vec<String>),
    /// Indexed by the first-layer ancestor's sort index, so subtrees share a hue.
    SortIndexPalette(Vec<String>),
    Custom(FillColorFn),
}

impl FillColor {
    pub fn resolve(&self, context: &FillContext<'_>) -> Option<String> {
        let pick = |palette: &[String], index: usize| {
            (!palette.is_empty()).then(|| palette[index % palette.len()].clone())
        };
        match self {
            FillColor::Constant(color) => Some(color.clone()),
            FillColor::DepthPalette(palette) => pick(palette, context.depth.saturating_sub(1)),
            FillColor::SortIndexPalette(palette) => pick(palette, context.root_sort_index),
            FillColor::Custom(f) => Some(f(context)),
        }
    }
}

impl fmt::Debug for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillColor::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            FillColor::DepthPalette(p) => f.debug_tuple("DepthPalette").field(p).finish(),
            FillColor::SortIndexPalette(p) => f.debug_tuple("SortIndexPalette").field(p).finish(),
            FillColor::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum NodeLabel {
    #[default]
    Key,
    Custom(NodeLabelFn),
}

impl NodeLabel {
    pub fn label(&self, key: &str) -> String {
        match self {
            NodeLabel::Key => key.to_string(),
            NodeLabel::Custom(f) => f(key),
        }
    }
}

impl fmt::Debug for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeLabel::Key => f.write_str("Key"),
            NodeLabel::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-layer overrides of the chart-wide fill label settings.
#[derive(Debug, Clone, Default)]
pub struct LayerFillLabel {
    pub text_color: Option<String>,
    pub text_invertible: Option<bool>,
    pub text_contrast: Option<TextContrast>,
    pub font: Option<Font>,
    pub value_font: Option<Font>,
    pub padding: Option<Padding>,
    pub value_formatter: Option<ValueFormatter>,
    pub min_font_size: Option<f64>,
    pub max_font_size: Option<f64>,
    pub ideal_font_size_jump: Option<f64>,
    pub maximize_font_size: Option<bool>,
}

/// Fill label settings of one layer after overlaying its overrides.
#[derive(Debug, Clone)]
pub struct ResolvedFillLabel {
    pub text_color: String,
    pub text_invertible: bool,
    pub text_contrast: TextContrast,
    pub font: Font,
    pub value_font: Font,
    pub padding: Padding,
    pub value_formatter: ValueFormatter,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub ideal_font_size_jump: f64,
    pub maximize_font_size: bool,
}

impl LayerFillLabel {
    pub fn resolve(&self, config: &PartitionConfig, formatter: &ValueFormatter) -> ResolvedFillLabel {
        let base = &config.fill_label;
        ResolvedFillLabel {
            text_color: self.text_color.clone().unwrap_or_else(|| base.text_color.clone()),
            text_invertible: self.text_invertible.unwrap_or(base.text_invertible),
            text_contrast: self.text_contrast.unwrap_or(base.text_contrast),
            font: self.font.clone().unwrap_or_else(|| base.font.clone()),
            value_font: self
                .value_font
                .clone()
                .unwrap_or_else(|| base.value_font.clone()),
            padding: self.padding.unwrap_or(base.padding),
            value_formatter: self
                .value_formatter
                .clone()
                .unwrap_or_else(|| formatter.clone()),
            min_font_size: self.min_font_size.unwrap_or(config.min_font_size),
            max_font_size: self.max_font_size.unwrap_or(config.max_font_size),
            ideal_font_size_jump: self
                .ideal_font_size_jump
                .unwrap_or(config.ideal_font_size_jump),
            maximize_font_size: self.maximize_font_size.unwrap_or(config.maximize_font_size),
        }
    }
}

pub struct Layer<F> {
    pub group_by: GroupBy<F>,
    pub node_label: NodeLabel,
    pub fill_color: Option<FillColor>,
    pub fill_label: LayerFillLabel,
    pub show: Option<ShowFn>,
}

impl<F> Clone for Layer<F> {
    fn clone(&self) -> Self {
        Self {
            group_by: Arc::clone(&self.group_by),
            node_label: self.node_label.clone(),
            fill_color: self.fill_color.clone(),
            fill_label: self.fill_label.clone(),
            show: self.show.clone(),
        }
    }
}

impl<F> Layer<F> {
    pub fn new(group_by: impl Fn(&F) -> String + Send + Sync + 'static) -> Self {
        Self {
            group_by: Arc::new(group_by),
            node_label: NodeLabel::Key,
            fill_color: None,
            fill_label: LayerFillLabel::default(),
            show: None,
        }
    }

    pub fn with_node_label(mut self, label: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.node_label = NodeLabel::Custom(Arc::new(label));
        self
    }

    pub fn with_fill_color(mut self, fill_color: FillColor) -> Self {
        self.fill_color = Some(fill_color);
        self
    }

    pub fn with_fill_label(mut self, fill_label: LayerFillLabel) -> Self {
        self.fill_label = fill_label;
        self
    }

    pub fn with_show(mut self, show: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.show = Some(Arc::new(show));
        self
    }

    pub fn shows(&self, key: &str) -> bool {
        self.show.as_ref().is_none_or(|show| show(key))
    }
}

pub struct PartitionSpec<F> {
    pub layers: Vec<Layer<F>>,
    pub value_accessor: Arc<dyn Fn(&F) -> f64 + Send + Sync>,
    pub value_getter: ValueGetter,
    /// Overrides `fill_label.value_formatter` of the configuration.
    pub value_formatter: Option<ValueFormatter>,
    pub percent_formatter: ValueFormatter,
    pub aggregator: Aggregator,
}

impl<F> PartitionSpec<F> {
    pub fn new(value_accessor: impl Fn(&F) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            layers: Vec::new(),
            value_accessor: Arc::new(value_accessor),
            value_getter: ValueGetter::Value,
            value_formatter: None,
            percent_formatter: ValueFormatter::Percent,
            aggregator: Aggregator::Sum,
        }
    }

    pub fn with_layer(mut self, layer: Layer<F>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_value_getter(mut self, value_getter: ValueGetter) -> Self {
        self.value_getter = value_getter;
        self
    }

    pub fn with_value_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.value_formatter = Some(formatter);
        self
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn group_by(&self) -> Vec<GroupBy<F>> {
        self.layers.iter().map(|layer| Arc::clone(&layer.group_by)).collect()
    }

    /// Formatter for the numbers shown next to labels.
    pub fn effective_formatter(&self, config: &PartitionConfig) -> ValueFormatter {
        match self.value_getter {
            ValueGetter::Percent => self.percent_formatter.clone(),
            ValueGetter::Value => self
                .value_formatter
                .clone()
                .unwrap_or_else(|| config.fill_label.value_formatter.clone()),
        }
    }

    /// Layer of a node at `depth`; the root has none.
    pub fn layer(&self, depth: usize) -> Option<&Layer<F>> {
        depth.checked_sub(1).and_then(|index| self.layers.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatters() {
        assert_eq!(ValueFormatter::Plain.format(1234.5), "1234.50");
        assert_eq!(ValueFormatter::Plain.format(7.0), "7");
        assert_eq!(ValueFormatter::Fixed(1).format(2.26), "2.3");
        assert_eq!(ValueFormatter::Percent.format(33.4), "33%");
        let custom = ValueFormatter::Custom(Arc::new(|v| format!("${v}")));
        assert_eq!(custom.format(3.0), "$3");
    }

    #[test]
    fn percent_getter_divides_by_parent() {
        assert_eq!(ValueGetter::Percent.get(1.0, 4.0), 25.0);
        assert_eq!(ValueGetter::Percent.get(1.0, 0.0), 0.0);
        assert_eq!(ValueGetter::Value.get(1.0, 4.0), 1.0);
    }

    #[test]
    fn fill_color_strategies() {
        let context = FillContext {
            key: "a",
            depth: 2,
            sort_index: 1,
            value: 3.0,
            sibling_count: 2,
            root_sort_index: 3,
        };
        let palette: Vec<String> = ["#000", "#111", "#222"].iter().map(|s| s.to_string()).collect();
        assert_eq!(FillColor::DepthPalette(palette.clone()).resolve(&context).as_deref(), Some("#111"));
        assert_eq!(FillColor::SortIndexPalette(palette).resolve(&context).as_deref(), Some("#000"));
        assert_eq!(FillColor::DepthPalette(Vec::new()).resolve(&context), None);
        let custom = FillColor::Custom(Arc::new(|c: &FillContext<'_>| format!("{}{}", c.key, c.depth)));
        assert_eq!(custom.resolve(&context).as_deref(), Some("a2"));
    }

    #[test]
    fn layer_overrides_fall_back_to_config() {
        let config = PartitionConfig::default();
        let overrides = LayerFillLabel {
            max_font_size: Some(20.0),
            maximize_font_size: Some(true),
            ..LayerFillLabel::default()
        };
        let resolved = overrides.resolve(&config, &ValueFormatter::Percent);
        assert_eq!(resolved.max_font_size, 20.0);
        assert_eq!(resolved.min_font_size, config.min_font_size);
        assert!(resolved.maximize_font_size);
        assert_eq!(resolved.value_formatter.format(50.0), "50%");
    }

    #[test]
    fn percent_getter_selects_percent_formatter() {
        let spec: PartitionSpec<f64> = PartitionSpec::new(|v: &f64| *v)
            .with_value_formatter(ValueFormatter::Fixed(3))
            .with_value_getter(ValueGetter::Percent);
        let config = PartitionConfig::default();
        assert_eq!(spec.effective_formatter(&config).format(12.6), "13%");
        let layer = Layer::new(|v: &f64| v.to_string()).with_show(|key| key != "hidden");
        assert!(layer.shows("x"));
        assert!(!layer.shows("hidden"));
    }
}
