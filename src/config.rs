use crate::color::TextContrast;
use crate::layout::geometry::TAU;
use crate::layout::types::PartitionLayout;
use crate::spec::ValueFormatter;
use crate::text_metrics::{Font, FontStyle};
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_PADDING: f64 = 2.0;

/// Margins as ratios of the chart width (left/right) and height (top/bottom).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaddingSides {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

/// Inner padding of treemap text; unspecified sides default to 2px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f64),
    Sides(PaddingSides),
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(DEFAULT_PADDING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn resolve(self) -> ResolvedPadding {
        match self {
            Padding::Uniform(p) => ResolvedPadding {
                top: p,
                right: p,
                bottom: p,
                left: p,
            },
            Padding::Sides(sides) => ResolvedPadding {
                top: sides.top.unwrap_or(DEFAULT_PADDING),
                right: sides.right.unwrap_or(DEFAULT_PADDING),
                bottom: sides.bottom.unwrap_or(DEFAULT_PADDING),
                left: sides.left.unwrap_or(DEFAULT_PADDING),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillLabelConfig {
    pub text_color: String,
    pub text_invertible: bool,
    pub text_contrast: TextContrast,
    pub font: Font,
    pub value_font: Font,
    pub padding: Padding,
    pub value_formatter: ValueFormatter,
}

impl Default for FillLabelConfig {
    fn default() -> Self {
        Self {
            text_color: "#000000".to_string(),
            text_invertible: false,
            text_contrast: TextContrast::default(),
            font: Font::default(),
            value_font: Font::default().bold(),
            padding: Padding::default(),
            value_formatter: ValueFormatter::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkLabelConfig {
    /// Sectors narrower than this arc length (px) never get fill text.
    pub maximum_section: f64,
    pub gap: f64,
    pub spacing: f64,
    pub minimum_stem_length: f64,
    pub stem_angle: f64,
    pub horizontal_stem_length: f64,
    pub radius_padding: f64,
    pub line_width: f64,
    pub max_count: usize,
    pub max_text_length: usize,
    pub font_size: f64,
    pub text_color: String,
    pub text_invertible: bool,
    pub text_contrast: TextContrast,
    pub font: Font,
    pub value_font: Font,
}

impl Default for LinkLabelConfig {
    fn default() -> Self {
        Self {
            maximum_section: 10.0,
            gap: 10.0,
            spacing: 2.0,
            minimum_stem_length: 0.0,
            stem_angle: TAU / 8.0,
            horizontal_stem_length: 10.0,
            radius_padding: 10.0,
            line_width: 1.0,
            max_count: 36,
            max_text_length: 100,
            font_size: 12.0,
            text_color: "#000000".to_string(),
            text_invertible: false,
            text_contrast: TextContrast::default(),
            font: Font::default(),
            value_font: Font::default().bold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub empty_size_ratio: f64,
    pub outer_size_ratio: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub ideal_font_size_jump: f64,
    pub maximize_font_size: bool,
    pub partition_layout: PartitionLayout,
    pub circle_padding: f64,
    pub radial_padding: f64,
    pub horizontal_text_angle_threshold: f64,
    pub horizontal_text_enforcer: f64,
    pub max_row_count: usize,
    pub fill_outside: bool,
    pub radius_outside: f64,
    pub fill_rectangle_width: f64,
    pub fill_rectangle_height: f64,
    pub clockwise_sectors: bool,
    pub special_first_innermost_sector: bool,
    pub background_color: String,
    pub sector_line_width: f64,
    pub sector_line_stroke: String,
    pub treemap_top_groove: f64,
    pub fill_label: FillLabelConfig,
    pub link_label: LinkLabelConfig,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 150.0,
            margin: Margin::default(),
            empty_size_ratio: 0.0,
            outer_size_ratio: 1.0 / 1.618,
            min_font_size: 8.0,
            max_font_size: 64.0,
            ideal_font_size_jump: 1.05,
            maximize_font_size: false,
            partition_layout: PartitionLayout::Sunburst,
            circle_padding: 2.0,
            radial_padding: TAU / 360.0,
            horizontal_text_angle_threshold: TAU / 12.0,
            horizontal_text_enforcer: 1.0,
            max_row_count: 12,
            fill_outside: false,
            radius_outside: 128.0,
            fill_rectangle_width: f64::INFINITY,
            fill_rectangle_height: f64::INFINITY,
            clockwise_sectors: true,
            special_first_innermost_sector: true,
            background_color: "#ffffff".to_string(),
            sector_line_width: 1.0,
            sector_line_stroke: "white".to_string(),
            treemap_top_groove: 20.0,
            fill_label: FillLabelConfig::default(),
            link_label: LinkLabelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub partition: PartitionConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Default settings with fonts and colors taken from `theme`.
    pub fn themed(theme: Theme) -> Self {
        let mut config = Self {
            theme: theme.clone(),
            partition: PartitionConfig::default(),
            render: RenderConfig::default(),
        };
        config.apply_theme(theme);
        config
    }

    /// Restyles fonts and colors, keeping every other setting.
    pub fn apply_theme(&mut self, theme: Theme) {
        let partition = &mut self.partition;
        partition.fill_label.font.family = theme.font_family.clone();
        partition.fill_label.value_font.family = theme.font_family.clone();
        partition.link_label.font.family = theme.font_family.clone();
        partition.link_label.value_font.family = theme.font_family.clone();
        partition.fill_label.text_color = theme.text_color.clone();
        partition.link_label.text_color = theme.text_color.clone();
        partition.background_color = theme.background.clone();
        self.render = RenderConfig {
            background: theme.background.clone(),
            font_family: theme.font_family.clone(),
        };
        self.theme = theme;
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::themed(Theme::elastic_default())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MarginFile {
    left: Option<f64>,
    right: Option<f64>,
    top: Option<f64>,
    bottom: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FontFile {
    font_family: Option<String>,
    font_weight: Option<u16>,
    font_style: Option<FontStyle>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FillLabelFile {
    text_color: Option<String>,
    text_invertible: Option<bool>,
    text_contrast: Option<TextContrast>,
    #[serde(flatten)]
    font: FontFile,
    value_font: Option<FontFile>,
    padding: Option<Padding>,
    value_formatter: Option<ValueFormatter>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LinkLabelFile {
    maximum_section: Option<f64>,
    gap: Option<f64>,
    spacing: Option<f64>,
    minimum_stem_length: Option<f64>,
    stem_angle: Option<f64>,
    horizontal_stem_length: Option<f64>,
    radius_padding: Option<f64>,
    line_width: Option<f64>,
    max_count: Option<usize>,
    max_text_length: Option<usize>,
    font_size: Option<f64>,
    text_color: Option<String>,
    text_invertible: Option<bool>,
    text_contrast: Option<TextContrast>,
    #[serde(flatten)]
    font: FontFile,
    value_font: Option<FontFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PartitionConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<MarginFile>,
    empty_size_ratio: Option<f64>,
    outer_size_ratio: Option<f64>,
    min_font_size: Option<f64>,
    max_font_size: Option<f64>,
    ideal_font_size_jump: Option<f64>,
    maximize_font_size: Option<bool>,
    partition_layout: Option<PartitionLayout>,
    circle_padding: Option<f64>,
    radial_padding: Option<f64>,
    horizontal_text_angle_threshold: Option<f64>,
    horizontal_text_enforcer: Option<f64>,
    max_row_count: Option<usize>,
    fill_outside: Option<bool>,
    radius_outside: Option<f64>,
    fill_rectangle_width: Option<f64>,
    fill_rectangle_height: Option<f64>,
    clockwise_sectors: Option<bool>,
    special_first_innermost_sector: Option<bool>,
    background_color: Option<String>,
    sector_line_width: Option<f64>,
    sector_line_stroke: Option<String>,
    treemap_top_groove: Option<f64>,
    fill_label: Option<FillLabelFile>,
    link_label: Option<LinkLabelFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    background: Option<String>,
    font_family: Option<String>,
    partition: Option<PartitionConfigFile>,
}

fn apply_font(font: &mut Font, file: FontFile) {
    if let Some(v) = file.font_family {
        font.family = v;
    }
    if let Some(v) = file.font_weight {
        font.weight = v;
    }
    if let Some(v) = file.font_style {
        font.style = v;
    }
}

fn apply_fill_label(config: &mut FillLabelConfig, file: FillLabelFile) {
    if let Some(v) = file.text_color {
        config.text_color = v;
    }
    if let Some(v) = file.text_invertible {
        config.text_invertible = v;
    }
    if let Some(v) = file.text_contrast {
        config.text_contrast = v;
    }
    // the value font inherits the label font unless overridden
    let family_override = file.font.font_family.clone();
    apply_font(&mut config.font, file.font);
    if let Some(v) = family_override {
        config.value_font.family = v;
    }
    if let Some(v) = file.value_font {
        apply_font(&mut config.value_font, v);
    }
    if let Some(v) = file.padding {
        config.padding = v;
    }
    if let Some(v) = file.value_formatter {
        config.value_formatter = v;
    }
}

fn apply_link_label(config: &mut LinkLabelConfig, file: LinkLabelFile) {
    if let Some(v) = file.maximum_section {
        config.maximum_section = v;
    }
    if let Some(v) = file.gap {
        config.gap = v;
    }
    if let Some(v) = file.spacing {
        config.spacing = v;
    }
    if let Some(v) = file.minimum_stem_length {
        config.minimum_stem_length = v;
    }
    if let Some(v) = file.stem_angle {
        config.stem_angle = v;
    }
    if let Some(v) = file.horizontal_stem_length {
        config.horizontal_stem_length = v;
    }
    if let Some(v) = file.radius_padding {
        config.radius_padding = v;
    }
    if let Some(v) = file.line_width {
        config.line_width = v;
    }
    if let Some(v) = file.max_count {
        config.max_count = v;
    }
    if let Some(v) = file.max_text_length {
        config.max_text_length = v;
    }
    if let Some(v) = file.font_size {
        config.font_size = v;
    }
    if let Some(v) = file.text_color {
        config.text_color = v;
    }
    if let Some(v) = file.text_invertible {
        config.text_invertible = v;
    }
    if let Some(v) = file.text_contrast {
        config.text_contrast = v;
    }
    let family_override = file.font.font_family.clone();
    apply_font(&mut config.font, file.font);
    if let Some(v) = family_override {
        config.value_font.family = v;
    }
    if let Some(v) = file.value_font {
        apply_font(&mut config.value_font, v);
    }
}

fn apply_partition(config: &mut PartitionConfig, file: PartitionConfigFile) {
    if let Some(v) = file.width {
        config.width = v;
    }
    if let Some(v) = file.height {
        config.height = v;
    }
    if let Some(margin) = file.margin {
        if let Some(v) = margin.left {
            config.margin.left = v;
        }
        if let Some(v) = margin.right {
            config.margin.right = v;
        }
        if let Some(v) = margin.top {
            config.margin.top = v;
        }
        if let Some(v) = margin.bottom {
            config.margin.bottom = v;
        }
    }
    if let Some(v) = file.empty_size_ratio {
        config.empty_size_ratio = v;
    }
    if let Some(v) = file.outer_size_ratio {
        config.outer_size_ratio = v;
    }
    if let Some(v) = file.min_font_size {
        config.min_font_size = v;
    }
    if let Some(v) = file.max_font_size {
        config.max_font_size = v;
    }
    if let Some(v) = file.ideal_font_size_jump {
        config.ideal_font_size_jump = v;
    }
    if let Some(v) = file.maximize_font_size {
        config.maximize_font_size = v;
    }
    if let Some(v) = file.partition_layout {
        config.partition_layout = v;
    }
    if let Some(v) = file.circle_padding {
        config.circle_padding = v;
    }
    if let Some(v) = file.radial_padding {
        config.radial_padding = v;
    }
    if let Some(v) = file.horizontal_text_angle_threshold {
        config.horizontal_text_angle_threshold = v;
    }
    if let Some(v) = file.horizontal_text_enforcer {
        config.horizontal_text_enforcer = v;
    }
    if let Some(v) = file.max_row_count {
        config.max_row_count = v;
    }
    if let Some(v) = file.fill_outside {
        config.fill_outside = v;
    }
    if let Some(v) = file.radius_outside {
        config.radius_outside = v;
    }
    if let Some(v) = file.fill_rectangle_width {
        config.fill_rectangle_width = v;
    }
    if let Some(v) = file.fill_rectangle_height {
        config.fill_rectangle_height = v;
    }
    if let Some(v) = file.clockwise_sectors {
        config.clockwise_sectors = v;
    }
    if let Some(v) = file.special_first_innermost_sector {
        config.special_first_innermost_sector = v;
    }
    if let Some(v) = file.background_color {
        config.background_color = v;
    }
    if let Some(v) = file.sector_line_width {
        config.sector_line_width = v;
    }
    if let Some(v) = file.sector_line_stroke {
        config.sector_line_stroke = v;
    }
    if let Some(v) = file.treemap_top_groove {
        config.treemap_top_groove = v;
    }
    if let Some(v) = file.fill_label {
        apply_fill_label(&mut config.fill_label, v);
    }
    if let Some(v) = file.link_label {
        apply_link_label(&mut config.link_label, v);
    }
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str(contents)
            .with_context(|| format!("config is neither JSON ({json_err}) nor JSON5")),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let parsed = parse_config_file(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.apply_theme(theme),
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(v) = parsed.background {
        config.render.background = v.clone();
        config.partition.background_color = v;
    }
    if let Some(v) = parsed.font_family {
        config.render.font_family = v;
    }
    if let Some(partition) = parsed.partition {
        apply_partition(&mut config.partition, partition);
    }

    Ok(config)
}
