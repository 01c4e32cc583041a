#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::layout::geometry::TAU;
use crate::layout::link_text::label_value_gap;
use crate::layout::{
    LinkLabelVM, PartitionLayout, QuadViewModel, RowSet, ShapeViewModel, TextAlign, VerticalAlignment,
};
use crate::text_metrics::Font;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(model: &ShapeViewModel, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = model.width.max(1.0);
    let height = model.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    if model.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    // everything below is relative to the disk center, +y down
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2})\">",
        model.disk_center.x, model.disk_center.y
    ));

    svg.push_str("<g class=\"shapes\">");
    for quad in &model.quad_view_model {
        match model.partition_layout {
            PartitionLayout::Sunburst => svg.push_str(&sector_svg(quad)),
            PartitionLayout::Treemap => svg.push_str(&rectangle_svg(quad)),
        }
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"fill-text\">");
    for row_set in &model.row_sets {
        svg.push_str(&row_set_svg(row_set, theme));
    }
    svg.push_str("</g>");

    let style = &model.link_label_style;
    for link in &model.outside_links_view_model {
        let flipped: Vec<[f64; 2]> = link.points.iter().map(|[x, y]| [*x, -*y]).collect();
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_to_path(&flipped),
            style.stroke_color,
            style.line_width
        ));
    }

    svg.push_str("<g class=\"link-labels\">");
    for label in &model.link_label_view_models {
        svg.push_str(&link_label_svg(model, label, theme));
    }
    svg.push_str("</g>");

    svg.push_str("</g></svg>");
    svg
}

/// Screen point at `radius` along a bearing (clockwise from north).
fn polar(bearing: f64, radius: f64) -> (f64, f64) {
    (radius * bearing.sin(), -radius * bearing.cos())
}

fn sector_svg(quad: &QuadViewModel) -> String {
    let shape = &quad.shape;
    if shape.x0 == shape.x1 {
        return String::new();
    }
    let (r0, r1) = (shape.y0px, shape.y1px);
    let path = if shape.x1 - shape.x0 >= TAU - 1e-9 {
        // a full ring needs two half arcs per circle
        let ring = |r: f64, sweep: u8| {
            format!(
                "M 0 {:.2} A {r:.2} {r:.2} 0 1 {sweep} 0 {:.2} A {r:.2} {r:.2} 0 1 {sweep} 0 {:.2} Z",
                -r, r, -r
            )
        };
        let outer = ring(r1, 1);
        if r0 > 0.0 { format!("{outer} {}", ring(r0, 0)) } else { outer }
    } else {
        let large_arc = u8::from(shape.x1 - shape.x0 > TAU / 2.0);
        let (ox0, oy0) = polar(shape.x0, r1);
        let (ox1, oy1) = polar(shape.x1, r1);
        let (ix1, iy1) = polar(shape.x1, r0);
        let (ix0, iy0) = polar(shape.x0, r0);
        format!(
            "M {ox0:.2} {oy0:.2} A {r1:.2} {r1:.2} 0 {large_arc} 1 {ox1:.2} {oy1:.2} L {ix1:.2} {iy1:.2} A {r0:.2} {r0:.2} 0 {large_arc} 0 {ix0:.2} {iy0:.2} Z"
        )
    };
    let full_ring = shape.x0 == 0.0 && shape.x1 >= TAU - 1e-9;
    let stroke_width = if full_ring { 0.0 } else { quad.stroke_width };
    format!(
        "<path d=\"{path}\" fill=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{stroke_width}\" stroke-linejoin=\"round\"/>",
        quad.fill_color, quad.stroke_style
    )
}

fn rectangle_svg(quad: &QuadViewModel) -> String {
    let shape = &quad.shape;
    let (w, h) = (shape.x1 - shape.x0, shape.y1px - shape.y0px);
    if w < 1.0 || h < 1.0 {
        return String::new();
    }
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        shape.x0, shape.y0px, quad.fill_color, quad.stroke_style, quad.stroke_width
    )
}

fn dominant_baseline(alignment: VerticalAlignment) -> &'static str {
    match alignment {
        VerticalAlignment::Top => "text-before-edge",
        VerticalAlignment::Middle => "central",
        VerticalAlignment::Bottom => "text-after-edge",
    }
}

fn font_attributes(font: &Font, theme: &Theme) -> String {
    let family = if font.family == Font::default().family {
        theme.font_family.as_str()
    } else {
        font.family.as_str()
    };
    format!(
        "font-family=\"{}\" font-weight=\"{}\" font-style=\"{}\"",
        escape_xml(family),
        font.weight,
        font.style.as_str()
    )
}

fn row_set_svg(row_set: &RowSet, theme: &Theme) -> String {
    let mut svg = String::new();
    let rotation = row_set.rotation;
    let degrees = -rotation.to_degrees();
    for row in &row_set.rows {
        let crx = if row_set.left_align {
            row.row_anchor_x - row.maximum_length / 2.0
        } else {
            row.row_anchor_x - rotation.cos() * row.length / 2.0
        };
        let cry = -row.row_anchor_y + rotation.sin() * row.length / 2.0;
        if !crx.is_finite() || !cry.is_finite() {
            continue;
        }
        svg.push_str(&format!(
            "<g transform=\"translate({crx:.2} {cry:.2}) rotate({degrees:.2})\" fill=\"{}\" font-size=\"{}\" text-anchor=\"middle\" dominant-baseline=\"{}\">",
            row_set.fill_text_color,
            row_set.font_size,
            dominant_baseline(row_set.vertical_alignment)
        ));
        for word in &row.row_words {
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"0\" {}>{}</text>",
                word.word_beginning + word.width / 2.0,
                font_attributes(&word.font, theme),
                escape_xml(&word.text)
            ));
        }
        svg.push_str("</g>");
    }
    svg
}

fn link_label_svg(model: &ShapeViewModel, label: &LinkLabelVM, theme: &Theme) -> String {
    let style = &model.link_label_style;
    // link label geometry is y-up
    let flipped: Vec<[f64; 2]> = label.link_labels.iter().map(|[x, y]| [*x, -*y]).collect();
    let gap = label_value_gap(style.font_size);
    let (anchor, text_x, value_x) = match label.text_align {
        TextAlign::Left => ("start", 0.0, label.width + gap),
        TextAlign::Right => ("end", -label.value_width - gap, 0.0),
    };
    let mut svg = format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
        points_to_path(&flipped),
        style.stroke_color,
        style.line_width
    );
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2})\" fill=\"{}\" font-size=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"central\">",
        label.translate[0],
        -label.translate[1],
        style.text_color,
        style.font_size
    ));
    svg.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"0\" {}>{}</text>",
        font_attributes(&style.label_font, theme),
        escape_xml(&label.text)
    ));
    if !label.value_text.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{value_x:.2}\" y=\"0\" {}>{}</text>",
            font_attributes(&style.value_font, theme),
            escape_xml(&label.value_text)
        ));
    }
    svg.push_str("</g>");
    svg
}

fn points_to_path(points: &[[f64; 2]]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first[0], first[1]);
    for point in &points[1..] {
        d.push_str(&format!(" L {:.2} {:.2}", point[0], point[1]));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = primary_font_family(&render_cfg.font_family);
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// First entry of a CSS font-family list, unquoted.
pub fn primary_font_family(font_family: &str) -> String {
    font_family
        .split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|family| !family.is_empty())
        .unwrap_or("sans-serif")
        .to_string()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionConfig;
    use crate::layout::{FastTextMeasure, shape_view_model};
    use crate::spec::{Layer, PartitionSpec};

    type Fact = (&'static str, f64);

    fn model(layout: PartitionLayout) -> ShapeViewModel {
        let spec = PartitionSpec::new(|fact: &Fact| fact.1).with_layer(Layer::new(|fact: &Fact| fact.0.to_string()));
        let facts = vec![("Tea & Coffee", 60.0), ("Juice", 30.0), ("Water", 10.0)];
        let config = PartitionConfig {
            width: 500.0,
            height: 300.0,
            partition_layout: layout,
            ..PartitionConfig::default()
        };
        shape_view_model(&FastTextMeasure, &config, &spec, &facts)
    }

    #[test]
    fn sunburst_svg_has_one_path_per_sector() {
        let model = model(PartitionLayout::Sunburst);
        let svg = render_svg(&model, &Theme::elastic_default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        let sectors = svg.matches("fill-rule=\"evenodd\"").count();
        assert_eq!(sectors, model.quad_view_model.len());
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains(" & "));
    }

    #[test]
    fn treemap_svg_draws_rectangles() {
        let model = model(PartitionLayout::Treemap);
        let svg = render_svg(&model, &Theme::modern());
        assert_eq!(svg.matches("<rect x=").count(), model.quad_view_model.len());
    }

    #[test]
    fn empty_model_renders_background_only() {
        let spec = PartitionSpec::new(|fact: &Fact| fact.1).with_layer(Layer::new(|fact: &Fact| fact.0.to_string()));
        let empty: Vec<Fact> = Vec::new();
        let model = shape_view_model(&FastTextMeasure, &PartitionConfig::default(), &spec, &empty);
        let svg = render_svg(&model, &Theme::modern());
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn primary_family_is_unquoted() {
        assert_eq!(primary_font_family("\"Inter UI\", Arial"), "Inter UI");
        assert_eq!(primary_font_family(""), "sans-serif");
    }
}
