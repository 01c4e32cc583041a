use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use partition_chart::config::{PartitionConfig, Padding};
use partition_chart::layout::circline::{Circline, CirclineArc, conjunctive_constraint};
use partition_chart::layout::fill_text::{RectangleConstruction, get_rectangle_row_geometry};
use partition_chart::layout::geometry::{Point, TAU};
use partition_chart::layout::hierarchy::{Aggregator, GroupBy, Hierarchy, NodeId};
use partition_chart::layout::optimize::{identity_snap, integer_snap, monotonic_hill_climb};
use partition_chart::layout::treemap::{TreemapRect, treemap};
use partition_chart::layout::{FastTextMeasure, PartitionLayout, ShapeViewModel, VerticalAlignment, shape_view_model};
use partition_chart::render::render_svg;
use partition_chart::spec::{Layer, PartitionSpec};
use partition_chart::theme::Theme;
use proptest::prelude::*;

type Fact = (String, String, f64);

fn fact(outer: &str, inner: &str, value: f64) -> Fact {
    (outer.to_string(), inner.to_string(), value)
}

fn one_layer_spec() -> PartitionSpec<Fact> {
    PartitionSpec::new(|fact: &Fact| fact.2).with_layer(Layer::new(|fact: &Fact| fact.0.clone()))
}

fn two_layer_spec() -> PartitionSpec<Fact> {
    one_layer_spec().with_layer(Layer::new(|fact: &Fact| fact.1.clone()))
}

fn config(layout: PartitionLayout, width: f64, height: f64) -> PartitionConfig {
    PartitionConfig {
        width,
        height,
        partition_layout: layout,
        ..PartitionConfig::default()
    }
}

fn layout(spec: &PartitionSpec<Fact>, config: &PartitionConfig, facts: &[Fact]) -> ShapeViewModel {
    shape_view_model(&FastTextMeasure, config, spec, facts)
}

#[test]
fn two_equal_leaves_split_the_disk_in_half() {
    let facts = vec![fact("a", "", 1.0), fact("b", "", 1.0)];
    let model = layout(&one_layer_spec(), &config(PartitionLayout::Sunburst, 300.0, 150.0), &facts);
    assert_eq!(model.quad_view_model.len(), 2);
    for quad in &model.quad_view_model {
        assert!((quad.shape.x1 - quad.shape.x0 - PI).abs() < 1e-12);
    }
}

#[test]
fn landscape_treemap_splits_into_squares() {
    let facts = vec![fact("a", "", 5.0), fact("b", "", 5.0)];
    let model = layout(&one_layer_spec(), &config(PartitionLayout::Treemap, 200.0, 100.0), &facts);
    assert_eq!(model.quad_view_model.len(), 2);
    for quad in &model.quad_view_model {
        let shape = &quad.shape;
        assert!((shape.x1 - shape.x0 - 100.0).abs() < 1e-9);
        assert!((shape.y1px - shape.y0px - 100.0).abs() < 1e-9);
    }
}

#[test]
fn unpadded_rectangle_row_spans_the_width() {
    let container = RectangleConstruction {
        x0: 0.0,
        y0: 0.0,
        x1: 200.0,
        y1: 100.0,
    };
    let space = get_rectangle_row_geometry(
        &container,
        Point::new(100.0, 50.0),
        1,
        50.0,
        0,
        50.0,
        VerticalAlignment::Middle,
        Padding::Uniform(0.0).resolve(),
    );
    assert_eq!(space.maximum_row_length, 200.0);
}

#[test]
fn a_negative_value_empties_the_model() {
    let facts = vec![fact("a", "x", 3.0), fact("b", "y", -1.0), fact("c", "z", 4.0)];
    for partition_layout in [PartitionLayout::Sunburst, PartitionLayout::Treemap] {
        let model = layout(&two_layer_spec(), &config(partition_layout, 400.0, 300.0), &facts);
        assert!(model.quad_view_model.is_empty());
        assert!(model.row_sets.is_empty());
        assert!(model.link_label_view_models.is_empty());
    }
}

#[test]
fn zero_value_leaf_keeps_treemap_geometry_finite() {
    let facts = vec![fact("a", "x", 5.0), fact("a", "y", 0.0), fact("b", "z", 3.0)];
    let model = layout(&two_layer_spec(), &config(PartitionLayout::Treemap, 400.0, 300.0), &facts);
    assert_eq!(model.quad_view_model.len(), 5);
    for quad in &model.quad_view_model {
        let shape = &quad.shape;
        assert!(
            [shape.x0, shape.x1, shape.y0px, shape.y1px].iter().all(|v| v.is_finite()),
            "{} has non-finite geometry",
            shape.data_name
        );
    }
    let svg = render_svg(&model, &Theme::elastic_default());
    assert!(!svg.contains("NaN"));
}

#[test]
fn text_that_fits_nowhere_is_dropped_not_emptied() {
    let long = "A remarkably verbose category name that will never fit anywhere";
    let mut facts: Vec<Fact> = (0..6).map(|i| fact(&format!("Group {i}"), "Leaf", 100.0)).collect();
    facts.push(fact("Group 0", long, 0.5));
    // the disk fills the chart, leaving no width beside it for link labels
    let narrow = PartitionConfig {
        outer_size_ratio: 1.0,
        ..config(PartitionLayout::Sunburst, 300.0, 300.0)
    };
    let model = layout(&two_layer_spec(), &narrow, &facts);

    let tiny = model
        .quad_view_model
        .iter()
        .find(|quad| quad.shape.data_name == long)
        .expect("the tiny sector is laid out");
    let tiny_id = tiny.shape.id();
    assert!(
        model
            .row_sets
            .iter()
            .filter(|row_set| row_set.id == tiny_id)
            .all(|row_set| row_set.rows.is_empty())
    );
    assert!(model.link_label_view_models.iter().all(|label| label.id != tiny_id));
    assert!(
        model
            .link_label_view_models
            .iter()
            .all(|label| !label.text.is_empty() && label.text != "…")
    );
}

#[test]
fn outer_nodes_without_fill_text_get_link_labels() {
    let mut facts: Vec<Fact> = vec![fact("Big", "Bulk", 200.0)];
    for i in 0..4 {
        facts.push(fact("Small", &format!("Sliver number {i}"), 1.0));
    }
    let model = layout(&two_layer_spec(), &config(PartitionLayout::Sunburst, 600.0, 300.0), &facts);
    assert!(
        model
            .link_label_view_models
            .iter()
            .any(|label| label.text.starts_with("Sliver"))
    );

    let filled: Vec<&str> = model
        .row_sets
        .iter()
        .filter(|row_set| !row_set.rows.is_empty())
        .map(|row_set| row_set.id.as_str())
        .collect();
    for label in &model.link_label_view_models {
        assert!(!filled.contains(&label.id.as_str()), "{} has both fill text and a link label", label.id);
        assert_eq!(label.link_labels.len(), 4);
    }
}

#[test]
fn rerunning_the_pipeline_is_bit_identical() {
    let facts = vec![
        fact("Europe", "France", 30.0),
        fact("Europe", "Germany", 20.0),
        fact("Asia", "Japan", 25.0),
        fact("Asia", "India", 15.0),
        fact("Africa", "Egypt", 10.0),
    ];
    for partition_layout in [PartitionLayout::Sunburst, PartitionLayout::Treemap] {
        let config = config(partition_layout, 500.0, 400.0);
        let first = serde_json::to_string(&layout(&two_layer_spec(), &config, &facts)).expect("serializes");
        let second = serde_json::to_string(&layout(&two_layer_spec(), &config, &facts)).expect("serializes");
        assert_eq!(first, second);
    }
}

#[test]
fn hill_climb_edge_cases() {
    assert_eq!(monotonic_hill_climb(|_| 1.0, 10.0, 5.0, identity_snap, 0.0), Some(10.0));
    assert_eq!(monotonic_hill_climb(|x| x, 10.0, 5.0, identity_snap, 20.0), None);
    assert_eq!(monotonic_hill_climb(|x| x, 10.0, 5.0, integer_snap, 0.0), Some(5.0));
}

#[test]
fn conjunction_without_constraints_keeps_the_arc() {
    let arc = CirclineArc {
        x: 0.0,
        y: 0.0,
        r: 10.0,
        from: 0.5,
        to: 2.0,
    };
    assert_eq!(conjunctive_constraint(&[], arc), vec![arc]);
}

fn two_level_tree(values: &[(u8, f64)]) -> Hierarchy {
    let facts: Vec<(String, String, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, (group, value))| (format!("g{}", group % 4), format!("leaf{i}"), *value))
        .collect();
    let group_by: Vec<GroupBy<(String, String, f64)>> = vec![
        Arc::new(|fact: &(String, String, f64)| fact.0.clone()),
        Arc::new(|fact: &(String, String, f64)| fact.1.clone()),
    ];
    Hierarchy::group_by_rollup(&facts, |fact| fact.2, &group_by, Aggregator::Sum)
}

proptest! {
    #[test]
    fn sunburst_children_cover_their_parent(values in prop::collection::vec((0u8..8, 0.1f64..100.0), 1..24)) {
        let facts: Vec<Fact> = values
            .iter()
            .enumerate()
            .map(|(i, (group, value))| fact(&format!("g{}", group % 4), &format!("leaf{i}"), *value))
            .collect();
        let model = layout(&two_layer_spec(), &config(PartitionLayout::Sunburst, 400.0, 400.0), &facts);
        let mut spans: HashMap<NodeId, f64> = HashMap::new();
        let mut child_spans: HashMap<NodeId, f64> = HashMap::new();
        for quad in &model.quad_view_model {
            let shape = &quad.shape;
            spans.insert(shape.node, shape.x1 - shape.x0);
            *child_spans.entry(shape.parent.unwrap_or(Hierarchy::ROOT)).or_default() += shape.x1 - shape.x0;
        }
        for (parent, total) in child_spans {
            let expected = spans.get(&parent).copied().unwrap_or(TAU);
            prop_assert!((total - expected).abs() < 1e-9, "children of {} span {} not {}", parent, total, expected);
        }
    }

    #[test]
    fn treemap_children_tile_their_parent(values in prop::collection::vec((0u8..8, 0.1f64..100.0), 1..24)) {
        let tree = two_level_tree(&values);
        let scale = 600.0 * 400.0 / tree.total();
        let parts = treemap(
            &tree,
            &[Hierarchy::ROOT],
            &|id| tree.node(id).value * scale,
            &|_| 0.0,
            &|_| 0.0,
            TreemapRect::new(0.0, 0.0, 600.0, 400.0),
        );
        let area: HashMap<NodeId, f64> = parts
            .iter()
            .map(|part| (part.node, (part.x1 - part.x0) * (part.y1 - part.y0)))
            .collect();
        for (&node, &parent_area) in &area {
            let children = tree.children(node);
            if children.is_empty() || parent_area == 0.0 {
                continue;
            }
            let covered: f64 = children.iter().filter_map(|child| area.get(child)).sum();
            prop_assert!((covered - parent_area).abs() < 1e-6 * parent_area.max(1.0));
        }
    }

    #[test]
    fn hill_climb_finds_the_largest_feasible_input(slope in 0.5f64..20.0, bound in 1.0f64..500.0) {
        let found = monotonic_hill_climb(|x| x * slope, 100.0, bound, integer_snap, 0.0);
        let expected = (0..=100).rev().map(f64::from).find(|x| x * slope <= bound);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn an_intersecting_constraint_shrinks_the_arc(offset in 2.0f64..18.0) {
        let arc = CirclineArc::full(0.0, 0.0, 10.0);
        let constraint = Circline { x: offset, y: 0.0, r: 10.0, inside: true };
        let pieces = conjunctive_constraint(&[constraint], arc);
        let measure: f64 = pieces.iter().map(CirclineArc::angular_measure).sum();
        prop_assert!(measure < arc.angular_measure());
        prop_assert!(measure > 0.0);
    }
}
