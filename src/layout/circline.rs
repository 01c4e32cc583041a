use super::geometry::{
    Circle, Distance, Point, Radian, Radius, TAU, fully_contained, no_overlap,
    true_bearing_to_standard_position_angle,
};
use super::types::ShapeTreeNode;
use crate::config::PartitionConfig;

/// Radius standing in for a straight line. Far enough for sub-2px precision
/// across a 4k screen while f64 arithmetic stays well conditioned.
pub const INFINITY_RADIUS: Radius = 1e4;

/// A boundary circle. With `inside == true` the interior of the circle is
/// excluded from the valid region; otherwise only the interior is valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circline {
    pub x: f64,
    pub y: f64,
    pub r: Radius,
    pub inside: bool,
}

impl Circline {
    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.r)
    }
}

/// The part of a circle's circumference between the standard-position
/// angles `from` and `to`, both in `[0, TAU]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclineArc {
    pub x: f64,
    pub y: f64,
    pub r: Radius,
    pub from: Radian,
    pub to: Radian,
}

impl CirclineArc {
    pub fn full(x: f64, y: f64, r: Radius) -> Self {
        Self {
            x,
            y,
            r,
            from: 0.0,
            to: TAU,
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.r)
    }

    pub fn angular_measure(&self) -> Radian {
        (self.to - self.from).max(0.0)
    }
}

pub type RingSectorConstruction = Vec<Circline>;

/// Intersection points of two circles, or `None` when they don't cross
/// (disjoint, nested, or concentric).
pub fn circline_intersect(c1: &Circle, c2: &Circle) -> Option<[Point; 2]> {
    let d2 = (c1.x - c2.x).powi(2) + (c1.y - c2.y).powi(2);
    let d = d2.sqrt();
    if d <= 0.0 || c1.r + c2.r < d || (c1.r - c2.r).abs() > d {
        return None;
    }
    let r1sq = c1.r * c1.r;
    let r2sq = c2.r * c2.r;
    let a = (r1sq - r2sq) / (2.0 * d2);
    let b = (2.0 * (r1sq + r2sq) / d2 - (r1sq - r2sq).powi(2) / (d2 * d2) - 1.0)
        .max(0.0)
        .sqrt();
    let xs = (c1.x + c2.x) / 2.0 + a * (c2.x - c1.x);
    let xd = b * (c2.y - c1.y) / 2.0;
    let ys = (c1.y + c2.y) / 2.0 + a * (c2.y - c1.y);
    let yd = b * (c1.x - c2.x) / 2.0;
    Some([Point::new(xs + xd, ys + yd), Point::new(xs - xd, ys - yd)])
}

fn angle_on(arc: &CirclineArc, p: Point) -> Radian {
    let angle = (p.y - arc.y).atan2(p.x - arc.x);
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    angle.clamp(arc.from, arc.to)
}

/// Appends to `out` the sub-arcs of `arc` that satisfy `constraint`.
pub(crate) fn circline_valid_sectors(
    constraint: &Circline,
    arc: &CirclineArc,
    out: &mut Vec<CirclineArc>,
) {
    let reference = constraint.circle();
    let circle = arc.circle();
    let arc_within = fully_contained(&reference, &circle);
    let arc_outside = no_overlap(&reference, &circle) || fully_contained(&circle, &reference);

    if arc_within {
        if !constraint.inside {
            out.push(*arc);
        }
        return;
    }
    if arc_outside {
        if constraint.inside {
            out.push(*arc);
        }
        return;
    }

    let Some([p1, p2]) = circline_intersect(&reference, &circle) else {
        return;
    };
    let a1 = angle_on(arc, p1);
    let a2 = angle_on(arc, p2);
    let (lo, hi) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };

    let mut breakpoints = [0.0; 4];
    let mut count = 0;
    breakpoints[count] = arc.from;
    count += 1;
    if arc.from < lo && lo < arc.to {
        breakpoints[count] = lo;
        count += 1;
    }
    if lo < hi && arc.from < hi && hi < arc.to {
        breakpoints[count] = hi;
        count += 1;
    }
    breakpoints[count] = arc.to;
    count += 1;

    for window in breakpoints[..count].windows(2) {
        let (from, to) = (window[0], window[1]);
        // plain midpoint: the interval never wraps, so mean_angle would be wrong here
        let mid = (from + to) / 2.0;
        let probe = Circle::point(arc.x + arc.r * mid.cos(), arc.y + arc.r * mid.sin());
        let valid = if constraint.inside {
            no_overlap(&reference, &probe)
        } else {
            fully_contained(&reference, &probe)
        };
        if valid {
            out.push(CirclineArc {
                from,
                to,
                ..*arc
            });
        }
    }
}

/// Reduces `arc` to the sub-arcs lying in the intersection of all the
/// constraint regions.
pub fn conjunctive_constraint(constraints: &[Circline], arc: CirclineArc) -> Vec<CirclineArc> {
    let mut valids = vec![arc];
    let mut next = Vec::with_capacity(2);
    for constraint in constraints {
        if valids.is_empty() {
            break;
        }
        next.clear();
        for candidate in &valids {
            circline_valid_sectors(constraint, candidate, &mut next);
        }
        std::mem::swap(&mut valids, &mut next);
    }
    valids
}

fn ring_sector_start_angle(node: &ShapeTreeNode) -> Radian {
    true_bearing_to_standard_position_angle(
        node.x0 + (node.x1 - node.x0 - TAU / 2.0).max(0.0) / 2.0,
    )
}

fn ring_sector_end_angle(node: &ShapeTreeNode) -> Radian {
    true_bearing_to_standard_position_angle(
        node.x1 - (node.x1 - node.x0 - TAU / 2.0).max(0.0) / 2.0,
    )
}

/// A huge circle tangent to the radial line at `alpha`, standing in for
/// that line; `direction` picks the side its centre lies on.
fn angle_to_circline(mid_radius: Radius, alpha: Radian, direction: f64) -> Circline {
    let normal = alpha + direction * TAU / 4.0;
    Circline {
        x: alpha.cos() * mid_radius + INFINITY_RADIUS * normal.cos(),
        y: alpha.sin() * mid_radius + INFINITY_RADIUS * normal.sin(),
        r: INFINITY_RADIUS,
        inside: false,
    }
}

/// Constraint list outlining the text-fillable region of a ring sector.
pub fn ring_sector_construction(
    config: &PartitionConfig,
    inner_radius: Radius,
    ring_thickness: Distance,
    node: &ShapeTreeNode,
) -> RingSectorConstruction {
    let ring_inner = inner_radius + node.y0 * ring_thickness;
    let ring_outer = inner_radius + (node.y0 + 1.0) * ring_thickness;
    let geometric_inner = if config.fill_outside {
        ring_outer
    } else {
        ring_inner
    };
    let inner_r = geometric_inner + config.circle_padding * 2.0;
    let outside_extra = if config.fill_outside {
        config.radius_outside
    } else {
        0.0
    };
    let outer_r = inner_r.max(ring_outer - config.circle_padding + outside_extra);
    let start = ring_sector_start_angle(node);
    let end = ring_sector_end_angle(node);
    let mid_radius = (inner_r + outer_r) / 2.0;
    let full_circle = node.x0 == 0.0 && node.x1 == TAU && geometric_inner == 0.0;

    let mut constraints = Vec::with_capacity(8);
    if !(full_circle && inner_radius == 0.0) {
        constraints.push(Circline {
            x: 0.0,
            y: 0.0,
            r: inner_r,
            inside: true,
        });
    }
    constraints.push(Circline {
        x: 0.0,
        y: 0.0,
        r: outer_r,
        inside: false,
    });
    if !full_circle {
        constraints.push(angle_to_circline(mid_radius, start - config.radial_padding, -1.0));
        constraints.push(angle_to_circline(mid_radius, end + config.radial_padding, 1.0));
    }

    let half_width = config.fill_rectangle_width / 2.0;
    let half_height = config.fill_rectangle_height / 2.0;
    if half_width.is_finite() {
        constraints.push(Circline {
            x: -INFINITY_RADIUS + half_width,
            y: 0.0,
            r: INFINITY_RADIUS,
            inside: false,
        });
        constraints.push(Circline {
            x: INFINITY_RADIUS - half_width,
            y: 0.0,
            r: INFINITY_RADIUS,
            inside: false,
        });
    }
    if half_height.is_finite() {
        constraints.push(Circline {
            x: 0.0,
            y: -INFINITY_RADIUS + half_height,
            r: INFINITY_RADIUS,
            inside: false,
        });
        constraints.push(Circline {
            x: 0.0,
            y: INFINITY_RADIUS - half_height,
            r: INFINITY_RADIUS,
            inside: false,
        });
    }
    constraints
}
