use serde::Serialize;

pub type Pixels = f64;
pub type Radian = f64;
pub type Distance = f64;
pub type Radius = f64;

pub const TAU: Radian = std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: Radius,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: Radius) -> Self {
        Self { x, y, r }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self { x, y, r: 0.0 }
    }
}

/// Normalizes an angle into `[0, TAU)`.
pub fn wrap_to_tau(a: Radian) -> Radian {
    if (0.0..TAU).contains(&a) {
        return a;
    }
    let wrapped = a.rem_euclid(TAU);
    // rem_euclid may round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed difference `a - b`, folded into `[-PI, PI)`.
pub fn diff_angle(a: Radian, b: Radian) -> Radian {
    (a - b + std::f64::consts::PI).rem_euclid(TAU) - std::f64::consts::PI
}

/// Midpoint between two angles along the shorter way round, so a sector
/// straddling the 0/TAU seam still gets a sensible middle.
pub fn mean_angle(a: Radian, b: Radian) -> Radian {
    wrap_to_tau(b + diff_angle(a, b) / 2.0)
}

/// Layout angles are true bearings (clockwise from north); geometry uses the
/// standard position (counterclockwise from east).
pub fn true_bearing_to_standard_position_angle(bearing: Radian) -> Radian {
    wrap_to_tau(TAU / 4.0 - bearing)
}

pub fn euclidean_distance(a: &Circle, b: &Circle) -> Distance {
    (b.x - a.x).hypot(b.y - a.y)
}

/// True when `inner` lies entirely within `outer`.
pub fn fully_contained(outer: &Circle, inner: &Circle) -> bool {
    euclidean_distance(outer, inner) + inner.r <= outer.r
}

/// True when the two circles share no interior point.
pub fn no_overlap(a: &Circle, b: &Circle) -> bool {
    euclidean_distance(a, b) >= a.r + b.r
}
