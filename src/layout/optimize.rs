const ITERATION_LIMIT: usize = 128;

pub fn integer_snap(n: f64) -> f64 {
    n.floor()
}

pub fn identity_snap(n: f64) -> f64 {
    n
}

/// Bisection over a monotonically non-decreasing `response`: finds the
/// largest variable in `[min_var, max_var]` (after `snap`) whose response stays
/// within `upper_bound`.
///
/// Returns `None` if even `min_var` is out of bounds or the range is empty.
pub fn monotonic_hill_climb(
    mut response: impl FnMut(f64) -> f64,
    max_var: f64,
    upper_bound: f64,
    snap: impl Fn(f64) -> f64,
    min_var: f64,
) -> Option<f64> {
    let mut lo_var = snap(min_var);
    let mut hi_var = snap(max_var);
    if lo_var > hi_var {
        return None;
    }
    let lo_response = response(lo_var);
    if !(lo_response <= upper_bound) {
        return None;
    }
    let hi_response = response(hi_var);
    if hi_response <= upper_bound {
        return Some(hi_var);
    }

    let mut pivot_var = f64::NAN;
    let mut pivot_response = f64::NAN;
    let mut last_pivot_response = f64::NAN;
    let mut iterations = 0;
    while lo_var < hi_var && iterations < ITERATION_LIMIT {
        iterations += 1;
        let new_pivot_var = (lo_var + hi_var) / 2.0;
        let new_pivot_response = response(snap(new_pivot_var));
        // stop once the snapped pivot no longer changes, avoiding oscillation
        if new_pivot_response == pivot_response || new_pivot_response == last_pivot_response {
            return Some(snap(lo_var));
        }
        pivot_var = new_pivot_var;
        last_pivot_response = pivot_response;
        pivot_response = new_pivot_response;
        if pivot_response <= upper_bound {
            lo_var = pivot_var;
        } else {
            hi_var = pivot_var;
        }
    }
    if pivot_response <= upper_bound {
        Some(snap(pivot_var))
    } else {
        Some(snap(lo_var))
    }
}
