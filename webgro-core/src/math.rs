use glam::DVec2;
use std::f64::consts::PI;

/// Length of the vector (x, y).
pub fn length(x: f64, y: f64) -> f64 {
    DVec2::new(x, y).length()
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    DVec2::new(x1, y1).distance(DVec2::new(x2, y2))
}

/// Squared distance; skips the square root.
pub fn distance2(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    DVec2::new(x1, y1).distance_squared(DVec2::new(x2, y2))
}

/// Distance from point `p` to the segment `a`-`b`.
pub fn segment_distance(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let u = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * u)
}

/// Distance from (x3, y3) to the segment (x1, y1)-(x2, y2).
pub fn linedist(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> f64 {
    segment_distance(DVec2::new(x1, y1), DVec2::new(x2, y2), DVec2::new(x3, y3))
}

pub fn lerp(from: f64, to: f64, progress: f64) -> f64 {
    from + (to - from) * progress
}

pub fn dot(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    DVec2::new(x1, y1).dot(DVec2::new(x2, y2))
}

/// -1, 0 or 1.
pub fn sgn(a: f64) -> f64 {
    if a < 0.0 {
        -1.0
    } else if a > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Degrees to radians. Screen y grows downwards, so the sign flips to keep
/// positive angles anticlockwise on screen.
pub fn rad(d: f64) -> f64 {
    -d * PI / 180.0
}

/// Radians to degrees, with the same sign flip as [`rad`].
pub fn deg(r: f64) -> f64 {
    -r * 180.0 / PI
}

/// Heading from (x1, y1) towards (x2, y2) in degrees, in `[0, 360)`.
pub fn angle(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let a = deg((y2 - y1).atan2(x2 - x1));
    let a = if a < 0.0 { a + 360.0 } else { a };
    // -0.0 and rounding up to exactly 360
    if a >= 360.0 || a == 0.0 {
        0.0
    } else {
        a
    }
}

/// Signed difference `b - a` wrapped into `(-180, 180]`.
pub fn anglediff(a: f64, b: f64) -> f64 {
    let diff = (b - a).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Clamp `value` between two bounds given in either order.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    let (lo, hi) = if max > min { (min, max) } else { (max, min) };
    value.max(lo).min(hi)
}

/// Map `value` from `[min, max]` onto `[min2, max2]`.
pub fn scale(value: f64, min: f64, max: f64, min2: f64, max2: f64) -> f64 {
    min2 + ((value - min) / (max - min)) * (max2 - min2)
}

/// [`scale`], then clamp into the target range.
pub fn scaleclamp(value: f64, min: f64, max: f64, min2: f64, max2: f64) -> f64 {
    clamp(scale(value, min, max, min2, max2), min2, max2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    // ── length / distance ──

    #[test]
    fn test_length_and_distance() {
        assert!(approx_eq(length(3.0, 4.0), 5.0));
        assert!(approx_eq(distance(1.0, 1.0, 4.0, 5.0), 5.0));
        assert!(approx_eq(distance2(1.0, 1.0, 4.0, 5.0), 25.0));
        assert!(approx_eq(dot(1.0, 2.0, 3.0, 4.0), 11.0));
    }

    // ── linedist ──

    #[test]
    fn test_linedist_projects_onto_segment() {
        assert!(approx_eq(linedist(0.0, 0.0, 10.0, 0.0, 5.0, 3.0), 3.0));
    }

    #[test]
    fn test_linedist_clamps_to_endpoints() {
        assert!(approx_eq(linedist(0.0, 0.0, 10.0, 0.0, -3.0, 4.0), 5.0));
        assert!(approx_eq(linedist(0.0, 0.0, 10.0, 0.0, 13.0, 4.0), 5.0));
    }

    #[test]
    fn test_linedist_degenerate_segment() {
        assert!(approx_eq(linedist(1.0, 1.0, 1.0, 1.0, 4.0, 5.0), 5.0));
    }

    // ── angles ──

    #[test]
    fn test_rad_deg_flip_sign() {
        assert!(approx_eq(rad(180.0), -PI));
        assert!(approx_eq(deg(rad(37.0)), 37.0));
    }

    #[test]
    fn test_angle_is_anticlockwise_on_screen() {
        assert!(approx_eq(angle(0.0, 0.0, 1.0, 0.0), 0.0));
        // Up on screen is negative y.
        assert!(approx_eq(angle(0.0, 0.0, 0.0, -1.0), 90.0));
        assert!(approx_eq(angle(0.0, 0.0, -1.0, 0.0), 180.0));
        assert!(approx_eq(angle(0.0, 0.0, 0.0, 1.0), 270.0));
    }

    #[test]
    fn test_anglediff_wraps() {
        assert!(approx_eq(anglediff(10.0, 350.0), -20.0));
        assert!(approx_eq(anglediff(350.0, 10.0), 20.0));
        assert!(approx_eq(anglediff(0.0, 180.0), 180.0));
        assert!(approx_eq(anglediff(0.0, -180.0), 180.0));
        assert!(approx_eq(anglediff(0.0, 720.0), 0.0));
    }

    // ── clamp / scale ──

    #[test]
    fn test_clamp_either_order() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(5.0, 1.0, 0.0), 1.0);
        assert_eq!(clamp(-5.0, 1.0, 0.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_scale_and_scaleclamp() {
        assert!(approx_eq(scale(5.0, 0.0, 10.0, 100.0, 200.0), 150.0));
        assert!(approx_eq(scale(20.0, 0.0, 10.0, 0.0, 1.0), 2.0));
        assert!(approx_eq(scaleclamp(20.0, 0.0, 10.0, 0.0, 1.0), 1.0));
        assert!(approx_eq(scaleclamp(20.0, 0.0, 10.0, 1.0, 0.0), 0.0));
        assert!(approx_eq(scaleclamp(-5.0, 0.0, 10.0, 1.0, 0.0), 1.0));
    }

    #[test]
    fn test_lerp_and_sgn() {
        assert!(approx_eq(lerp(2.0, 4.0, 0.25), 2.5));
        assert_eq!(sgn(-3.0), -1.0);
        assert_eq!(sgn(0.0), 0.0);
        assert_eq!(sgn(0.1), 1.0);
    }
}
