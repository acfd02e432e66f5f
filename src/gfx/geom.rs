// Angles are in degrees, measured clockwise from the 12 o'clock position.

pub const FACE_CENTER: f32 = 100.0;

pub fn polar_point(cx: f32, cy: f32, radius: f32, angle_deg: f32) -> (f32, f32) {
    // -90 so that 0 degrees points at 12 o'clock
    let rad = (angle_deg - 90.0).to_radians();
    (cx + radius * rad.cos(), cy + radius * rad.sin())
}

pub fn rotation_about(angle_deg: f32, cx: f32, cy: f32) -> String {
    format!("rotate({angle_deg:.1} {cx} {cy})")
}

/// Arc on a fixed-radius circle, swept clockwise from `start_deg` to `end_deg`.
pub fn ring_segment_path(cx: f32, cy: f32, radius: f32, start_deg: f32, end_deg: f32) -> String {
    let (sx, sy) = polar_point(cx, cy, radius, start_deg);
    let (ex, ey) = polar_point(cx, cy, radius, end_deg);

    let span = (end_deg - start_deg).abs();
    let large_arc = if span > 180.0 { 1 } else { 0 };

    format!("M {sx:.3} {sy:.3} A {radius:.0} {radius:.0} 0 {large_arc} 1 {ex:.3} {ey:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_cardinal_points() {
        let (x, y) = polar_point(100.0, 100.0, 78.0, 0.0);
        assert!((x - 100.0).abs() < 0.001 && (y - 22.0).abs() < 0.001);

        let (x, y) = polar_point(100.0, 100.0, 78.0, 90.0);
        assert!((x - 178.0).abs() < 0.001 && (y - 100.0).abs() < 0.001);

        let (x, y) = polar_point(100.0, 100.0, 78.0, 180.0);
        assert!((x - 100.0).abs() < 0.001 && (y - 178.0).abs() < 0.001);

        let (x, y) = polar_point(100.0, 100.0, 78.0, 270.0);
        assert!((x - 22.0).abs() < 0.001 && (y - 100.0).abs() < 0.001);
    }

    #[test]
    fn rotation_transform_format() {
        assert_eq!(rotation_about(32.5, 100.0, 100.0), "rotate(32.5 100 100)");
        assert_eq!(rotation_about(180.0, 100.0, 100.0), "rotate(180.0 100 100)");
    }

    #[test]
    fn ring_path_small_arc() {
        let path = ring_segment_path(100.0, 100.0, 78.0, 0.0, 120.0);
        assert_eq!(path, "M 100.000 22.000 A 78 78 0 0 1 167.550 139.000");
    }

    #[test]
    fn large_arc_flag_set_above_half_circle() {
        let exactly_half = ring_segment_path(100.0, 100.0, 78.0, 0.0, 180.0);
        assert!(exactly_half.contains(" 0 0 1 "));

        let over_half = ring_segment_path(100.0, 100.0, 78.0, 0.0, 181.0);
        assert!(over_half.contains(" 0 1 1 "));
    }
}
