//! Rotated bounding box math
//!
//! A `w × h` image rotated by θ occupies an axis-aligned box of
//! `|w cos θ| + |h sin θ|` by `|w sin θ| + |h cos θ|`.

/// Bounding box of an image rotated by `angle_deg`.
pub fn bounding_size_from_image(image_w: f64, image_h: f64, angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let rotated_w = (image_w * cos).abs() + (image_h * sin).abs();
    let rotated_h = (image_w * sin).abs() + (image_h * cos).abs();
    (rotated_w, rotated_h)
}

/// Image size with aspect `image_w / image_h` whose rotation by `angle_deg`
/// fills a `grid_w × grid_h` box.
///
/// Image height is solved once from the width equation and once from the
/// height equation and the two are averaged. They agree exactly at multiples
/// of 90° and drift apart only when the box does not have the matching aspect.
pub fn image_size_from_bounding(
    grid_w: f64,
    grid_h: f64,
    angle_deg: f64,
    aspect: f64,
) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    let abs_cos = rad.cos().abs();
    let abs_sin = rad.sin().abs();

    let h_from_grid_w = grid_w / (abs_cos * aspect + abs_sin);
    let h_from_grid_h = grid_h / (abs_sin * aspect + abs_cos);

    let image_h = (h_from_grid_w + h_from_grid_h) / 2.0;
    (aspect * image_h, image_h)
}

/// True when `degrees` is a multiple of 90 within a ratio tolerance of 0.001.
pub fn is_multiple_of_90(degrees: f64) -> bool {
    let ratio = degrees / 90.0;
    (ratio - ratio.round()).abs() < 0.001
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    #[test]
    fn zero_angle_is_identity() {
        assert!(close(bounding_size_from_image(400.0, 300.0, 0.0), (400.0, 300.0)));
    }

    #[test]
    fn quarter_turn_swaps_sides() {
        assert!(close(bounding_size_from_image(400.0, 300.0, 90.0), (300.0, 400.0)));
        assert!(close(bounding_size_from_image(400.0, 300.0, -270.0), (300.0, 400.0)));
    }

    #[test]
    fn forty_five_degrees() {
        let (w, h) = bounding_size_from_image(100.0, 100.0, 45.0);
        let expected = 2.0 * 100.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((w - expected).abs() < EPS);
        assert!((h - expected).abs() < EPS);
    }

    #[test]
    fn round_trip_at_multiples_of_90() {
        let (w, h) = (640.0, 360.0);
        for k in -4..=8 {
            let angle = 90.0 * k as f64;
            let (gw, gh) = bounding_size_from_image(w, h, angle);
            let back = image_size_from_bounding(gw, gh, angle, w / h);
            assert!(close(back, (w, h)), "angle {angle}: {back:?}");
        }
    }

    #[test]
    fn symmetric_under_half_turn() {
        for step in 0..72 {
            let angle = step as f64 * 5.0 + 0.3;
            let a = bounding_size_from_image(320.0, 200.0, angle);
            let b = bounding_size_from_image(320.0, 200.0, angle + 180.0);
            assert!(close(a, b), "angle {angle}");
        }
    }

    #[test]
    fn inverse_recovers_size_at_arbitrary_angle() {
        let (gw, gh) = bounding_size_from_image(400.0, 300.0, 33.0);
        let (w, h) = image_size_from_bounding(gw, gh, 33.0, 4.0 / 3.0);
        assert!((w - 400.0).abs() < 1e-6);
        assert!((h - 300.0).abs() < 1e-6);
    }

    #[test]
    fn inconsistent_box_is_averaged() {
        // 400x400 box at 0° for a 4:3 image: 300 from width, 400 from height.
        let (w, h) = image_size_from_bounding(400.0, 400.0, 0.0, 4.0 / 3.0);
        assert!((h - 350.0).abs() < EPS);
        assert!((w - 350.0 * 4.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn multiple_of_90_detection() {
        assert!(is_multiple_of_90(0.0));
        assert!(is_multiple_of_90(-180.0));
        assert!(is_multiple_of_90(270.05));
        assert!(!is_multiple_of_90(30.0));
        assert!(!is_multiple_of_90(90.5));
    }
}
