#![allow(clippy::float_cmp)]

use super::*;

const EPS: f64 = 1e-9;

#[test]
fn baseline_correction_one_inch_from_top_of_letter_page() {
    // One inch (72pt) below the top edge of a 792pt page.
    let top = 72.0 / 792.0 * 100.0;
    let p = to_absolute_points(FieldPosition::new(top, 0.0), 612.0, 792.0, 12.0).unwrap();
    assert!((p.y_pt - 709.8).abs() < 1e-9, "y = {}", p.y_pt);
    assert_eq!(p.x_pt, 0.0);
}

#[test]
fn baseline_correction_matches_formula_across_inputs() {
    for &(t, f, h) in &[(0.0, 10.0, 792.0), (12.5, 8.0, 842.0), (95.0, 24.0, 1008.0), (50.0, 0.0, 500.0)] {
        let p = to_absolute_points(FieldPosition::new(t, 0.0), 612.0, h, f).unwrap();
        let expected = h - (t / 100.0 * h) - 0.85 * f;
        assert!((p.y_pt - expected).abs() < EPS, "t={t} f={f} h={h}");
    }
}

#[test]
fn x_is_left_percent_of_width_without_rounding() {
    let p = to_absolute_points(FieldPosition::new(0.0, 33.3), 612.0, 792.0, 12.0).unwrap();
    assert!((p.x_pt - 203.796).abs() < EPS);
}

#[test]
fn zero_or_negative_page_is_rejected() {
    assert_eq!(
        to_absolute_points(FieldPosition::default(), 0.0, 792.0, 12.0),
        Err(GeometryError::NonPositivePage { width: 0.0, height: 792.0 })
    );
    assert!(PageSize::new(612.0, -1.0).is_err());
    assert!(matches!(PageSize::new(f64::NAN, 792.0), Err(GeometryError::NonFinite { .. })));
}

#[test]
fn to_position_inverts_to_absolute() {
    let page = PageSize::new(612.0, 792.0).unwrap();
    let original = FieldPosition::new(41.25, 17.5);
    let back = page.to_position(page.to_absolute(original, 11.0), 11.0);
    assert!((back.top - original.top).abs() < EPS);
    assert!((back.left - original.left).abs() < EPS);
}

#[test]
fn clamp_bounds_both_axes() {
    assert_eq!(clamp(FieldPosition::new(-3.0, 120.0)), FieldPosition::new(0.0, 95.0));
    assert_eq!(clamp(FieldPosition::new(95.0, 0.0)), FieldPosition::new(95.0, 0.0));
    assert_eq!(clamp(FieldPosition::new(f64::NAN, 50.0)), FieldPosition::new(0.0, 50.0));
    assert!(FieldPosition::new(95.1, 0.0).clamped().is_within_bounds());
    assert!(!FieldPosition::new(95.1, 0.0).is_within_bounds());
}

#[test]
fn pixel_delta_converts_against_container() {
    let c = ContainerSize::new(800.0, 1000.0);
    let (d_top, d_left) = c.pixel_delta_to_percent(80.0, 50.0).unwrap();
    assert!((d_top - 5.0).abs() < EPS);
    assert!((d_left - 10.0).abs() < EPS);
    let (dx, dy) = c.percent_delta_to_pixels(d_top, d_left);
    assert!((dx - 80.0).abs() < EPS);
    assert!((dy - 50.0).abs() < EPS);
}

#[test]
fn zero_sized_container_yields_no_delta() {
    assert!(ContainerSize::new(0.0, 1000.0).pixel_delta_to_percent(1.0, 1.0).is_none());
    assert!(ContainerSize::new(800.0, f64::INFINITY).pixel_delta_to_percent(1.0, 1.0).is_none());
}
