use super::*;

#[test]
fn clamp_percent_bounds_and_nan() {
    assert_eq!(clamp_percent(-3.0), 0.0);
    assert_eq!(clamp_percent(42.5), 42.5);
    assert_eq!(clamp_percent(101.2), 100.0);
    assert_eq!(clamp_percent(f32::NAN), 0.0);
}

#[test]
fn percent_of_zero_whole_is_zero() {
    assert_eq!(percent_of(5, 0), 0.0);
    assert_eq!(percent_of(25, 100), 25.0);
    assert_eq!(percent_of(1, 4), 25.0);
}
