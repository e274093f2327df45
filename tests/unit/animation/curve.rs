use super::*;

#[test]
fn knee_belongs_to_lower_segment() {
    assert_eq!(speed(50.0, 30, 1.0), 20.0);
    assert_eq!(compute_interval_ms(50.0, 30, 1.0), 25);
}

#[test]
fn full_load_extended_doubles_knee_speed() {
    assert_eq!(speed(100.0, 30, 1.0), 40.0);
    assert_eq!(speed(100.0, 48, 2.0), 80.0);
    assert_eq!(compute_interval_ms(100.0, 30, 2.0), 6);
    assert_eq!(compute_interval_ms(100.0, 30, 1.0), 12);
}

#[test]
fn idle_yields_max_interval_for_every_preset() {
    for preset in RatePreset::ALL {
        assert_eq!(compute_interval_ms(0.0, 30, preset.rate()), MAX_INTERVAL_MS);
        assert_eq!(compute_interval_ms(0.0, 5, preset.rate()), MAX_INTERVAL_MS);
    }
}

#[test]
fn base_regime_divides_load_by_five() {
    assert_eq!(speed(50.0, 5, 1.0), 10.0);
    assert_eq!(compute_interval_ms(50.0, 5, 1.0), 50);
    assert_eq!(compute_interval_ms(100.0, 29, 1.0), 25);
    // speed below 1 is floored
    assert_eq!(speed(2.0, 5, 1.0), 1.0);
    assert_eq!(compute_interval_ms(2.0, 5, 1.0), 500);
}

#[test]
fn higher_rate_means_shorter_interval() {
    let slow = compute_interval_ms(80.0, 30, RatePreset::Fps10.rate());
    let fast = compute_interval_ms(80.0, 30, RatePreset::Fps40.rate());
    assert!(fast < slow);

    let slow = compute_interval_ms(80.0, 5, RatePreset::Fps10.rate());
    let fast = compute_interval_ms(80.0, 5, RatePreset::Fps40.rate());
    assert!(fast < slow);
}

#[test]
fn interval_is_monotonic_and_bounded() {
    for frames in [5usize, 14, 30, 60] {
        for rate in [0.25f32, 0.5, 0.75, 1.0, 2.0, 3.5] {
            let mut prev = u32::MAX;
            for step in 0..=1000 {
                let load = step as f32 / 10.0;
                let ms = compute_interval_ms(load, frames, rate);
                assert!(ms > 0 && ms <= MAX_INTERVAL_MS, "load={load} ms={ms}");
                assert!(ms <= prev, "frames={frames} rate={rate} load={load}");
                prev = ms;
            }
        }
    }
}

#[test]
fn degenerate_inputs_never_panic_or_zero() {
    assert_eq!(compute_interval_ms(f32::NAN, 30, 1.0), MAX_INTERVAL_MS);
    assert_eq!(compute_interval_ms(-20.0, 30, 1.0), MAX_INTERVAL_MS);
    assert_eq!(compute_interval_ms(250.0, 30, 1.0), 12);
    assert_eq!(compute_interval_ms(100.0, 30, 0.0), MAX_INTERVAL_MS);
    assert_eq!(compute_interval_ms(100.0, 30, -1.0), MAX_INTERVAL_MS);
    assert_eq!(compute_interval_ms(100.0, 30, 1e9), 1);
}

#[test]
fn preset_labels_round_trip() {
    for preset in RatePreset::ALL {
        assert_eq!(preset.label().parse::<RatePreset>().unwrap(), preset);
    }
    assert_eq!("30".parse::<RatePreset>().unwrap(), RatePreset::Fps30);
    assert_eq!(" 20FPS ".parse::<RatePreset>().unwrap(), RatePreset::Fps20);
    assert!("60fps".parse::<RatePreset>().is_err());
    assert_eq!(RatePreset::default(), RatePreset::Fps40);
}

#[test]
fn preset_serde_uses_labels() {
    let json = serde_json::to_string(&RatePreset::Fps20).unwrap();
    assert_eq!(json, "\"20fps\"");
    let back: RatePreset = serde_json::from_str("\"10fps\"").unwrap();
    assert_eq!(back, RatePreset::Fps10);
    assert!(serde_json::from_str::<RatePreset>("\"fast\"").is_err());
}
