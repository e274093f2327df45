use super::*;

fn raw(user: f32, kernel: f32, idle: f32) -> RawLoad {
    RawLoad { user, kernel, idle }
}

#[test]
fn from_raw_clamps_each_field_and_derives_total() {
    let s = LoadSample::from_raw(raw(120.0, -4.0, 30.0));
    assert_eq!(s.user, 100.0);
    assert_eq!(s.kernel, 0.0);
    assert_eq!(s.idle, 30.0);
    assert_eq!(s.total, 70.0);

    let s = LoadSample::from_raw(raw(0.0, 0.0, -1.0));
    assert_eq!(s.idle, 0.0);
    assert_eq!(s.total, 100.0);
}

#[test]
fn degraded_sample_is_fully_idle() {
    let s = LoadSample::degraded();
    assert_eq!(
        (s.total, s.user, s.kernel, s.idle),
        (0.0, 0.0, 0.0, 100.0)
    );
}

#[test]
fn description_names_the_instance() {
    let s = LoadSample::from_raw(raw(10.0, 2.5, 87.5));
    assert_eq!(s.description(&CpuInstance::Total), "CPU: 12.5%");
    assert_eq!(
        s.description(&CpuInstance::Core("3".to_string())),
        "CPU 3: 12.5%"
    );
}

#[test]
fn indicator_lines_have_one_decimal() {
    let s = LoadSample::from_raw(raw(10.0, 2.5, 87.5));
    assert_eq!(
        s.indicator_lines(),
        vec![
            "CPU: 12.5%".to_string(),
            "   ├─ User: 10.0%".to_string(),
            "   ├─ Kernel: 2.5%".to_string(),
            "   └─ Available: 87.5%".to_string(),
        ]
    );
}

#[test]
fn history_evicts_oldest_past_capacity() {
    let mut h = SampleHistory::new(5);
    for i in 0..6 {
        h.push(LoadSample::from_raw(raw(0.0, 0.0, i as f32)));
    }
    assert_eq!(h.len(), 5);
    let idles: Vec<f32> = h.iter().map(|s| s.idle).collect();
    assert_eq!(idles, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(h.latest().unwrap().idle, 5.0);
}

#[test]
fn history_zero_capacity_keeps_one() {
    let mut h = SampleHistory::new(0);
    assert_eq!(h.capacity(), 1);
    h.push(LoadSample::degraded());
    h.push(LoadSample::default());
    assert_eq!(h.len(), 1);
    assert_eq!(h.latest(), Some(LoadSample::default()));
}
