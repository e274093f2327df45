/// Upper bound of every percentage value handled by the crate.
pub const PERCENT_MAX: f32 = 100.0;

/// Clamp a raw percentage reading into `[0, 100]`.
///
/// Counter sources occasionally report slightly negative or >100 values around counter resets;
/// NaN maps to `0`.
pub fn clamp_percent(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, PERCENT_MAX)
}

/// Ratio of `part` to `whole` as a percentage, `0` when `whole` is zero.
pub(crate) fn percent_of(part: u64, whole: u64) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * f64::from(PERCENT_MAX)) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
