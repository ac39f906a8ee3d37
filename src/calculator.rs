use crate::error::{EstabError, Result};
use crate::models::EnrichedRecord;

/// Normalization constants for the derived-time calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// K in `item_value * avg_time_factor / K`.
    pub time_factor_divisor: f64,
    /// Minutes in one staff working day.
    pub shift_minutes: f64,
}

impl PipelineConfig {
    pub fn new(time_factor_divisor: f64, shift_minutes: f64) -> Result<Self> {
        for (name, value) in [
            ("time_factor_divisor", time_factor_divisor),
            ("shift_minutes", shift_minutes),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EstabError::Settings(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(Self {
            time_factor_divisor,
            shift_minutes,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_factor_divisor: 1500.0,
            shift_minutes: 240.0,
        }
    }
}

pub fn derived_time(item_value: Option<f64>, factor: Option<f64>, divisor: f64) -> Option<f64> {
    Some(item_value? * factor? / divisor)
}

pub fn apply_derived_time(records: &mut [EnrichedRecord], config: &PipelineConfig) {
    for r in records.iter_mut() {
        r.derived_time = derived_time(r.record.item_value, r.avg_time_factor, config.time_factor_divisor);
    }
}

/// Sum of known derived times over the shift length. Records without a
/// derived time do not contribute.
pub fn establishment_strength(records: &[EnrichedRecord], shift_minutes: f64) -> f64 {
    let total: f64 = records.iter().filter_map(|r| r.derived_time).sum();
    total / shift_minutes
}

pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}
