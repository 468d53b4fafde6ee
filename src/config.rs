// Engine configuration: named constants plus a tunable config struct

use serde::Deserialize;

// A day counts as "low" when its minimum price is within this many currency
// units of the window minimum. Additive, not a percentage.
pub const LOW_PRICE_THRESHOLD: i64 = 12;

// UI ceiling on the quantity of a single room type, independent of stock
pub const MAX_SELECTABLE_PER_TYPE: u32 = 9;

pub const MIN_WINDOW_DAYS: i64 = 7;
pub const MAX_WINDOW_DAYS: i64 = 365;
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub low_price_threshold: i64,
    pub max_selectable_per_type: u32,
    pub min_window_days: i64,
    pub max_window_days: i64,
    pub default_window_days: i64,
    pub fetch_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_price_threshold: LOW_PRICE_THRESHOLD,
            max_selectable_per_type: MAX_SELECTABLE_PER_TYPE,
            min_window_days: MIN_WINDOW_DAYS,
            max_window_days: MAX_WINDOW_DAYS,
            default_window_days: DEFAULT_WINDOW_DAYS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    // Clamp a requested window length into the configured bounds. With
    // inverted bounds the maximum wins.
    pub fn window_days(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_window_days)
            .max(self.min_window_days)
            .min(self.max_window_days)
    }
}
