use serde::{Deserialize, Serialize};

/// Ambient baseline temperature. Brewing cannot complete at or below it.
pub const ROOM_TEMPERATURE: f64 = 20.0;

/// Degrees outside the recipe band at which temperature match reaches zero.
pub const TEMPERATURE_ACCURACY_RATIO: f64 = 10.0;

/// Quality floor used when computing the output's starting spoilage.
pub const MIN_QUALITY: f64 = 0.25;

/// Tolerance for comparing normalized ingredient quantities.
pub const QUANTITY_TOLERANCE: f64 = 1e-4;

/// Tunables shared by every station. Loaded from a data file by
/// `steep-data`; every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewSettings {
    pub room_temperature: f64,
    pub accuracy_ratio: f64,
    pub min_quality: f64,
    pub quantity_tolerance: f64,
    /// Degrees per second a hot liquid loses while idle.
    pub passive_cool_per_second: f64,
    pub liquid_capacity_litres: f64,
    pub solid_max_stack: u32,
}

impl Default for BrewSettings {
    fn default() -> Self {
        Self {
            room_temperature: ROOM_TEMPERATURE,
            accuracy_ratio: TEMPERATURE_ACCURACY_RATIO,
            min_quality: MIN_QUALITY,
            quantity_tolerance: QUANTITY_TOLERANCE,
            passive_cool_per_second: 0.1,
            liquid_capacity_litres: 2.0,
            solid_max_stack: 2,
        }
    }
}
