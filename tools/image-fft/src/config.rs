//! Immutable settings handed to every operation.
//!
//! Defaults reproduce the stock behavior: 40-60% corruption band, strength 0
//! (corruption off), intensity 64, parallel channel transforms, reflected
//! low log values.

use utils::spectral::TransformOptions;

use crate::error::{Error, Result};

/// Largest accepted corruption offset.
pub const MAX_INTENSITY: u32 = 1 << 24;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub transform: TransformOptions,
    pub corruption: CorruptionConfig,
    pub visualize: VisualizeConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.corruption.validate()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorruptionMode {
    /// Each round perturbs one randomly chosen grid.
    #[default]
    SingleGrid,
    /// Each round perturbs the picked index in all six grids.
    AllGrids,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorruptionConfig {
    /// Start of the band, percent of the per-grid sample count.
    pub band_min_pct: f64,
    /// End of the band (exclusive), percent of the per-grid sample count.
    pub band_max_pct: f64,
    /// Rounds per band sample, in percent. 0 disables corruption.
    pub strength_pct: f64,
    /// Offsets are drawn from `[-intensity, intensity]`.
    pub intensity: u32,
    pub mode: CorruptionMode,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self {
            band_min_pct: 40.0,
            band_max_pct: 60.0,
            strength_pct: 0.0,
            intensity: 64,
            mode: CorruptionMode::SingleGrid,
        }
    }
}

impl CorruptionConfig {
    pub fn is_enabled(&self) -> bool {
        self.strength_pct > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        check_percent("band_min_pct", self.band_min_pct)?;
        check_percent("band_max_pct", self.band_max_pct)?;
        check_percent("strength_pct", self.strength_pct)?;
        if self.band_min_pct > self.band_max_pct {
            return Err(Error::InvalidConfig(format!(
                "band_min_pct ({}) exceeds band_max_pct ({})",
                self.band_min_pct, self.band_max_pct
            )));
        }
        if self.intensity > MAX_INTENSITY {
            return Err(Error::InvalidConfig(format!(
                "intensity {} exceeds {MAX_INTENSITY}",
                self.intensity
            )));
        }
        Ok(())
    }
}

fn check_percent(name: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(Error::InvalidConfig(format!(
            "{name} must be within 0..=100, got {value}"
        )));
    }
    Ok(())
}

/// What to do with a negative log level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LowPolicy {
    /// Use the absolute value, keeping near-zero values visible.
    #[default]
    Reflect,
    /// Clamp to level 0 and warn.
    Clamp,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualizeConfig {
    pub low_policy: LowPolicy,
}
