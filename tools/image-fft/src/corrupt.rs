//! Randomized perturbation of serialized records, restricted to a band of
//! sample indices.

use rand::Rng;
use tracing::{debug, info};

use crate::config::{CorruptionConfig, CorruptionMode};
use crate::error::Result;
use crate::record::{GRID_COUNT, RecordLayout, read_f64, write_f64};

/// Sample indices `[min, max)` eligible for corruption, shared by all grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorruptionBand {
    pub min: usize,
    pub max: usize,
}

impl CorruptionBand {
    pub fn compute(sample_count: usize, config: &CorruptionConfig) -> Self {
        let at = |pct: f64| {
            let index = (pct * sample_count as f64 / 100.0).floor() as usize;
            index.min(sample_count)
        };
        let min = at(config.band_min_pct);
        let max = at(config.band_max_pct).max(min);
        Self { min, max }
    }

    pub fn len(&self) -> usize {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.min..self.max).contains(&index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorruptionReport {
    pub band: CorruptionBand,
    pub rounds: usize,
    /// Number of (grid, index) slots written, duplicates included.
    pub touched: usize,
}

pub fn corrupt(bytes: &mut [u8], config: &CorruptionConfig) -> Result<CorruptionReport> {
    corrupt_with_rng(bytes, config, &mut rand::rng())
}

/// Perturbs `bytes` in place. With `strength_pct == 0` nothing is written and
/// no randomness is drawn.
pub fn corrupt_with_rng<R: Rng>(
    bytes: &mut [u8],
    config: &CorruptionConfig,
    rng: &mut R,
) -> Result<CorruptionReport> {
    config.validate()?;
    let layout = RecordLayout::parse(bytes)?;
    let band = CorruptionBand::compute(layout.sample_count(), config);

    if !config.is_enabled() {
        debug!("corruption disabled");
        return Ok(CorruptionReport {
            band,
            rounds: 0,
            touched: 0,
        });
    }

    let rounds = (band.len() as f64 * config.strength_pct / 100.0).floor() as usize;
    let bound = i64::from(config.intensity);
    debug!(
        band_min = band.min,
        band_max = band.max,
        rounds,
        bound,
        mode = ?config.mode,
        "corruption band"
    );

    let mut touched = 0;
    for _ in 0..rounds {
        let index = rng.random_range(band.min..band.max);
        match config.mode {
            CorruptionMode::SingleGrid => {
                let grid = rng.random_range(0..GRID_COUNT);
                perturb(bytes, &layout, grid, index, bound, rng);
                touched += 1;
            }
            CorruptionMode::AllGrids => {
                for grid in 0..GRID_COUNT {
                    perturb(bytes, &layout, grid, index, bound, rng);
                    touched += 1;
                }
            }
        }
    }

    info!(rounds, touched, "corrupted record");
    Ok(CorruptionReport {
        band,
        rounds,
        touched,
    })
}

fn perturb<R: Rng>(
    bytes: &mut [u8],
    layout: &RecordLayout,
    grid: usize,
    index: usize,
    bound: i64,
    rng: &mut R,
) {
    let offset = layout.sample_offset(grid, index);
    let value = read_f64(bytes, offset);
    let delta = rng.random_range(-bound..=bound);
    write_f64(bytes, offset, value + delta as f64);
}
