//! Conversions between pixel, complex and magnitude/phase grids.

use num_complex::Complex64;
use utils::Grid;

use crate::error::{Error, Result};

pub fn to_complex(pixels: &Grid<u8>) -> Grid<Complex64> {
    pixels.map(|&p| Complex64::new(p as f64, 0.0))
}

/// Splits a complex grid into magnitude and phase (atan2) grids.
pub fn decompose(spectrum: &Grid<Complex64>) -> (Grid<f64>, Grid<f64>) {
    (spectrum.map(|c| c.norm()), spectrum.map(|c| c.arg()))
}

/// Polar to rectangular: `m·cos(p) + i·m·sin(p)`.
pub fn synthesize(magnitude: &Grid<f64>, phase: &Grid<f64>) -> Result<Grid<Complex64>> {
    if magnitude.dims() != phase.dims() {
        return Err(Error::DimensionMismatch {
            expected: magnitude.dims(),
            found: phase.dims(),
        });
    }
    let data = magnitude
        .as_slice()
        .iter()
        .zip(phase.as_slice())
        .map(|(&m, &p)| Complex64::from_polar(m, p))
        .collect();
    Ok(Grid::from_vec(magnitude.width(), magnitude.height(), data)?)
}

pub fn to_pixel(samples: &Grid<Complex64>) -> Grid<u8> {
    samples.map(|c| truncate_to_u8(c.re))
}

/// Truncates toward zero, saturates into `i64` (NaN becomes 0), then keeps
/// the low byte. 255.9 → 255, 256.0 → 0, -1.0 → 255.
pub fn truncate_to_u8(value: f64) -> u8 {
    (value.trunc() as i64) as u8
}
