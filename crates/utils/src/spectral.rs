#![allow(clippy::needless_range_loop)]

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::FftPlanner;
use thiserror::Error;
use tracing::debug;

use crate::grid::{Channel, Channels, Grid, GridError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpectralError {
    #[error("unsupported dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, SpectralError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformOptions {
    /// Run the three channel transforms concurrently and join them.
    pub parallel: bool,
    /// Reject sizes that are not powers of two on either axis.
    pub require_power_of_two: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            require_power_of_two: false,
        }
    }
}

pub fn validate_dimensions(width: usize, height: usize, options: &TransformOptions) -> Result<()> {
    let unsupported = |reason| SpectralError::UnsupportedDimensions {
        width,
        height,
        reason,
    };

    if width == 0 || height == 0 {
        return Err(unsupported("width/height must be > 0"));
    }
    if width.checked_mul(height).is_none() {
        return Err(unsupported("image size overflow"));
    }
    if options.require_power_of_two && !(width.is_power_of_two() && height.is_power_of_two()) {
        return Err(unsupported("sides must be powers of two"));
    }
    Ok(())
}

/// Transforms all three channels, forward or inverse.
///
/// Every grid is checked before any work is dispatched. With
/// `options.parallel` the channels run as independent rayon tasks and this
/// call blocks until all of them finish; a failure in any channel drops the
/// whole set.
pub fn transform_channels(
    channels: Channels<Grid<Complex64>>,
    direction: Direction,
    options: &TransformOptions,
) -> Result<Channels<Grid<Complex64>>> {
    let (width, height) = channels[Channel::Red].dims();
    for grid in channels.values() {
        if grid.dims() != (width, height) {
            return Err(SpectralError::DimensionMismatch {
                expected: (width, height),
                found: grid.dims(),
            });
        }
    }
    validate_dimensions(width, height, options)?;

    let mut channels = channels;
    debug!(
        ?direction,
        width,
        height,
        parallel = options.parallel,
        "dispatching channel transforms"
    );

    if options.parallel {
        channels
            .as_mut_slice()
            .par_iter_mut()
            .try_for_each(|grid| fft2_grid(grid, direction))?;
    } else {
        for grid in channels.as_mut_slice() {
            fft2_grid(grid, direction)?;
        }
    }

    Ok(channels)
}

fn fft2_grid(grid: &mut Grid<Complex64>, direction: Direction) -> Result<()> {
    let (width, height) = grid.dims();
    fft2_in_place(grid.as_mut_slice(), width, height, direction)
}

/// Row-major 2D FFT. Forward is unnormalized; inverse scales by
/// `1 / (width * height)` so the pair round-trips exactly.
pub fn fft2_in_place(
    data: &mut [Complex64],
    width: usize,
    height: usize,
    direction: Direction,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SpectralError::UnsupportedDimensions {
            width,
            height,
            reason: "width/height must be > 0",
        });
    }

    let expected = width
        .checked_mul(height)
        .ok_or(GridError::SizeOverflow { width, height })?;
    if data.len() != expected {
        return Err(GridError::BufferLength {
            expected,
            actual: data.len(),
        }
        .into());
    }

    let inverse = direction == Direction::Inverse;
    let mut planner = FftPlanner::<f64>::new();
    let fft_w = if inverse {
        planner.plan_fft_inverse(width)
    } else {
        planner.plan_fft_forward(width)
    };

    for row in data.chunks_exact_mut(width) {
        fft_w.process(row);
    }

    let fft_h = if inverse {
        planner.plan_fft_inverse(height)
    } else {
        planner.plan_fft_forward(height)
    };

    let mut column = vec![Complex64::new(0.0, 0.0); height];
    for x in 0..width {
        for y in 0..height {
            column[y] = data[y * width + x];
        }

        fft_h.process(&mut column);

        for y in 0..height {
            data[y * width + x] = column[y];
        }
    }

    if inverse {
        let norm = (width * height) as f64;
        for v in data.iter_mut() {
            *v /= norm;
        }
    }

    Ok(())
}
