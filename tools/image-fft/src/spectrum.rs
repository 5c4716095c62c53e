//! Channel sets of magnitude/phase grids and the forward/inverse passes that
//! produce and consume them.

use num_complex::Complex64;
use tracing::info;
use utils::spectral::{Direction, TransformOptions, transform_channels};
use utils::{Channel, Channels, Grid};

use crate::codec;
use crate::error::{Error, Result};

/// Magnitude and phase grids for R, G and B, all of one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralSet {
    magnitude: Channels<Grid<f64>>,
    phase: Channels<Grid<f64>>,
}

impl SpectralSet {
    pub fn new(magnitude: Channels<Grid<f64>>, phase: Channels<Grid<f64>>) -> Result<Self> {
        let expected = magnitude[Channel::Red].dims();
        for grid in magnitude.values().chain(phase.values()) {
            if grid.dims() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    found: grid.dims(),
                });
            }
        }
        Ok(Self { magnitude, phase })
    }

    pub fn width(&self) -> usize {
        self.magnitude[Channel::Red].width()
    }

    pub fn height(&self) -> usize {
        self.magnitude[Channel::Red].height()
    }

    pub fn magnitude(&self) -> &Channels<Grid<f64>> {
        &self.magnitude
    }

    pub fn phase(&self) -> &Channels<Grid<f64>> {
        &self.phase
    }

    /// The six grids in persisted order: R, G, B magnitude then R, G, B phase.
    pub fn grids(&self) -> [&Grid<f64>; 6] {
        let [mr, mg, mb] = self.magnitude.each_ref().into_array();
        let [pr, pg, pb] = self.phase.each_ref().into_array();
        [mr, mg, mb, pr, pg, pb]
    }
}

/// Raw forward coefficients for each channel, unnormalized.
pub fn coefficients(
    pixels: &Channels<Grid<u8>>,
    options: &TransformOptions,
) -> Result<Channels<Grid<Complex64>>> {
    let complex = pixels.each_ref().map(codec::to_complex);

    info!("running forward FFTs");
    let spectra = transform_channels(complex, Direction::Forward, options)?;
    info!("forward FFTs complete");
    Ok(spectra)
}

/// Forward-transforms three pixel grids into a spectral set.
pub fn forward(pixels: &Channels<Grid<u8>>, options: &TransformOptions) -> Result<SpectralSet> {
    let spectra = coefficients(pixels, options)?;
    let [r, g, b] = spectra.into_array().map(|grid| codec::decompose(&grid));
    SpectralSet::new(
        Channels::new(r.0, g.0, b.0),
        Channels::new(r.1, g.1, b.1),
    )
}

/// Polar-synthesizes each channel and runs the inverse transform. The real
/// parts are the reconstructed samples.
pub fn inverse(set: &SpectralSet, options: &TransformOptions) -> Result<Channels<Grid<Complex64>>> {
    let complex = Channels::from_fn(|c| codec::synthesize(&set.magnitude[c], &set.phase[c]))
        .try_map(|grid| grid)?;

    info!("running inverse FFTs");
    let samples = transform_channels(complex, Direction::Inverse, options)?;
    info!("inverse FFTs complete");
    Ok(samples)
}

pub fn reconstruct(set: &SpectralSet, options: &TransformOptions) -> Result<Channels<Grid<u8>>> {
    Ok(inverse(set, options)?.map(|grid| codec::to_pixel(&grid)))
}

/// The forward coefficients' real parts, truncated to bytes. No inverse runs,
/// so the DC term lands at pixel (0, 0) as the channel sum modulo 256.
pub fn spectral_view(
    pixels: &Channels<Grid<u8>>,
    options: &TransformOptions,
) -> Result<Channels<Grid<u8>>> {
    Ok(coefficients(pixels, options)?.map(|grid| codec::to_pixel(&grid)))
}
