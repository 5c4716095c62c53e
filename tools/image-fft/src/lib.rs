//! Stores RGB images as per-channel FFT magnitude/phase records, rebuilds
//! images from them, and renders log-scale analyses of the spectra.

pub mod codec;
pub mod config;
pub mod corrupt;
pub mod error;
pub mod image_io;
pub mod record;
pub mod spectrum;
pub mod visualize;
pub mod workspace;

pub use config::{Config, CorruptionConfig, CorruptionMode, LowPolicy, VisualizeConfig};
pub use error::{Error, Result};
pub use spectrum::SpectralSet;
pub use utils::spectral::TransformOptions;
pub use workspace::{Source, Workspace};
