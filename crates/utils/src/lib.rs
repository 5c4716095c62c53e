pub mod grid;

#[cfg(feature = "spectral")]
pub mod spectral;

pub use grid::{Channel, Channels, Grid, GridError};
