//! Named working directories and the operations run against them.
//!
//! For a name `n` under root `r`, the source image is `r/n.png` and every
//! generated file lives in `r/n/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::info;

use crate::config::Config;
use crate::corrupt::{CorruptionReport, corrupt_with_rng};
use crate::error::{Error, Result};
use crate::image_io;
use crate::record;
use crate::spectrum::{self, SpectralSet};
use crate::visualize::{self, Analysis};

pub const RECORD_FILE: &str = "data.bytes";
pub const OUTPUT_FILE: &str = "output.png";
pub const MAGNITUDE_ANALYSIS_FILE: &str = "analysis_Mag.png";
pub const PHASE_ANALYSIS_FILE: &str = "analysis_Pha.png";

/// Where the spectral data for an analysis comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// Forward-transform the source image.
    Image,
    /// Load the persisted record.
    Record,
}

#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
    name: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_path(&self) -> PathBuf {
        self.root.join(format!("{}.png", self.name))
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    pub fn record_path(&self) -> PathBuf {
        self.dir().join(RECORD_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir().join(OUTPUT_FILE)
    }

    pub fn magnitude_analysis_path(&self) -> PathBuf {
        self.dir().join(MAGNITUDE_ANALYSIS_FILE)
    }

    pub fn phase_analysis_path(&self) -> PathBuf {
        self.dir().join(PHASE_ANALYSIS_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))
    }

    fn load_spectrum(&self, config: &Config) -> Result<SpectralSet> {
        let pixels = image_io::load_pixels(&self.image_path())?;
        spectrum::forward(&pixels, &config.transform)
    }
}

/// Image → forward FFT → `data.bytes`.
pub fn encode(workspace: &Workspace, config: &Config) -> Result<SpectralSet> {
    config.validate()?;
    let set = workspace.load_spectrum(config)?;
    let bytes = record::serialize(&set)?;

    workspace.ensure_dir()?;
    write_record(&workspace.record_path(), &bytes)?;
    Ok(set)
}

/// `data.bytes` → optional corruption → inverse FFT → `output.png`.
pub fn decode(workspace: &Workspace, config: &Config) -> Result<Option<CorruptionReport>> {
    decode_with_rng(workspace, config, &mut rand::rng())
}

pub fn decode_with_rng<R: Rng>(
    workspace: &Workspace,
    config: &Config,
    rng: &mut R,
) -> Result<Option<CorruptionReport>> {
    config.validate()?;
    let mut bytes = read_record(&workspace.record_path())?;

    let report = if config.corruption.is_enabled() {
        info!("corrupting");
        Some(corrupt_with_rng(&mut bytes, &config.corruption, rng)?)
    } else {
        None
    };

    let set = record::deserialize(&bytes)?;
    let pixels = spectrum::reconstruct(&set, &config.transform)?;

    workspace.ensure_dir()?;
    image_io::save_pixels(&workspace.output_path(), &pixels)?;
    Ok(report)
}

/// Renders `analysis_Mag.png` and `analysis_Pha.png`.
pub fn analyze(workspace: &Workspace, source: Source, config: &Config) -> Result<Analysis> {
    config.validate()?;
    let set = match source {
        Source::Image => workspace.load_spectrum(config)?,
        Source::Record => record::deserialize(&read_record(&workspace.record_path())?)?,
    };
    let analysis = visualize::render(&set, &config.visualize)?;

    workspace.ensure_dir()?;
    image_io::save_rgb(&workspace.magnitude_analysis_path(), &analysis.magnitude)?;
    image_io::save_rgb(&workspace.phase_analysis_path(), &analysis.phase)?;
    Ok(analysis)
}

/// Image → forward FFT → real parts as bytes → `output.png`.
pub fn preview(workspace: &Workspace, config: &Config) -> Result<()> {
    config.validate()?;
    let pixels = image_io::load_pixels(&workspace.image_path())?;
    let view = spectrum::spectral_view(&pixels, &config.transform)?;

    workspace.ensure_dir()?;
    image_io::save_pixels(&workspace.output_path(), &view)
}

/// Image → forward → inverse → `output.png`, without touching the record.
pub fn roundtrip(workspace: &Workspace, config: &Config) -> Result<()> {
    config.validate()?;
    let set = workspace.load_spectrum(config)?;
    let pixels = spectrum::reconstruct(&set, &config.transform)?;

    workspace.ensure_dir()?;
    image_io::save_pixels(&workspace.output_path(), &pixels)
}

pub fn read_record(path: &Path) -> Result<Vec<u8>> {
    info!(path = %path.display(), "loading record");
    fs::read(path).map_err(|source| io_error(path, source))
}

pub fn write_record(path: &Path, bytes: &[u8]) -> Result<()> {
    info!(path = %path.display(), len = bytes.len(), "saving record");
    fs::write(path, bytes).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
