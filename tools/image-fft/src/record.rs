//! Flat binary record for a [`SpectralSet`].
//!
//! Layout (little-endian):
//!
//! ```text
//! 0      i32 width
//! 4      i32 height
//! 8      R magnitude   width*height f64, x outer / y inner
//! 8+N    G magnitude
//! 8+2N   B magnitude
//! 8+3N   R phase
//! 8+4N   G phase
//! 8+5N   B phase        (N = width*height*8)
//! ```

use tracing::warn;
use utils::{Channels, Grid};

use crate::error::{Error, Result};
use crate::spectrum::SpectralSet;

pub const HEADER_LEN: usize = 8;
pub const SAMPLE_LEN: usize = 8;
pub const GRID_COUNT: usize = 6;

/// Dimensions of a record and the byte offsets derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    width: usize,
    height: usize,
    grid_len: usize,
}

impl RecordLayout {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let unsupported = |reason| Error::UnsupportedDimensions {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(unsupported("width/height must be > 0"));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(unsupported("width/height exceed the i32 record header"));
        }
        let grid_len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(SAMPLE_LEN));
        let total = grid_len
            .and_then(|n| n.checked_mul(GRID_COUNT))
            .and_then(|n| n.checked_add(HEADER_LEN));
        let (Some(grid_len), Some(_)) = (grid_len, total) else {
            return Err(unsupported("record size overflow"));
        };
        Ok(Self {
            width,
            height,
            grid_len,
        })
    }

    /// Reads and checks the header of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::TruncatedBuffer {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let width = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let height = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidHeader { width, height });
        }

        let layout = Self::new(width as usize, height as usize)
            .map_err(|_| Error::InvalidHeader { width, height })?;
        let expected = layout.total_len();
        if bytes.len() < expected {
            return Err(Error::TruncatedBuffer {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            warn!(
                expected,
                actual = bytes.len(),
                "ignoring trailing bytes after record"
            );
        }
        Ok(layout)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per grid.
    pub fn sample_count(&self) -> usize {
        self.width * self.height
    }

    /// Bytes per grid.
    pub fn grid_len(&self) -> usize {
        self.grid_len
    }

    pub fn total_len(&self) -> usize {
        HEADER_LEN + GRID_COUNT * self.grid_len
    }

    pub fn grid_offset(&self, grid: usize) -> usize {
        HEADER_LEN + grid * self.grid_len
    }

    /// Byte offset of sample `index` (stream order) within `grid`.
    pub fn sample_offset(&self, grid: usize, index: usize) -> usize {
        self.grid_offset(grid) + index * SAMPLE_LEN
    }

    /// Stream index of cell `(x, y)`; x is the outer loop.
    pub fn stream_index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }
}

pub fn serialize(set: &SpectralSet) -> Result<Vec<u8>> {
    let layout = RecordLayout::new(set.width(), set.height())?;
    let mut bytes = Vec::with_capacity(layout.total_len());
    bytes.extend_from_slice(&(layout.width as i32).to_le_bytes());
    bytes.extend_from_slice(&(layout.height as i32).to_le_bytes());

    for grid in set.grids() {
        for x in 0..layout.width {
            for y in 0..layout.height {
                bytes.extend_from_slice(&grid[(x, y)].to_le_bytes());
            }
        }
    }

    debug_assert_eq!(bytes.len(), layout.total_len());
    Ok(bytes)
}

pub fn deserialize(bytes: &[u8]) -> Result<SpectralSet> {
    let layout = RecordLayout::parse(bytes)?;
    let [mr, mg, mb, pr, pg, pb] = [0, 1, 2, 3, 4, 5].map(|grid| read_grid(bytes, &layout, grid));
    SpectralSet::new(Channels::new(mr, mg, mb), Channels::new(pr, pg, pb))
}

fn read_grid(bytes: &[u8], layout: &RecordLayout, grid: usize) -> Grid<f64> {
    let mut out = Grid::filled(layout.width, layout.height, 0.0);
    let mut offset = layout.grid_offset(grid);
    for x in 0..layout.width {
        for y in 0..layout.height {
            out[(x, y)] = read_f64(bytes, offset);
            offset += SAMPLE_LEN;
        }
    }
    out
}

pub(crate) fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; SAMPLE_LEN];
    raw.copy_from_slice(&bytes[offset..offset + SAMPLE_LEN]);
    f64::from_le_bytes(raw)
}

pub(crate) fn write_f64(bytes: &mut [u8], offset: usize, value: f64) {
    bytes[offset..offset + SAMPLE_LEN].copy_from_slice(&value.to_le_bytes());
}
