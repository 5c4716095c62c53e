//! Log-scale analysis images of magnitude and phase.
//!
//! Every cell of every channel is plotted as a single point in its column:
//! the value is mapped through a log whose base is chosen so the largest value
//! in the set reaches the top row and the (offset) smallest reaches the
//! bottom. Channels are written additively, so coinciding R/G/B points blend.

use image::RgbImage;
use tracing::{debug, warn};
use utils::{Channel, Grid};

use crate::config::{LowPolicy, VisualizeConfig};
use crate::error::{Error, Result};
use crate::spectrum::SpectralSet;

pub struct Analysis {
    pub magnitude: RgbImage,
    pub phase: RgbImage,
    /// Out-of-range or non-finite mappings that were reported and tolerated.
    pub warnings: usize,
}

/// `log_base(value + offset)` with `base = max^(1 / (height - 1))`.
#[derive(Clone, Copy, Debug)]
pub struct LogScale {
    max: f64,
    ln_max: f64,
    steps: f64,
    offset: f64,
}

impl LogScale {
    pub fn new(max: f64, offset: f64, height: usize) -> Result<Self> {
        if height <= 1 {
            return Err(Error::DegenerateLogDomain {
                reason: "height must be greater than 1",
            });
        }
        let ln_max = max.ln();
        if !ln_max.is_finite() || ln_max == 0.0 {
            return Err(Error::DegenerateLogDomain {
                reason: "field maximum gives no usable log base",
            });
        }
        Ok(Self {
            max,
            ln_max,
            steps: (height - 1) as f64,
            offset,
        })
    }

    pub fn base(&self) -> f64 {
        self.max.powf(1.0 / self.steps)
    }

    /// Evaluated as `ln(v) / ln(max) * (height - 1)` so that `max` lands
    /// exactly on the top level.
    pub fn level(&self, value: f64) -> f64 {
        (value + self.offset).ln() / self.ln_max * self.steps
    }
}

pub fn render(set: &SpectralSet, config: &VisualizeConfig) -> Result<Analysis> {
    let (width, height) = (set.width(), set.height());
    let (Ok(img_w), Ok(img_h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(Error::UnsupportedDimensions {
            width,
            height,
            reason: "image side exceeds u32",
        });
    };

    let mag_max = fold(set.magnitude().values(), f64::NEG_INFINITY, f64::max);
    let phase_offset = -fold(set.phase().values(), f64::INFINITY, f64::min) + 1.0;
    let pha_max = fold(set.phase().values(), f64::NEG_INFINITY, f64::max) + phase_offset;

    let mag_scale = LogScale::new(mag_max, 1.0, height)?;
    let pha_scale = LogScale::new(pha_max, phase_offset, height)?;
    debug!(
        mag_max,
        mag_base = mag_scale.base(),
        pha_max,
        phase_offset,
        pha_base = pha_scale.base(),
        "log scales"
    );

    let mut magnitude = RgbImage::new(img_w, img_h);
    let mut phase = RgbImage::new(img_w, img_h);
    let mut rows = RowMapper {
        height: height as i64,
        policy: config.low_policy,
        warnings: 0,
    };

    for x in 0..width {
        for y in 0..height {
            for c in Channel::ALL {
                let level = mag_scale.level(set.magnitude()[c][(x, y)]);
                if let Some(row) = rows.place("magnitude", level) {
                    mark(&mut magnitude, x, row, c);
                }

                let level = pha_scale.level(set.phase()[c][(x, y)]);
                if let Some(row) = rows.place("phase", level) {
                    mark(&mut phase, x, row, c);
                }
            }
        }
    }

    if rows.warnings > 0 {
        warn!(warnings = rows.warnings, "analysis rendered with out-of-range values");
    }
    Ok(Analysis {
        magnitude,
        phase,
        warnings: rows.warnings,
    })
}

fn fold<'a>(
    grids: impl Iterator<Item = &'a Grid<f64>>,
    init: f64,
    f: fn(f64, f64) -> f64,
) -> f64 {
    grids.flat_map(|g| g.as_slice().iter().copied()).fold(init, f)
}

/// Sets one channel of a pixel, keeping the other two.
fn mark(image: &mut RgbImage, x: usize, row: usize, channel: Channel) {
    let pixel = image.get_pixel_mut(x as u32, row as u32);
    pixel.0[channel.index()] = 255;
}

struct RowMapper {
    height: i64,
    policy: LowPolicy,
    warnings: usize,
}

impl RowMapper {
    /// Image row for a log level, or `None` when it falls outside the image.
    fn place(&mut self, field: &'static str, level: f64) -> Option<usize> {
        let mut scaled = if level.is_finite() {
            level.floor() as i64
        } else {
            self.warnings += 1;
            warn!(field, level, "non-finite log level, plotting at the bottom");
            0
        };

        if scaled < 0 {
            match self.policy {
                LowPolicy::Reflect => scaled = scaled.saturating_abs(),
                LowPolicy::Clamp => {
                    self.warnings += 1;
                    warn!(field, level, "LOW scaled {field}");
                    scaled = 0;
                }
            }
        }
        scaled = scaled.saturating_add(1);

        if scaled > self.height || scaled == 0 {
            self.warnings += 1;
            warn!(field, level, scaled, "HIGH scaled {field}");
        }

        let row = self.height - scaled;
        (0..self.height).contains(&row).then_some(row as usize)
    }
}

#[cfg(test)]
mod tests {
    use utils::Channels;

    use super::*;

    fn column(values: [f64; 4]) -> Grid<f64> {
        Grid::from_vec(1, 4, values.to_vec()).unwrap()
    }

    fn mapper(height: i64, policy: LowPolicy) -> RowMapper {
        RowMapper {
            height,
            policy,
            warnings: 0,
        }
    }

    #[test]
    fn maximum_lands_on_top_level() {
        for max in [2.0, 7.5, 255.0, 1e6, 0.3] {
            for height in [2, 3, 17, 256] {
                let scale = LogScale::new(max, 0.0, height).unwrap();
                assert_eq!(scale.level(max), (height - 1) as f64, "max {max}, height {height}");
            }
        }
        let scale = LogScale::new(8.0, 0.0, 4).unwrap();
        assert!((scale.base() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_domains_are_rejected() {
        let cases = [
            (10.0, 1),
            (10.0, 0),
            (0.0, 4),
            (1.0, 4),
            (f64::INFINITY, 4),
            (f64::NAN, 4),
        ];
        for (max, height) in cases {
            assert!(
                matches!(LogScale::new(max, 1.0, height), Err(Error::DegenerateLogDomain { .. })),
                "max {max}, height {height}"
            );
        }
    }

    #[test]
    fn rows_stay_inside_image() {
        let mut rows = mapper(5, LowPolicy::Reflect);
        assert_eq!(rows.place("m", 0.0), Some(4));
        assert_eq!(rows.place("m", 4.0), Some(0));
        assert_eq!(rows.place("m", 4.99), Some(0));
        assert_eq!(rows.place("m", 2.5), Some(2));
        assert_eq!(rows.warnings, 0);
    }

    #[test]
    fn negative_levels_reflect_or_clamp() {
        let mut reflect = mapper(5, LowPolicy::Reflect);
        assert_eq!(reflect.place("m", -2.5), Some(1));
        assert_eq!(reflect.warnings, 0);

        let mut clamp = mapper(5, LowPolicy::Clamp);
        assert_eq!(clamp.place("m", -2.5), Some(4));
        assert_eq!(clamp.warnings, 1);
    }

    #[test]
    fn overflow_and_non_finite_only_warn() {
        let mut rows = mapper(5, LowPolicy::Reflect);
        assert_eq!(rows.place("m", 10.0), None);
        assert_eq!(rows.place("m", -7.0), None);
        assert_eq!(rows.place("m", f64::NAN), Some(4));
        assert_eq!(rows.place("m", f64::NEG_INFINITY), Some(4));
        assert_eq!(rows.warnings, 4);
    }

    #[test]
    fn channels_blend_additively() {
        let magnitude = Channels::new(
            column([0.0, 3.0, 15.0, 255.0]),
            column([0.0, 3.0, 15.0, 255.0]),
            column([0.0; 4]),
        );
        let phase = Channels::new(
            column([0.0, 1.0, -1.0, 2.0]),
            column([0.0; 4]),
            column([0.0; 4]),
        );
        let set = SpectralSet::new(magnitude, phase).unwrap();
        let analysis = render(&set, &VisualizeConfig::default()).unwrap();
        assert_eq!(analysis.warnings, 0);

        let mag = |row| analysis.magnitude.get_pixel(0, row).0;
        assert_eq!(mag(0), [255, 255, 0]);
        assert_eq!(mag(1), [0, 0, 0]);
        assert_eq!(mag(2), [255, 255, 0]);
        assert_eq!(mag(3), [255, 255, 255]);

        // offset 2, max 4: -1 → bottom, 0 → level 1.5, 1 → level 2.38, 2 → top
        let pha = |row| analysis.phase.get_pixel(0, row).0;
        assert_eq!(pha(0), [255, 0, 0]);
        assert_eq!(pha(1), [255, 0, 0]);
        assert_eq!(pha(2), [255, 255, 255]);
        assert_eq!(pha(3), [255, 0, 0]);
    }

    #[test]
    fn corrupted_values_render_with_warnings() {
        let magnitude = Channels::new(
            column([-5.0, 3.0, 15.0, 255.0]),
            column([0.0; 4]),
            column([f64::NAN, 1.0, 2.0, 3.0]),
        );
        let phase = Channels::new(
            column([0.0, 1.0, -1.0, 2.0]),
            column([0.0; 4]),
            column([0.0; 4]),
        );
        let set = SpectralSet::new(magnitude, phase).unwrap();
        let analysis = render(&set, &VisualizeConfig::default()).unwrap();
        assert_eq!(analysis.warnings, 2);
        assert_eq!(analysis.magnitude.dimensions(), (1, 4));
    }
}
