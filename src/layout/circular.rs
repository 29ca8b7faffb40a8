//! Circular (circos-style) layout: proportional sector allocation over 360
//! degrees plus nested concentric rings for coverage and annotation layers.
//!
//! Angles are degrees clockwise from 3 o'clock in a y-down coordinate system.
//! Radii are unit values (1.0 = plot edge) centered on the origin; the caller
//! scales them to its viewport.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::{CircularConfig, RingConfig};
use crate::coverage::{self, AggregationParams, CoverageScaling};
use crate::model::{Chromosome, GenomeModel};

/// One chromosome's angular allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeSector {
    pub name: String,
    /// Start of the allocation in degrees
    pub start_angle: f64,
    /// Bookkeeping span in degrees, gap included
    pub span: f64,
}

/// One aggregated coverage value positioned on the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoveragePoint {
    pub angle: f64,
    /// Radial extent in `[0, 1]` across the coverage ring, 0 at the inner edge
    pub t: f64,
}

/// A tick on the outer distance scale.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMarker {
    pub angle: f64,
    /// Present on every tenth tick
    pub label: Option<String>,
}

/// The full circular allocation for one model state.
#[derive(Debug, Clone)]
pub struct CircularLayout {
    sectors: IndexMap<String, ChromosomeSector>,
    gap_degrees: f64,
    pub chromosome_ring: RingConfig,
    pub coverage_ring: RingConfig,
}

impl CircularLayout {
    /// Allocate the circle proportionally across displayed chromosomes.
    ///
    /// Each chromosome receives `(end / totalBP) * 360` degrees; the trailing
    /// gap is subtracted from the drawn arc only, so spans always sum to 360.
    /// With nothing displayed the layout is empty and dependent computation
    /// must be skipped.
    pub fn build(model: &GenomeModel, cfg: &CircularConfig) -> CircularLayout {
        let mut sectors = IndexMap::new();
        let total_bp = model.total_displayed_bp();
        if total_bp > 0 {
            let mut current_angle = 0.0;
            for chromo in model.displayed() {
                let span = (chromo.end as f64 / total_bp as f64) * 360.0;
                sectors.insert(
                    chromo.name.clone(),
                    ChromosomeSector {
                        name: chromo.name.clone(),
                        start_angle: current_angle,
                        span,
                    },
                );
                current_angle += span;
            }
        } else {
            debug!("no chromosomes displayed, circular layout is empty");
        }
        CircularLayout {
            sectors,
            gap_degrees: cfg.gap_degrees,
            chromosome_ring: cfg.chromosome_ring,
            coverage_ring: cfg.coverage_ring,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn sectors(&self) -> impl Iterator<Item = &ChromosomeSector> {
        self.sectors.values()
    }

    pub fn sector(&self, name: &str) -> Option<&ChromosomeSector> {
        self.sectors.get(name)
    }

    /// Arc actually drawn for a chromosome, gap excluded.
    pub fn drawn_span(&self, name: &str) -> Option<f64> {
        self.sector(name).map(|s| s.span - self.gap_degrees)
    }

    /// Angular range of a bp region inside a chromosome's full span, used for
    /// cytoband and color overlays on the chromosome ring. Region ends past
    /// the chromosome end are clamped, tolerating slightly misaligned files.
    pub fn region_sector(&self, name: &str, chromo_end: u64, start: u64, end: u64) -> Option<(f64, f64)> {
        let sector = self.sector(name)?;
        if chromo_end == 0 {
            return None;
        }
        let end = end.min(chromo_end);
        let from = sector.start_angle + (start as f64 / chromo_end as f64) * sector.span;
        let to = sector.start_angle + (end as f64 / chromo_end as f64) * sector.span;
        Some((from, to))
    }

    /// Angular range of an annotation region on a stacked layer ring. The
    /// usable span is two degrees narrower than the allocation, and regions
    /// below the configured minimum length are dropped.
    pub fn layer_sector(
        &self,
        name: &str,
        chromo_end: u64,
        start: u64,
        end: u64,
        cfg: &CircularConfig,
    ) -> Option<(f64, f64)> {
        let sector = self.sector(name)?;
        if chromo_end == 0 {
            return None;
        }
        let end = end.min(chromo_end);
        if (end.saturating_sub(start)) as f64 <= cfg.min_region_kb * 1000.0 {
            return None;
        }
        let usable = sector.span - 2.0;
        let from = sector.start_angle + (start as f64 / chromo_end as f64) * usable;
        let to = sector.start_angle + (end as f64 / chromo_end as f64) * usable;
        Some((from, to))
    }

    /// Radius band of the annotation layer at `index`, nested inside the
    /// coverage ring.
    pub fn layer_ring(&self, index: usize, cfg: &CircularConfig) -> RingConfig {
        let outer = self.coverage_ring.inner
            - cfg.layer_gap
            - index as f64 * (cfg.layer_thickness + cfg.layer_gap);
        RingConfig {
            outer,
            inner: outer - cfg.layer_thickness,
        }
    }

    /// Aggregate one chromosome's coverage into angled points across its
    /// drawn arc. The radial extent `t` interpolates linearly over the clamp
    /// range.
    pub fn coverage_points(
        &self,
        chromo: &Chromosome,
        model: &GenomeModel,
        cfg: &CircularConfig,
    ) -> Vec<CoveragePoint> {
        let sector = match self.sector(&chromo.name) {
            Some(s) => s,
            None => return Vec::new(),
        };
        let (samples, norm) = coverage::chromosome_series(chromo, model, &cfg.coverage);
        let params = AggregationParams::from_config(&cfg.coverage, norm, CoverageScaling::Relative);
        let values = coverage::aggregate_normalized(samples, &params);
        if values.is_empty() {
            return Vec::new();
        }
        let drawn = sector.span - self.gap_degrees;
        let angle_incr = drawn / values.len() as f64;
        values
            .into_iter()
            .enumerate()
            .map(|(i, t)| CoveragePoint {
                angle: sector.start_angle + i as f64 * angle_incr,
                t,
            })
            .collect()
    }

    /// Tick marks along the outer edge at a fixed megabase resolution, with a
    /// counter label on every tenth tick. The scale excludes one gap degree
    /// per displayed chromosome.
    pub fn distance_markers(&self, model: &GenomeModel, cfg: &CircularConfig) -> Vec<DistanceMarker> {
        let total_bp = model.total_displayed_bp();
        if total_bp == 0 || self.is_empty() {
            return Vec::new();
        }
        let num_displayed = self.sectors.len() as f64;
        let degree_per_tick = (360.0 - num_displayed)
            / (total_bp as f64 / (cfg.distance_resolution_mb * 1_000_000.0));
        if !(degree_per_tick > 0.0) {
            warn!(
                "distance resolution {} Mb gives no usable tick spacing",
                cfg.distance_resolution_mb
            );
            return Vec::new();
        }
        let mut markers = Vec::new();
        for sector in self.sectors.values() {
            let drawn_end = sector.start_angle + sector.span - self.gap_degrees;
            let mut angle = sector.start_angle;
            let mut counter = 0u64;
            while angle < drawn_end {
                let label = if counter % 10 == 0 {
                    Some(counter.to_string())
                } else {
                    None
                };
                markers.push(DistanceMarker { angle, label });
                angle += degree_per_tick;
                counter += 1;
            }
        }
        markers
    }
}
