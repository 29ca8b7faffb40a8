//! Coverage aggregation: windowing, clamping and normalization of raw
//! per-bucket coverage samples.

use crate::config::CoverageConfig;
use crate::model::{Chromosome, GenomeModel};

/// Copy-number scaling applied after normalization.
///
/// Single-chromosome inspection tracks report diploid copy number (factor 2),
/// genome-wide tracks report coverage relative to the dataset mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageScaling {
    Diploid,
    Relative,
}

impl CoverageScaling {
    fn factor(&self) -> f64 {
        match self {
            CoverageScaling::Diploid => 2.0,
            CoverageScaling::Relative => 1.0,
        }
    }
}

/// Parameters for one aggregation pass.
#[derive(Debug, Clone, Copy)]
pub struct AggregationParams {
    /// Raw samples averaged per output point
    pub window: usize,
    /// Genome-wide mean coverage used as the normalization denominator
    pub norm: f64,
    /// Clamp floor as a fraction of `norm`
    pub min_frac: f64,
    /// Clamp ceiling as a fraction of `norm`
    pub max_frac: f64,
    pub scaling: CoverageScaling,
}

impl AggregationParams {
    pub fn from_config(cfg: &CoverageConfig, norm: f64, scaling: CoverageScaling) -> Self {
        AggregationParams {
            window: cfg.bp_window,
            norm,
            min_frac: cfg.min_frac,
            max_frac: cfg.max_frac,
            scaling,
        }
    }
}

/// Aggregate raw samples into chunk means, clamped to
/// `[norm*min_frac, norm*max_frac]` and scaled by the copy-number factor over
/// `norm`. The last chunk may cover fewer than `window` samples; it is
/// averaged over its own length, never dropped. An empty input yields an
/// empty output.
pub fn aggregate(samples: &[f64], params: &AggregationParams) -> Vec<f64> {
    let window = params.window.max(1);
    let lo = params.norm * params.min_frac;
    let hi = params.norm * params.max_frac;
    let factor = params.scaling.factor();
    samples
        .chunks(window)
        .map(|chunk| {
            let mean = chunk.iter().sum::<f64>() / chunk.len() as f64;
            let clamped = mean.clamp(lo, hi);
            if params.norm > 0.0 {
                factor * clamped / params.norm
            } else {
                0.0
            }
        })
        .collect()
}

/// Aggregate and rescale each value into `[0, 1]` over the clamp range, for
/// consumers that interpolate a radial or vertical extent.
pub fn aggregate_normalized(samples: &[f64], params: &AggregationParams) -> Vec<f64> {
    let factor = params.scaling.factor();
    let lo = factor * params.min_frac;
    let hi = factor * params.max_frac;
    let span = hi - lo;
    aggregate(samples, params)
        .into_iter()
        .map(|v| if span > 0.0 { (v - lo) / span } else { 0.0 })
        .collect()
}

/// Pick the raw or log2 series of a chromosome together with the matching
/// dataset norm, per the configured mode.
pub fn chromosome_series<'a>(
    chromo: &'a Chromosome,
    model: &GenomeModel,
    cfg: &CoverageConfig,
) -> (&'a [f64], f64) {
    if cfg.use_log {
        (&chromo.coverage_log, model.coverage_norm_log)
    } else {
        (&chromo.coverage, model.coverage_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(window: usize, norm: f64, min_frac: f64, max_frac: f64, scaling: CoverageScaling) -> AggregationParams {
        AggregationParams { window, norm, min_frac, max_frac, scaling }
    }

    #[test]
    fn test_diploid_aggregation() {
        let samples = [1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        let p = params(3, 3.0, 0.5, 1.5, CoverageScaling::Diploid);
        // chunk means [1, 5] clamp to [1.5, 4.5], then 2*v/3
        assert_eq!(aggregate(&samples, &p), vec![1.0, 3.0]);
    }

    #[test]
    fn test_relative_mode_drops_factor() {
        let samples = [3.0, 3.0, 3.0];
        let p = params(3, 3.0, 0.0, 5.0, CoverageScaling::Relative);
        assert_eq!(aggregate(&samples, &p), vec![1.0]);
    }

    #[test]
    fn test_output_length_is_ceil() {
        let samples: Vec<f64> = (0..10).map(|i| i as f64).collect();
        for w in 1..=11 {
            let p = params(w, 1.0, 0.0, 100.0, CoverageScaling::Relative);
            let expected = (samples.len() + w - 1) / w;
            assert_eq!(aggregate(&samples, &p).len(), expected, "window {}", w);
        }
    }

    #[test]
    fn test_short_tail_chunk_is_averaged_not_dropped() {
        let samples = [2.0, 2.0, 2.0, 8.0];
        let p = params(3, 2.0, 0.0, 100.0, CoverageScaling::Relative);
        assert_eq!(aggregate(&samples, &p), vec![1.0, 4.0]);
    }

    #[test]
    fn test_values_stay_within_clamp_bounds() {
        let samples = [0.0, 100.0, 3.0, 0.5, 7.0];
        let p = params(1, 2.0, 0.5, 1.5, CoverageScaling::Diploid);
        for v in aggregate(&samples, &p) {
            assert!(v >= 2.0 * 0.5 && v <= 2.0 * 1.5, "value {} out of bounds", v);
        }
    }

    #[test]
    fn test_empty_input() {
        let p = params(5, 3.0, 0.0, 5.0, CoverageScaling::Diploid);
        assert!(aggregate(&[], &p).is_empty());
    }

    #[test]
    fn test_normalized_range() {
        let samples = [0.0, 2.0, 4.0, 100.0];
        let p = params(1, 2.0, 0.0, 2.0, CoverageScaling::Relative);
        let t = aggregate_normalized(&samples, &p);
        assert_eq!(t.len(), 4);
        for v in &t {
            assert!((0.0..=1.0).contains(v));
        }
        // dataset mean maps to the middle of the clamp range
        assert!((t[1] - 0.5).abs() < 1e-12);
        assert_eq!(t[3], 1.0);
    }
}
