//! Heatmap matrices: binned variant counts between two chromosomes, with
//! drill-down zoom that re-queries raw data and browser-style back/forward
//! history.

use log::debug;

use crate::config::HeatmapConfig;
use crate::error::{SvError, SvResult};
use crate::model::{GenomeModel, VariantKind};

/// One bp axis of a matrix: a start offset and a per-bin width expressed as a
/// zoom factor over the base bin size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub start_bp: f64,
    pub zoom_factor: f64,
    pub bins: usize,
}

impl Axis {
    fn bin_bp(&self, bin_size: u64) -> f64 {
        bin_size as f64 * self.zoom_factor
    }

    /// Start offset in units of the base bin size.
    pub fn axis_start(&self, bin_size: u64) -> f64 {
        self.start_bp / bin_size as f64
    }

    /// Bin index for a position, None outside the axis range. A position
    /// exactly on the range end lands in the last bin.
    fn bin_of(&self, pos: f64, bin_size: u64) -> Option<usize> {
        let width = self.bin_bp(bin_size);
        if self.bins == 0 || pos < self.start_bp || width <= 0.0 {
            return None;
        }
        let idx = ((pos - self.start_bp) / width).floor() as usize;
        if idx < self.bins {
            Some(idx)
        } else if idx == self.bins && pos <= self.start_bp + width * self.bins as f64 {
            Some(self.bins - 1)
        } else {
            None
        }
    }
}

/// A 2-D count matrix of qualifying variants between two chromosomes.
///
/// Cells are stored x-major as counted; [`HeatmapMatrix::oriented`] applies
/// the transpose and vertical flip handed to the renderer.
#[derive(Debug, Clone)]
pub struct HeatmapMatrix {
    pub chr_a: String,
    pub chr_b: String,
    pub kind: VariantKind,
    pub bin_size: u64,
    pub x_axis: Axis,
    pub y_axis: Axis,
    cells: Vec<u32>,
}

impl HeatmapMatrix {
    /// Build the unzoomed matrix: `ceil(lenA/binSize) x ceil(lenB/binSize)`
    /// bins at zoom factor 1. TLOC counts derived connections by their window
    /// midpoints; every other kind counts same-chromosome variants by their
    /// start/end positions and requires `chr_a == chr_b`.
    pub fn build(
        model: &GenomeModel,
        chr_a: &str,
        chr_b: &str,
        kind: VariantKind,
        bin_size: u64,
    ) -> SvResult<HeatmapMatrix> {
        if bin_size == 0 {
            return Err(SvError::InvalidConfig("bin size must be positive".to_string()));
        }
        let a = model
            .chromosome(chr_a)
            .ok_or_else(|| SvError::InvalidConfig(format!("unknown chromosome {}", chr_a)))?;
        let b = model
            .chromosome(chr_b)
            .ok_or_else(|| SvError::InvalidConfig(format!("unknown chromosome {}", chr_b)))?;
        if kind != VariantKind::Tloc && chr_a != chr_b {
            return Err(SvError::InvalidConfig(format!(
                "{} heatmaps are same-chromosome only",
                kind.as_str()
            )));
        }
        let x_axis = Axis {
            start_bp: 0.0,
            zoom_factor: 1.0,
            bins: div_ceil(a.end, bin_size),
        };
        let y_axis = Axis {
            start_bp: 0.0,
            zoom_factor: 1.0,
            bins: div_ceil(b.end, bin_size),
        };
        let mut matrix = HeatmapMatrix {
            chr_a: chr_a.to_string(),
            chr_b: chr_b.to_string(),
            kind,
            bin_size,
            x_axis,
            y_axis,
            cells: vec![0; x_axis.bins * y_axis.bins],
        };
        matrix.fill(model);
        Ok(matrix)
    }

    fn fill(&mut self, model: &GenomeModel) {
        let chromo = match model.chromosome(&self.chr_a) {
            Some(c) => c,
            None => return,
        };
        if self.kind == VariantKind::Tloc {
            for conn in chromo.connections() {
                if conn.chr_b != self.chr_b {
                    continue;
                }
                let pos_a = (conn.window_a.0 + conn.window_a.1) as f64 / 2.0;
                let pos_b = (conn.window_b.0 + conn.window_b.1) as f64 / 2.0;
                self.increment(pos_a, pos_b);
            }
        } else {
            for variant in &chromo.variants {
                if !variant.active || variant.kind != self.kind || variant.chr_b != self.chr_a {
                    continue;
                }
                self.increment(variant.pos_a as f64, variant.pos_b as f64);
            }
        }
        debug!(
            "heatmap {}x{} for {} {}/{}: {} hits",
            self.x_axis.bins,
            self.y_axis.bins,
            self.kind.as_str(),
            self.chr_a,
            self.chr_b,
            self.total()
        );
    }

    fn increment(&mut self, pos_a: f64, pos_b: f64) {
        let (x, y) = match (
            self.x_axis.bin_of(pos_a, self.bin_size),
            self.y_axis.bin_of(pos_b, self.bin_size),
        ) {
            (Some(x), Some(y)) => (x, y),
            _ => return,
        };
        self.cells[x * self.y_axis.bins + y] += 1;
    }

    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[x * self.y_axis.bins + y]
    }

    /// Sum over every cell.
    pub fn total(&self) -> u32 {
        self.cells.iter().sum()
    }

    /// Rows for the renderer: transposed and vertically flipped, so the last
    /// row holds the lowest y-axis bp (origin at the bottom-left).
    pub fn oriented(&self) -> Vec<Vec<u32>> {
        (0..self.y_axis.bins)
            .rev()
            .map(|y| (0..self.x_axis.bins).map(|x| self.get(x, y)).collect())
            .collect()
    }

    /// Build a higher-resolution matrix over the bp range covered by the
    /// selected inclusive bin ranges, re-binned into `zoom_bins` cells per
    /// axis from raw variant data.
    pub fn zoomed(
        &self,
        model: &GenomeModel,
        x_bins: (usize, usize),
        y_bins: (usize, usize),
        zoom_bins: usize,
    ) -> SvResult<HeatmapMatrix> {
        if zoom_bins == 0 {
            return Err(SvError::InvalidConfig("zoom bin count must be positive".to_string()));
        }
        let x_axis = self.sub_axis(&self.x_axis, x_bins, zoom_bins)?;
        let y_axis = self.sub_axis(&self.y_axis, y_bins, zoom_bins)?;
        let mut matrix = HeatmapMatrix {
            chr_a: self.chr_a.clone(),
            chr_b: self.chr_b.clone(),
            kind: self.kind,
            bin_size: self.bin_size,
            x_axis,
            y_axis,
            cells: vec![0; zoom_bins * zoom_bins],
        };
        matrix.fill(model);
        Ok(matrix)
    }

    fn sub_axis(&self, axis: &Axis, selected: (usize, usize), zoom_bins: usize) -> SvResult<Axis> {
        let (first, last) = selected;
        if first > last || last >= axis.bins {
            return Err(SvError::InvalidConfig(format!(
                "bin selection {}..={} outside 0..{}",
                first, last, axis.bins
            )));
        }
        let bin_bp = axis.bin_bp(self.bin_size);
        let start_bp = axis.start_bp + first as f64 * bin_bp;
        let range_bp = (last - first + 1) as f64 * bin_bp;
        Ok(Axis {
            start_bp,
            zoom_factor: range_bp / (self.bin_size as f64 * zoom_bins as f64),
            bins: zoom_bins,
        })
    }
}

fn div_ceil(len: u64, bin: u64) -> usize {
    ((len + bin - 1) / bin) as usize
}

/// Browser-style navigation over successive zoom levels. Going back keeps
/// forward state; issuing a new zoom mid-history truncates everything after
/// the current position first.
#[derive(Debug, Clone)]
pub struct HeatmapHistory {
    entries: Vec<HeatmapMatrix>,
    index: usize,
}

impl HeatmapHistory {
    pub fn new(root: HeatmapMatrix) -> Self {
        HeatmapHistory { entries: vec![root], index: 0 }
    }

    pub fn current(&self) -> &HeatmapMatrix {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zoom into a bin selection of the current matrix and make the result
    /// current.
    pub fn zoom(
        &mut self,
        model: &GenomeModel,
        x_bins: (usize, usize),
        y_bins: (usize, usize),
        cfg: &HeatmapConfig,
    ) -> SvResult<()> {
        let next = self.current().zoomed(model, x_bins, y_bins, cfg.zoom_bins)?;
        self.entries.truncate(self.index + 1);
        self.entries.push(next);
        self.index += 1;
        Ok(())
    }

    /// Step back one zoom level. Returns false at the root.
    pub fn back(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward after going back. Returns false at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variant;

    fn del(chromo: &str, pos_a: u64, pos_b: u64) -> Variant {
        Variant::new(chromo.to_string(), pos_a, chromo.to_string(), pos_b, VariantKind::Del)
    }

    fn tloc(chr_a: &str, win_a: (u64, u64), chr_b: &str, win_b: (u64, u64)) -> Variant {
        let mut v = Variant::new(chr_a.to_string(), win_a.0, chr_b.to_string(), win_b.0, VariantKind::Tloc);
        v.info.insert("WINA".to_string(), format!("{},{}", win_a.0, win_a.1));
        v.info.insert("WINB".to_string(), format!("{},{}", win_b.0, win_b.1));
        v
    }

    fn model() -> GenomeModel {
        let mut m = GenomeModel::new();
        m.chromosome_or_insert("1").end = 1_000_000;
        m.chromosome_or_insert("2").end = 500_000;
        m
    }

    #[test]
    fn test_same_chromosome_binning() {
        let mut m = model();
        m.chromosome_mut("1").unwrap().variants.push(del("1", 100_000, 200_000));
        let matrix = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        assert_eq!(matrix.x_axis.bins, 10);
        assert_eq!(matrix.y_axis.bins, 10);
        assert_eq!(matrix.get(1, 2), 1);
        assert_eq!(matrix.total(), 1);
    }

    #[test]
    fn test_tloc_uses_window_midpoints() {
        let mut m = model();
        m.chromosome_mut("1").unwrap().variants.push(tloc("1", (240_000, 260_000), "2", (90_000, 110_000)));
        let matrix = HeatmapMatrix::build(&m, "1", "2", VariantKind::Tloc, 100_000).unwrap();
        assert_eq!(matrix.x_axis.bins, 10);
        assert_eq!(matrix.y_axis.bins, 5);
        // midpoints 250k and 100k
        assert_eq!(matrix.get(2, 1), 1);
        assert_eq!(matrix.total(), 1);
    }

    #[test]
    fn test_total_matches_qualifying_count() {
        let mut m = model();
        {
            let one = m.chromosome_mut("1").unwrap();
            one.variants.push(del("1", 0, 50_000));
            one.variants.push(del("1", 999_999, 1_000_000));
            one.variants.push(del("1", 500_000, 500_000));
            // different kind, must not count
            one.variants.push(Variant::new("1".to_string(), 1, "1".to_string(), 2, VariantKind::Inv));
            // inactive, must not count
            let mut v = del("1", 10, 20);
            v.active = false;
            one.variants.push(v);
        }
        let matrix = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        assert_eq!(matrix.total(), 3);
    }

    #[test]
    fn test_position_at_range_end_lands_in_last_bin() {
        let mut m = model();
        m.chromosome_mut("1").unwrap().variants.push(del("1", 1_000_000, 1_000_000));
        let matrix = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        assert_eq!(matrix.get(9, 9), 1);
    }

    #[test]
    fn test_zero_length_chromosome_yields_empty_matrix() {
        let mut m = model();
        // known to the model but no coverage loaded, so no length either
        m.chromosome_or_insert("3");
        m.chromosome_mut("3").unwrap().variants.push(del("3", 100, 200));
        let matrix = HeatmapMatrix::build(&m, "3", "3", VariantKind::Del, 100_000).unwrap();
        assert_eq!(matrix.x_axis.bins, 0);
        assert_eq!(matrix.total(), 0);
        assert!(matrix.oriented().is_empty());
    }

    #[test]
    fn test_non_tloc_requires_same_chromosome() {
        let m = model();
        assert!(HeatmapMatrix::build(&m, "1", "2", VariantKind::Del, 100_000).is_err());
    }

    #[test]
    fn test_oriented_is_transposed_and_flipped() {
        let mut m = model();
        m.chromosome_mut("1").unwrap().variants.push(del("1", 100_000, 900_000));
        let matrix = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        let rows = matrix.oriented();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].len(), 10);
        // x bin 1, y bin 9 renders at row 0 (top), column 1
        assert_eq!(rows[0][1], 1);
    }

    #[test]
    fn test_zoom_requeries_raw_data() {
        let mut m = model();
        {
            let one = m.chromosome_mut("1").unwrap();
            // two variants in the same level-0 bin, separable at higher zoom
            one.variants.push(del("1", 110_000, 210_000));
            one.variants.push(del("1", 190_000, 290_000));
            // outside the selection
            one.variants.push(del("1", 700_000, 800_000));
        }
        let root = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        assert_eq!(root.get(1, 2), 2);

        let zoomed = root.zoomed(&m, (1, 1), (2, 2), 10).unwrap();
        assert_eq!(zoomed.x_axis.bins, 10);
        assert_eq!(zoomed.x_axis.start_bp, 100_000.0);
        assert!((zoomed.x_axis.zoom_factor - 0.1).abs() < 1e-12);
        assert_eq!(zoomed.total(), 2);
        // 10k bp per zoomed bin now separates the two start positions
        assert_eq!(zoomed.get(1, 1), 1);
        assert_eq!(zoomed.get(9, 9), 1);
    }

    #[test]
    fn test_history_truncates_on_new_zoom_after_back() {
        let mut m = model();
        {
            let one = m.chromosome_mut("1").unwrap();
            one.variants.push(del("1", 110_000, 210_000));
            one.variants.push(del("1", 190_000, 290_000));
        }
        let cfg = HeatmapConfig::default();
        let root = HeatmapMatrix::build(&m, "1", "1", VariantKind::Del, 100_000).unwrap();
        let mut history = HeatmapHistory::new(root);

        history.zoom(&m, (1, 2), (2, 2), &cfg).unwrap();
        history.zoom(&m, (0, 9), (0, 9), &cfg).unwrap();
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert_eq!(history.len(), 3);
        history.zoom(&m, (0, 4), (0, 4), &cfg).unwrap();
        // the branch past the back position is gone
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert!(history.back());
        assert!(!history.back());
        assert!(history.forward());
        assert!(history.forward());
        assert!(!history.forward());
    }
}
