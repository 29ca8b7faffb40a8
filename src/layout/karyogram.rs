//! Karyogram layout: a multi-row grid of chromosome bars built from cytoband
//! records, with rounded band corners at telomeres and the centromere
//! constriction.
//!
//! Coordinates are scene units with y growing downward.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::config::KaryogramConfig;
use crate::geometry::Rect;
use crate::model::{is_unplaced, GenomeModel, Stain};

/// Which corners of a band rectangle are drawn rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandRounding {
    pub top: bool,
    pub bottom: bool,
}

/// One cytoband segment of a chromosome bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BandShape {
    pub name: String,
    pub stain: Stain,
    pub rect: Rect,
    pub rounding: BandRounding,
}

/// One chromosome bar with its stacked band segments.
#[derive(Debug, Clone)]
pub struct ChromosomeBar {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bands: Vec<BandShape>,
}

impl ChromosomeBar {
    pub fn band(&self, name: &str) -> Option<&BandShape> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// The full karyogram allocation for one model state.
#[derive(Debug, Clone)]
pub struct KaryogramLayout {
    bars: IndexMap<String, ChromosomeBar>,
}

impl KaryogramLayout {
    /// Lay out displayed chromosomes left to right, wrapping every
    /// `items_per_row` bars. Unplaced contigs and mitochondrial DNA never
    /// appear. The longest displayed chromosome spans the full column height;
    /// every other bar is proportionally shorter. `overrides` restores
    /// user-moved bar positions across a rebuild, keyed by chromosome name.
    pub fn build(
        model: &GenomeModel,
        cfg: &KaryogramConfig,
        overrides: &HashMap<String, (f64, f64)>,
    ) -> KaryogramLayout {
        let shown: Vec<_> = model
            .displayed()
            .into_iter()
            .filter(|c| !is_unplaced(&c.name))
            .collect();
        let max_bp = shown.iter().map(|c| c.end).max().unwrap_or(0);
        if max_bp == 0 {
            return KaryogramLayout { bars: IndexMap::new() };
        }

        let per_row = cfg.items_per_row.max(1);
        let heights: Vec<f64> = shown
            .iter()
            .map(|c| (c.end as f64 / max_bp as f64) * cfg.column_height)
            .collect();

        let mut bars = IndexMap::new();
        let mut row_y = 0.0;
        for (row_index, row) in shown.chunks(per_row).enumerate() {
            let row_heights = &heights[row_index * per_row..row_index * per_row + row.len()];
            for (col, (chromo, height)) in row.iter().zip(row_heights).enumerate() {
                let default_x = col as f64 * (cfg.bar_width + cfg.x_spacing);
                let (x, y) = overrides
                    .get(&chromo.name)
                    .copied()
                    .unwrap_or((default_x, row_y));
                let bands = band_shapes(model, &chromo.name, chromo.end, x, y, cfg.bar_width, *height);
                bars.insert(
                    chromo.name.clone(),
                    ChromosomeBar {
                        name: chromo.name.clone(),
                        x,
                        y,
                        width: cfg.bar_width,
                        height: *height,
                        bands,
                    },
                );
            }
            let tallest = row_heights.iter().cloned().fold(0.0, f64::max);
            row_y += tallest + cfg.row_margin;
        }
        KaryogramLayout { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> impl Iterator<Item = &ChromosomeBar> {
        self.bars.values()
    }

    pub fn bar(&self, name: &str) -> Option<&ChromosomeBar> {
        self.bars.get(name)
    }
}

/// Rounding flags per band: the first and last bands round their outer
/// (telomere) edges, the first acen band rounds its trailing edge and the
/// second its leading edge (centromere constriction).
fn band_shapes(
    model: &GenomeModel,
    name: &str,
    chromo_end: u64,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<BandShape> {
    let cyto = model.cytobands_of(name);
    let mut acen_seen = 0usize;
    let last = cyto.len().saturating_sub(1);
    cyto.iter()
        .enumerate()
        .map(|(i, band)| {
            let band_height = ((band.end - band.start) as f64 / chromo_end as f64) * height;
            let band_y = (band.start as f64 / chromo_end as f64) * height;
            let mut rounding = BandRounding::default();
            if i == 0 {
                rounding.top = true;
            }
            if i == last {
                rounding.bottom = true;
            }
            if band.stain == Stain::Acen {
                acen_seen += 1;
                match acen_seen {
                    1 => rounding.bottom = true,
                    2 => rounding.top = true,
                    _ => {}
                }
            }
            BandShape {
                name: band.name.clone(),
                stain: band.stain,
                rect: Rect::new(x, y + band_y, width, band_height),
                rounding,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CytoBand;

    fn band(start: u64, end: u64, name: &str, stain: Stain) -> CytoBand {
        CytoBand { start, end, name: name.to_string(), stain }
    }

    fn model_with_bands() -> GenomeModel {
        let mut model = GenomeModel::new();
        model.chromosome_or_insert("1").end = 1000;
        model.chromosome_or_insert("2").end = 500;
        model.chromosome_or_insert("GL000220.1").end = 50;
        model.cytobands.insert(
            "1".to_string(),
            vec![
                band(0, 400, "p2", Stain::Gneg),
                band(400, 500, "p1", Stain::Acen),
                band(500, 600, "q1", Stain::Acen),
                band(600, 1000, "q2", Stain::Gpos50),
            ],
        );
        model.cytobands.insert(
            "2".to_string(),
            vec![band(0, 250, "p1", Stain::Gneg), band(250, 500, "q1", Stain::Gneg)],
        );
        model
    }

    fn cfg() -> KaryogramConfig {
        KaryogramConfig {
            items_per_row: 2,
            row_margin: 40.0,
            column_height: 400.0,
            bar_width: 24.0,
            x_spacing: 60.0,
        }
    }

    #[test]
    fn test_bar_heights_scale_to_longest() {
        let model = model_with_bands();
        let layout = KaryogramLayout::build(&model, &cfg(), &HashMap::new());
        assert_eq!(layout.bar("1").unwrap().height, 400.0);
        assert_eq!(layout.bar("2").unwrap().height, 200.0);
        // unplaced contigs are never laid out
        assert!(layout.bar("GL000220.1").is_none());
    }

    #[test]
    fn test_row_wrapping() {
        let mut model = model_with_bands();
        model.chromosome_or_insert("3").end = 1000;
        let layout = KaryogramLayout::build(&model, &cfg(), &HashMap::new());
        let one = layout.bar("1").unwrap();
        let two = layout.bar("2").unwrap();
        let three = layout.bar("3").unwrap();
        assert_eq!(one.y, 0.0);
        assert_eq!(two.y, 0.0);
        assert!(two.x > one.x);
        // second row starts below the tallest bar of the first plus margin
        assert_eq!(three.y, 440.0);
        assert_eq!(three.x, 0.0);
    }

    #[test]
    fn test_band_geometry_and_rounding() {
        let model = model_with_bands();
        let layout = KaryogramLayout::build(&model, &cfg(), &HashMap::new());
        let bar = layout.bar("1").unwrap();
        assert_eq!(bar.bands.len(), 4);

        let p2 = bar.band("p2").unwrap();
        assert_eq!(p2.rect.y, 0.0);
        assert_eq!(p2.rect.height, 160.0);
        assert_eq!(p2.rounding, BandRounding { top: true, bottom: false });

        let p1 = bar.band("p1").unwrap();
        assert_eq!(p1.rect.y, 160.0);
        assert_eq!(p1.rounding, BandRounding { top: false, bottom: true });

        let q1 = bar.band("q1").unwrap();
        assert_eq!(q1.rounding, BandRounding { top: true, bottom: false });

        let q2 = bar.band("q2").unwrap();
        assert_eq!(q2.rounding, BandRounding { top: false, bottom: true });
    }

    #[test]
    fn test_bands_contained_and_disjoint() {
        let model = model_with_bands();
        let layout = KaryogramLayout::build(&model, &cfg(), &HashMap::new());
        for bar in layout.bars() {
            for (i, band) in bar.bands.iter().enumerate() {
                assert!(band.rect.y >= bar.y - 1e-9);
                assert!(band.rect.bottom() <= bar.y + bar.height + 1e-9);
                if let Some(next) = bar.bands.get(i + 1) {
                    assert!(band.rect.bottom() <= next.rect.y + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_position_overrides_survive_rebuild() {
        let model = model_with_bands();
        let mut overrides = HashMap::new();
        overrides.insert("2".to_string(), (500.0, 123.0));
        let layout = KaryogramLayout::build(&model, &cfg(), &overrides);
        let two = layout.bar("2").unwrap();
        assert_eq!((two.x, two.y), (500.0, 123.0));
        // bands move with the bar
        assert_eq!(two.band("p1").unwrap().rect.x, 500.0);
        assert_eq!(two.band("p1").unwrap().rect.y, 123.0);
        // other bars keep their computed positions
        assert_eq!(layout.bar("1").unwrap().x, 0.0);
    }
}
