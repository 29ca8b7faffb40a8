//! Genome data model shared by every layout engine.
//!
//! Chromosomes, variants, cytobands and derived connections. Built once per
//! dataset load by the reader; after that the only mutations are display and
//! active flag flips from the caller.

pub mod reader;

use indexmap::IndexMap;
use log::warn;
use std::collections::HashMap;

use crate::error::{SvError, SvResult};

// ============================================================================
// Cytobands
// ============================================================================

/// Giemsa stain class of a cytoband.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stain {
    Acen,
    Gneg,
    Gpos25,
    Gpos50,
    Gpos75,
    Gpos100,
    Gvar,
    Stalk,
}

impl Stain {
    pub fn parse(s: &str) -> Option<Stain> {
        match s {
            "acen" => Some(Stain::Acen),
            "gneg" => Some(Stain::Gneg),
            "gpos25" => Some(Stain::Gpos25),
            "gpos50" => Some(Stain::Gpos50),
            "gpos75" => Some(Stain::Gpos75),
            "gpos100" => Some(Stain::Gpos100),
            "gvar" => Some(Stain::Gvar),
            "stalk" => Some(Stain::Stalk),
            _ => None,
        }
    }
}

/// A named, stained chromosomal region.
#[derive(Debug, Clone, PartialEq)]
pub struct CytoBand {
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub stain: Stain,
}

// ============================================================================
// Variants
// ============================================================================

/// Structural variant event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Del,
    Dup,
    Idup,
    Tdup,
    Inv,
    Ins,
    Bnd,
    Tloc,
}

impl VariantKind {
    pub fn parse(s: &str) -> Option<VariantKind> {
        match s {
            "DEL" => Some(VariantKind::Del),
            "DUP" => Some(VariantKind::Dup),
            "IDUP" => Some(VariantKind::Idup),
            "TDUP" => Some(VariantKind::Tdup),
            "INV" => Some(VariantKind::Inv),
            "INS" => Some(VariantKind::Ins),
            "BND" => Some(VariantKind::Bnd),
            "TLOC" => Some(VariantKind::Tloc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Del => "DEL",
            VariantKind::Dup => "DUP",
            VariantKind::Idup => "IDUP",
            VariantKind::Tdup => "TDUP",
            VariantKind::Inv => "INV",
            VariantKind::Ins => "INS",
            VariantKind::Bnd => "BND",
            VariantKind::Tloc => "TLOC",
        }
    }

    /// True for events connecting two chromosomes.
    pub fn is_interchromosomal(&self) -> bool {
        matches!(self, VariantKind::Bnd | VariantKind::Tloc)
    }
}

/// A single structural variant record.
#[derive(Debug, Clone)]
pub struct Variant {
    pub chr_a: String,
    pub pos_a: u64,
    pub chr_b: String,
    pub pos_b: u64,
    pub kind: VariantKind,
    /// Raw INFO sub-fields, keyed by tag
    pub info: HashMap<String, String>,
    /// Genes annotated on this variant (deduplicated, ordered)
    pub genes: Vec<String>,
    /// Cytoband pair string "bandA,bandB" when the caller annotated one
    pub cytoband: Option<String>,
    pub active: bool,
    pub rank_score: Option<i32>,
    pub marked: bool,
}

impl Variant {
    pub fn new(
        chr_a: String,
        pos_a: u64,
        chr_b: String,
        pos_b: u64,
        kind: VariantKind,
    ) -> Self {
        Variant {
            chr_a,
            pos_a,
            chr_b,
            pos_b,
            kind,
            info: HashMap::new(),
            genes: Vec::new(),
            cytoband: None,
            active: true,
            rank_score: None,
            marked: false,
        }
    }

    /// Breakpoint window on the A side, falling back to the single-point
    /// position when no WINA field is present.
    pub fn window_a(&self) -> SvResult<(u64, u64)> {
        match self.info.get("WINA") {
            Some(raw) => parse_window(raw),
            None => Ok((self.pos_a, self.pos_a)),
        }
    }

    /// Breakpoint window on the B side, like [`Variant::window_a`].
    pub fn window_b(&self) -> SvResult<(u64, u64)> {
        match self.info.get("WINB") {
            Some(raw) => parse_window(raw),
            None => Ok((self.pos_b, self.pos_b)),
        }
    }
}

/// Parse a "start,end" bp pair, requiring start <= end.
pub fn parse_window(raw: &str) -> SvResult<(u64, u64)> {
    let (start, end) = raw
        .split_once(',')
        .ok_or_else(|| SvError::InvalidVariantData(format!("window '{}' is not a start,end pair", raw)))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| SvError::InvalidVariantData(format!("window start '{}' is not an integer", start)))?;
    let end: u64 = end
        .trim()
        .parse()
        .map_err(|_| SvError::InvalidVariantData(format!("window end '{}' is not an integer", end)))?;
    if start > end {
        return Err(SvError::InvalidVariantData(format!(
            "window start {} exceeds end {}",
            start, end
        )));
    }
    Ok((start, end))
}

// ============================================================================
// Connections
// ============================================================================

/// A derived inter-chromosomal link between two breakpoint windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub chr_a: String,
    pub chr_b: String,
    pub window_a: (u64, u64),
    pub window_b: (u64, u64),
    /// "bandA,bandB" names when the variant carried them
    pub cytobands: Option<(String, String)>,
}

// ============================================================================
// Chromosomes
// ============================================================================

/// One chromosome with its coverage track and variants.
#[derive(Debug, Clone)]
pub struct Chromosome {
    pub name: String,
    /// Chromosome length in bp
    pub end: u64,
    /// Raw per-window coverage samples
    pub coverage: Vec<f64>,
    /// log2 of each raw sample, 0 where the sample is non-positive
    pub coverage_log: Vec<f64>,
    pub display: bool,
    pub display_connections: bool,
    pub display_cytoband_names: bool,
    pub variants: Vec<Variant>,
    /// Canonical ordering rank, assigned at load time
    pub rank: usize,
}

impl Chromosome {
    pub fn new(name: String, rank: usize) -> Self {
        let display = !is_unplaced(&name);
        Chromosome {
            name,
            end: 0,
            coverage: Vec::new(),
            coverage_log: Vec::new(),
            display,
            display_connections: false,
            display_cytoband_names: false,
            variants: Vec::new(),
            rank,
        }
    }

    /// Append one raw coverage sample, maintaining the log2 series.
    pub fn add_coverage(&mut self, value: f64) {
        self.coverage.push(value);
        if value > 0.0 {
            self.coverage_log.push(value.log2());
        } else {
            self.coverage_log.push(0.0);
        }
    }

    /// Derive the connection list from currently active inter-chromosomal
    /// variants. Always recomputed, never cached, so a toggled active flag is
    /// picked up on the next call. Variants with malformed window fields are
    /// logged and skipped.
    pub fn connections(&self) -> Vec<Connection> {
        let mut out = Vec::new();
        for (i, variant) in self.variants.iter().enumerate() {
            if !variant.active || !variant.kind.is_interchromosomal() {
                continue;
            }
            let window_a = match variant.window_a() {
                Ok(w) => w,
                Err(e) => {
                    warn!("skipping variant {} on {}: {}", i, self.name, e);
                    continue;
                }
            };
            let window_b = match variant.window_b() {
                Ok(w) => w,
                Err(e) => {
                    warn!("skipping variant {} on {}: {}", i, self.name, e);
                    continue;
                }
            };
            let cytobands = variant
                .cytoband
                .as_deref()
                .and_then(|c| c.split_once(','))
                .map(|(a, b)| (a.to_string(), b.to_string()));
            out.push(Connection {
                chr_a: variant.chr_a.clone(),
                chr_b: variant.chr_b.clone(),
                window_a,
                window_b,
                cytobands,
            });
        }
        out
    }
}

/// Unplaced contigs and mitochondrial DNA are excluded from most views.
pub fn is_unplaced(name: &str) -> bool {
    name.starts_with("GL") || name == "MT" || name == "M"
}

// ============================================================================
// The genome model
// ============================================================================

/// The full dataset: chromosomes in canonical order plus dataset-wide
/// normalization values and cytoband tables.
#[derive(Debug, Clone, Default)]
pub struct GenomeModel {
    /// Chromosomes keyed by name, preserving load order
    pub chromosomes: IndexMap<String, Chromosome>,
    /// Genome-wide mean raw coverage
    pub coverage_norm: f64,
    /// Genome-wide mean log2 coverage
    pub coverage_norm_log: f64,
    /// Cytobands keyed by chromosome name, ordered by start position
    pub cytobands: HashMap<String, Vec<CytoBand>>,
}

impl GenomeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chromosome(&self, name: &str) -> Option<&Chromosome> {
        self.chromosomes.get(name)
    }

    pub fn chromosome_mut(&mut self, name: &str) -> Option<&mut Chromosome> {
        self.chromosomes.get_mut(name)
    }

    /// Get the chromosome for `name`, creating it in load order if absent.
    pub fn chromosome_or_insert(&mut self, name: &str) -> &mut Chromosome {
        let rank = self.chromosomes.len();
        self.chromosomes
            .entry(name.to_string())
            .or_insert_with(|| Chromosome::new(name.to_string(), rank))
    }

    /// Chromosomes with the display flag set, in canonical order.
    pub fn displayed(&self) -> Vec<&Chromosome> {
        self.chromosomes.values().filter(|c| c.display).collect()
    }

    /// Sum of lengths over displayed chromosomes.
    pub fn total_displayed_bp(&self) -> u64 {
        self.displayed().iter().map(|c| c.end).sum()
    }

    /// Canonical rank of a chromosome, used as the ordering tie-break when
    /// resolving connection endpoints.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.chromosomes.get(name).map(|c| c.rank)
    }

    /// Cytobands for one chromosome, empty when none are loaded.
    pub fn cytobands_of(&self, name: &str) -> &[CytoBand] {
        self.cytobands.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tloc(chr_a: &str, pos_a: u64, chr_b: &str, pos_b: u64) -> Variant {
        Variant::new(chr_a.to_string(), pos_a, chr_b.to_string(), pos_b, VariantKind::Tloc)
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("100,200").unwrap(), (100, 200));
        assert_eq!(parse_window("5,5").unwrap(), (5, 5));
        assert!(parse_window("200,100").is_err());
        assert!(parse_window("100").is_err());
        assert!(parse_window("a,b").is_err());
    }

    #[test]
    fn test_window_falls_back_to_position() {
        let v = tloc("1", 1234, "2", 5678);
        assert_eq!(v.window_a().unwrap(), (1234, 1234));
        assert_eq!(v.window_b().unwrap(), (5678, 5678));
    }

    #[test]
    fn test_add_coverage_log_series() {
        let mut chromo = Chromosome::new("1".to_string(), 0);
        chromo.add_coverage(8.0);
        chromo.add_coverage(0.0);
        chromo.add_coverage(-1.0);
        assert_eq!(chromo.coverage, vec![8.0, 0.0, -1.0]);
        assert_eq!(chromo.coverage_log, vec![3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_connections_track_active_flag() {
        let mut chromo = Chromosome::new("1".to_string(), 0);
        let mut v = tloc("1", 100, "2", 200);
        v.info.insert("WINA".to_string(), "90,110".to_string());
        v.info.insert("WINB".to_string(), "190,210".to_string());
        chromo.variants.push(v);
        // deletions never become connections
        chromo
            .variants
            .push(Variant::new("1".to_string(), 10, "1".to_string(), 20, VariantKind::Del));

        let conns = chromo.connections();
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].window_a, (90, 110));
        assert_eq!(conns[0].window_b, (190, 210));

        chromo.variants[0].active = false;
        assert!(chromo.connections().is_empty());
    }

    #[test]
    fn test_connections_skip_malformed_windows() {
        let mut chromo = Chromosome::new("1".to_string(), 0);
        let mut v = tloc("1", 100, "2", 200);
        v.info.insert("WINA".to_string(), "not-a-window".to_string());
        chromo.variants.push(v);
        assert!(chromo.connections().is_empty());
    }

    #[test]
    fn test_unplaced_names() {
        assert!(is_unplaced("GL000220.1"));
        assert!(is_unplaced("MT"));
        assert!(!is_unplaced("X"));
        assert!(!is_unplaced("1"));
    }

    #[test]
    fn test_model_ordering_and_totals() {
        let mut model = GenomeModel::new();
        model.chromosome_or_insert("1").end = 100;
        model.chromosome_or_insert("2").end = 300;
        model.chromosome_or_insert("GL000220.1").end = 50;

        assert_eq!(model.rank("1"), Some(0));
        assert_eq!(model.rank("2"), Some(1));
        // unplaced contigs default to hidden
        assert_eq!(model.displayed().len(), 2);
        assert_eq!(model.total_displayed_bp(), 400);
    }
}
