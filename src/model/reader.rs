//! Dataset loading: coverage TAB files, structural-variant VCF files and
//! cytoband tables.
//!
//! TAB format: header line starting `#CHR`, then `chrom\tstart\tend\tcoverage`
//! runs ordered by chromosome. VCF INFO sub-fields of interest are END, CHRA,
//! CHRB, WINA, WINB, CYTOBAND and CSQ (gene names in the fourth `|` field).
//! Cytoband format: `chr\tstart\tend\tband\tstain`, first line starting `chr1`.

use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{SvError, SvResult};
use crate::model::{CytoBand, GenomeModel, Stain, Variant, VariantKind};

/// Read a coverage TAB file into a fresh model.
///
/// Each data line contributes one raw coverage sample to its chromosome; the
/// chromosome length is taken from the last seen `end` column. Genome-wide
/// coverage norms are accumulated over every line.
pub fn read_coverage_tab<R: BufRead>(reader: R) -> SvResult<GenomeModel> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| SvError::InvalidFormat("coverage file is empty".to_string()))?;
    if !header.starts_with("#CHR") {
        return Err(SvError::InvalidFormat(
            "coverage file does not start with a #CHR header".to_string(),
        ));
    }

    let mut model = GenomeModel::new();
    let mut total_lines = 0usize;
    let mut norm_sum = 0.0;
    let mut norm_log_sum = 0.0;
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
            return Err(SvError::InvalidFormat(format!(
                "coverage line {} has {} fields, expected 4",
                lineno + 2,
                fields.len()
            )));
        }
        let end: u64 = fields[2].parse().map_err(|_| {
            SvError::InvalidFormat(format!("bad end position '{}' on line {}", fields[2], lineno + 2))
        })?;
        let value: f64 = fields[3].trim().parse().map_err(|_| {
            SvError::InvalidFormat(format!("bad coverage '{}' on line {}", fields[3], lineno + 2))
        })?;

        let chromo = model.chromosome_or_insert(fields[0]);
        chromo.add_coverage(value);
        // runs are position-ordered, so the last end seen is the length
        chromo.end = chromo.end.max(end);

        norm_sum += value;
        if value > 0.0 {
            norm_log_sum += value.log2();
        }
        total_lines += 1;
    }
    if total_lines == 0 {
        return Err(SvError::InvalidFormat("coverage file has no data lines".to_string()));
    }
    model.coverage_norm = norm_sum / total_lines as f64;
    model.coverage_norm_log = norm_log_sum / total_lines as f64;
    info!(
        "read {} chromosomes over {} coverage windows, norm {:.3}",
        model.chromosomes.len(),
        total_lines,
        model.coverage_norm
    );
    Ok(model)
}

/// Read a coverage TAB file from disk.
pub fn load_coverage_tab<P: AsRef<Path>>(path: P) -> SvResult<GenomeModel> {
    let file = File::open(path)?;
    read_coverage_tab(BufReader::new(file))
}

/// Read structural variants from a VCF stream into an existing model.
///
/// Returns the number of variants added. Records on chromosomes the coverage
/// file did not declare are skipped with a warning.
pub fn read_vcf_into<R: BufRead>(reader: R, model: &mut GenomeModel) -> SvResult<usize> {
    let mut lines = reader.lines();
    let first = lines
        .next()
        .transpose()?
        .ok_or_else(|| SvError::InvalidFormat("VCF file is empty".to_string()))?;
    if !first.starts_with("##fileformat=") {
        return Err(SvError::InvalidFormat(
            "VCF file does not start with ##fileformat".to_string(),
        ));
    }

    let mut added = 0usize;
    let mut seen_header = false;
    for line in lines {
        let line = line?;
        if line.starts_with("##") || line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            seen_header = true;
            continue;
        }
        if !seen_header {
            return Err(SvError::InvalidFormat("VCF data before #CHROM header".to_string()));
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            return Err(SvError::InvalidFormat(format!(
                "VCF record has {} fields, expected at least 8",
                fields.len()
            )));
        }
        let chrom = fields[0];
        if model.chromosome(chrom).is_none() {
            warn!("VCF record on unknown chromosome {}, skipping", chrom);
            continue;
        }
        let pos: u64 = fields[1].parse().map_err(|_| {
            SvError::InvalidFormat(format!("bad POS '{}' in VCF record", fields[1]))
        })?;
        let alt = fields[4].trim_start_matches('<').trim_end_matches('>');
        let (info, genes) = parse_info(fields[7]);

        let chr_b = info.get("CHRB").cloned().unwrap_or_else(|| chrom.to_string());
        let pos_b = match info.get("END") {
            Some(end) if end != "." => end.parse().unwrap_or(pos),
            _ => pos,
        };
        let kind = match variant_kind(alt, &info, chrom, &chr_b) {
            Some(k) => k,
            None => {
                warn!("unrecognized variant type '{}' on {}:{}, skipping", alt, chrom, pos);
                continue;
            }
        };

        let mut variant = Variant::new(chrom.to_string(), pos, chr_b, pos_b, kind);
        variant.cytoband = info.get("CYTOBAND").cloned();
        variant.rank_score = info
            .get("RankScore")
            .and_then(|r| r.rsplit(':').next())
            .and_then(|r| r.parse().ok());
        variant.genes = genes;
        variant.info = info;

        if let Some(chromo) = model.chromosome_mut(chrom) {
            chromo.variants.push(variant);
            added += 1;
        }
    }
    debug!("read {} variants from VCF", added);
    Ok(added)
}

/// Read structural variants from a VCF file on disk.
pub fn load_vcf_into<P: AsRef<Path>>(path: P, model: &mut GenomeModel) -> SvResult<usize> {
    let file = File::open(path)?;
    read_vcf_into(BufReader::new(file), model)
}

/// Split an INFO column into tag -> value pairs, extracting the deduplicated
/// gene list from any CSQ annotation.
fn parse_info(raw: &str) -> (HashMap<String, String>, Vec<String>) {
    let mut info = HashMap::new();
    let mut genes = Vec::new();
    for entry in raw.split(';') {
        let (tag, value) = match entry.split_once('=') {
            Some(pair) => pair,
            None => (entry, ""),
        };
        if tag == "CSQ" {
            // gene symbol is the fourth pipe-separated field of each
            // comma-separated consequence
            let set: BTreeSet<&str> = value
                .split(',')
                .filter_map(|csq| csq.split('|').nth(3))
                .filter(|g| !g.is_empty())
                .collect();
            genes = set.into_iter().map(str::to_string).collect();
        }
        info.insert(tag.to_string(), value.to_string());
    }
    (info, genes)
}

fn variant_kind(alt: &str, info: &HashMap<String, String>, chr_a: &str, chr_b: &str) -> Option<VariantKind> {
    if let Some(kind) = info.get("SVTYPE").and_then(|t| VariantKind::parse(t)) {
        return Some(kind);
    }
    if let Some(kind) = VariantKind::parse(alt) {
        return Some(kind);
    }
    // breakend notation spells the mate position inside the ALT allele
    if alt.starts_with('N') || alt.contains('[') || alt.contains(']') {
        return Some(VariantKind::Bnd);
    }
    if chr_a != chr_b {
        return Some(VariantKind::Tloc);
    }
    None
}

/// Read a cytoband table into the model, keyed by chromosome name with the
/// leading "chr" prefix stripped. Bands with unknown stain values are skipped.
pub fn read_cytobands_into<R: BufRead>(reader: R, model: &mut GenomeModel) -> SvResult<usize> {
    let mut added = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if lineno == 0 && !line.starts_with("chr1") {
            return Err(SvError::InvalidFormat(
                "cytoband file does not start with chr1".to_string(),
            ));
        }
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            return Err(SvError::InvalidFormat(format!(
                "cytoband line {} has {} fields, expected 5",
                lineno + 1,
                fields.len()
            )));
        }
        let name = fields[0].trim_start_matches("chr").to_string();
        let start: u64 = fields[1].parse().map_err(|_| {
            SvError::InvalidFormat(format!("bad cytoband start '{}' on line {}", fields[1], lineno + 1))
        })?;
        let end: u64 = fields[2].parse().map_err(|_| {
            SvError::InvalidFormat(format!("bad cytoband end '{}' on line {}", fields[2], lineno + 1))
        })?;
        if end < start {
            warn!("cytoband range {}-{} inverted on line {}, skipping", start, end, lineno + 1);
            continue;
        }
        let stain = match Stain::parse(fields[4].trim()) {
            Some(s) => s,
            None => {
                warn!("unknown stain '{}' on cytoband line {}, skipping", fields[4], lineno + 1);
                continue;
            }
        };
        model.cytobands.entry(name).or_default().push(CytoBand {
            start,
            end,
            name: fields[3].to_string(),
            stain,
        });
        added += 1;
    }
    // lookups assume position order within each chromosome
    for bands in model.cytobands.values_mut() {
        bands.sort_by_key(|b| b.start);
    }
    Ok(added)
}

/// Read a cytoband table from disk.
pub fn load_cytobands_into<P: AsRef<Path>>(path: P, model: &mut GenomeModel) -> SvResult<usize> {
    let file = File::open(path)?;
    read_cytobands_into(BufReader::new(file), model)
}
