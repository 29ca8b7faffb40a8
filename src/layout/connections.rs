//! Connection resolution: turns active breakpoint windows into concrete
//! connector paths for the circular and karyogram layouts, with overlap-based
//! gradient coloring for converging connectors.

use log::warn;

use crate::geometry::{arc_point, Point, Rect};
use crate::layout::circular::CircularLayout;
use crate::layout::karyogram::KaryogramLayout;
use crate::model::{is_unplaced, GenomeModel};
use crate::style::{ChromosomePalette, ColorSpec};

/// The connector curve handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorPath {
    Quadratic { from: Point, ctrl: Point, to: Point },
    Straight { from: Point, to: Point },
}

impl ConnectorPath {
    pub fn from_point(&self) -> Point {
        match self {
            ConnectorPath::Quadratic { from, .. } => *from,
            ConnectorPath::Straight { from, .. } => *from,
        }
    }

    pub fn to_point(&self) -> Point {
        match self {
            ConnectorPath::Quadratic { to, .. } => *to,
            ConnectorPath::Straight { to, .. } => *to,
        }
    }
}

/// One resolved connection between two chromosomes.
#[derive(Debug, Clone)]
pub struct Connector {
    pub chr_a: String,
    pub chr_b: String,
    pub path: ConnectorPath,
    pub color: ColorSpec,
    /// 1x1 rectangle around the remote anchor, used for overlap grouping
    pub anchor: Rect,
}

/// Resolve every displayed chromosome's connections against a circular
/// allocation. Anchor points sit on the inner chromosome-ring radius scaled
/// by `scale` (the plot radius in scene units); each connector curves through
/// the diagram center.
pub fn resolve_circular(
    model: &GenomeModel,
    layout: &CircularLayout,
    palette: &ChromosomePalette,
    scale: f64,
) -> Vec<Connector> {
    let center = Point::new(0.0, 0.0);
    let radius = layout.chromosome_ring.inner * scale;
    let mut connectors = Vec::new();
    for chr_a in model.chromosomes.values() {
        if !(chr_a.display_connections && chr_a.display) {
            continue;
        }
        for conn in chr_a.connections() {
            if is_unplaced(&conn.chr_b) {
                continue;
            }
            let chr_b = match model.chromosome(&conn.chr_b) {
                Some(c) => c,
                None => {
                    warn!("connection references unknown chromosome {}", conn.chr_b);
                    continue;
                }
            };
            if !chr_b.display {
                continue;
            }
            let (sector_a, sector_b) = match (layout.sector(&chr_a.name), layout.sector(&chr_b.name)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            // WINA nominally belongs to the VCF's first-listed chromosome, so
            // when A ranks after B the windows describe the opposite sides
            let (bp_end_a, bp_end_b) = if chr_a.rank > chr_b.rank {
                (conn.window_b.1, conn.window_a.1)
            } else {
                (conn.window_a.1, conn.window_b.1)
            };
            let offset_a = angular_offset(chr_a.end, bp_end_a, sector_a.span);
            let offset_b = angular_offset(chr_b.end, bp_end_b, sector_b.span);
            let from = arc_point(center, radius, sector_a.start_angle + offset_a);
            let to = arc_point(center, radius, sector_b.start_angle + offset_b);
            connectors.push(Connector {
                chr_a: chr_a.name.clone(),
                chr_b: chr_b.name.clone(),
                path: ConnectorPath::Quadratic { from, ctrl: center, to },
                color: ColorSpec::Flat(palette.color(&chr_b.name)),
                anchor: Rect::from_center(to, 1.0, 1.0),
            });
        }
    }
    apply_overlap_gradients(&mut connectors, palette);
    connectors
}

/// Angular offset of a breakpoint inside a sector, measured over the usable
/// span (two degrees inside the allocation).
fn angular_offset(chromo_end: u64, bp_end: u64, span: f64) -> f64 {
    if chromo_end == 0 {
        return 0.0;
    }
    let frac = 1.0 - (chromo_end.saturating_sub(bp_end) as f64 / chromo_end as f64);
    frac * (span - 2.0)
}

/// Resolve connections against a karyogram allocation. Endpoints anchor on
/// the enclosing cytoband's edge at band-center height; unresolvable band
/// names drop the single connection. Intra-chromosome connectors bulge
/// sideways with alternating direction, inter-chromosome connectors are
/// straight lines.
pub fn resolve_karyogram(
    model: &GenomeModel,
    layout: &KaryogramLayout,
    palette: &ChromosomePalette,
) -> Vec<Connector> {
    let mut connectors = Vec::new();
    let mut bulge_right = true;
    for chr_a in model.chromosomes.values() {
        if !(chr_a.display_connections && chr_a.display) {
            continue;
        }
        for conn in chr_a.connections() {
            if conn.chr_b.starts_with('G') || conn.chr_b.starts_with('M') {
                continue;
            }
            let chr_b = match model.chromosome(&conn.chr_b) {
                Some(c) if c.display => c,
                _ => continue,
            };
            let (band_a, band_b) = match &conn.cytobands {
                Some(pair) => pair.clone(),
                None => {
                    // unannotated records resolve by scanning the band table;
                    // WINA belongs to the earlier-ranked chromosome, so swap
                    // the windows when A ranks after B before scanning
                    let (bp_a, bp_b) = if chr_a.rank > chr_b.rank {
                        (conn.window_b.1, conn.window_a.1)
                    } else {
                        (conn.window_a.1, conn.window_b.1)
                    };
                    match (
                        band_at(model, &chr_a.name, bp_a),
                        band_at(model, &chr_b.name, bp_b),
                    ) {
                        (Some(a), Some(b)) => (a, b),
                        _ => continue,
                    }
                }
            };
            // short intra-band events draw as a point, skip them
            if chr_a.name == chr_b.name && band_a == band_b {
                continue;
            }
            let (bar_a, bar_b) = match (layout.bar(&chr_a.name), layout.bar(&chr_b.name)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            // band names come from the VCF and may not exist in the cytoband
            // table; drop the connection and keep going
            let (shape_a, shape_b) = match (bar_a.band(&band_a), bar_b.band(&band_b)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let y_a = shape_a.rect.center().y;
            let y_b = shape_b.rect.center().y;

            let (path, remote) = if chr_a.name == chr_b.name {
                let (edge, bulge) = if bulge_right {
                    (bar_a.right(), bar_a.width * 2.0)
                } else {
                    (bar_a.left(), -bar_a.width * 2.0)
                };
                bulge_right = !bulge_right;
                let from = Point::new(edge, y_a);
                let to = Point::new(edge, y_b);
                let ctrl = Point::new(edge + bulge, (y_a + y_b) / 2.0);
                (ConnectorPath::Quadratic { from, ctrl, to }, to)
            } else {
                let from = Point::new(bar_a.right(), y_a);
                let to = Point::new(bar_b.left(), y_b);
                (ConnectorPath::Straight { from, to }, to)
            };
            connectors.push(Connector {
                chr_a: chr_a.name.clone(),
                chr_b: chr_b.name.clone(),
                path,
                color: ColorSpec::Flat(palette.color(&chr_b.name)),
                anchor: Rect::from_center(remote, 1.0, 1.0),
            });
        }
    }
    apply_overlap_gradients(&mut connectors, palette);
    connectors
}

/// Name of the band enclosing a bp position, by linear scan.
fn band_at(model: &GenomeModel, chromosome: &str, pos: u64) -> Option<String> {
    model
        .cytobands_of(chromosome)
        .iter()
        .find(|b| b.start <= pos && pos <= b.end)
        .map(|b| b.name.clone())
}

/// Recolor connectors whose remote anchors touch: each member of an
/// intersecting pair gets a linear gradient running from the full remote
/// chromosome color at the shared end to a three-times darker shade at the
/// far end.
fn apply_overlap_gradients(connectors: &mut [Connector], palette: &ChromosomePalette) {
    let mut shaded = vec![false; connectors.len()];
    for i in 0..connectors.len() {
        for j in (i + 1)..connectors.len() {
            if connectors[i].anchor.intersects(&connectors[j].anchor) {
                shaded[i] = true;
                shaded[j] = true;
            }
        }
    }
    for (conn, shade) in connectors.iter_mut().zip(shaded) {
        if shade {
            let base = palette.color(&conn.chr_b);
            conn.color = ColorSpec::Linear {
                from: conn.path.to_point(),
                to: conn.path.from_point(),
                start: base,
                end: base.darker(300),
            };
        }
    }
}
