//! Unified configuration system for layout and aggregation.
//!
//! This module provides structs and loading functions for:
//! - Coverage aggregation parameters
//! - Circular and karyogram layout geometry
//! - Heatmap binning and zoom

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

// ============================================================================
// Coverage Configuration
// ============================================================================

/// Coverage aggregation parameters shared by the circular and linear views
#[derive(Deserialize, Debug, Clone)]
pub struct CoverageConfig {
    /// Samples per aggregation chunk
    #[serde(default = "default_bp_window")]
    pub bp_window: usize,
    /// Clamp floor as a fraction of the dataset norm
    #[serde(default = "default_min_frac")]
    pub min_frac: f64,
    /// Clamp ceiling as a fraction of the dataset norm
    #[serde(default = "default_max_frac")]
    pub max_frac: f64,
    /// Use the log2 coverage series instead of raw depth
    #[serde(default = "default_use_log")]
    pub use_log: bool,
}

fn default_bp_window() -> usize { 100 }
fn default_min_frac() -> f64 { 0.0 }
fn default_max_frac() -> f64 { 5.0 }
fn default_use_log() -> bool { true }

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            bp_window: default_bp_window(),
            min_frac: default_min_frac(),
            max_frac: default_max_frac(),
            use_log: default_use_log(),
        }
    }
}

// ============================================================================
// Circular Layout Configuration
// ============================================================================

/// A concentric ring expressed in unit radii (1.0 = outer edge of the plot)
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct RingConfig {
    pub outer: f64,
    pub inner: f64,
}

/// Circular (circos-style) layout configuration
#[derive(Deserialize, Debug, Clone)]
pub struct CircularConfig {
    /// Visual gap between adjacent chromosome arcs, in degrees
    #[serde(default = "default_gap_degrees")]
    pub gap_degrees: f64,
    /// Chromosome band ring
    #[serde(default = "default_chromosome_ring")]
    pub chromosome_ring: RingConfig,
    /// Coverage ring, nested inside the chromosome band
    #[serde(default = "default_coverage_ring")]
    pub coverage_ring: RingConfig,
    /// Thickness of each stacked annotation layer, in unit radii
    #[serde(default = "default_layer_thickness")]
    pub layer_thickness: f64,
    /// Radial gap between stacked annotation layers
    #[serde(default = "default_layer_gap")]
    pub layer_gap: f64,
    /// Distance marker resolution in megabases
    #[serde(default = "default_distance_resolution_mb")]
    pub distance_resolution_mb: f64,
    /// Minimum annotation region length to lay out, in kilobases
    #[serde(default = "default_min_region_kb")]
    pub min_region_kb: f64,
    /// Coverage aggregation for the radial ring
    #[serde(default)]
    pub coverage: CoverageConfig,
}

fn default_gap_degrees() -> f64 { 1.0 }
fn default_chromosome_ring() -> RingConfig { RingConfig { outer: 1.0, inner: 0.86 } }
fn default_coverage_ring() -> RingConfig { RingConfig { outer: 0.80, inner: 0.64 } }
fn default_layer_thickness() -> f64 { 0.05 }
fn default_layer_gap() -> f64 { 0.01 }
fn default_distance_resolution_mb() -> f64 { 10.0 }
fn default_min_region_kb() -> f64 { 0.0 }

impl Default for CircularConfig {
    fn default() -> Self {
        Self {
            gap_degrees: default_gap_degrees(),
            chromosome_ring: default_chromosome_ring(),
            coverage_ring: default_coverage_ring(),
            layer_thickness: default_layer_thickness(),
            layer_gap: default_layer_gap(),
            distance_resolution_mb: default_distance_resolution_mb(),
            min_region_kb: default_min_region_kb(),
            coverage: CoverageConfig::default(),
        }
    }
}

// ============================================================================
// Karyogram Layout Configuration
// ============================================================================

/// Karyogram (linear ideogram grid) layout configuration
#[derive(Deserialize, Debug, Clone)]
pub struct KaryogramConfig {
    /// Chromosomes per row before wrapping
    #[serde(default = "default_items_per_row")]
    pub items_per_row: usize,
    /// Vertical margin between rows, in scene units
    #[serde(default = "default_row_margin")]
    pub row_margin: f64,
    /// Height of a full-length chromosome bar
    #[serde(default = "default_column_height")]
    pub column_height: f64,
    /// Width of each chromosome bar
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    /// Horizontal spacing between bars
    #[serde(default = "default_x_spacing")]
    pub x_spacing: f64,
}

fn default_items_per_row() -> usize { 12 }
fn default_row_margin() -> f64 { 40.0 }
fn default_column_height() -> f64 { 400.0 }
fn default_bar_width() -> f64 { 24.0 }
fn default_x_spacing() -> f64 { 60.0 }

impl Default for KaryogramConfig {
    fn default() -> Self {
        Self {
            items_per_row: default_items_per_row(),
            row_margin: default_row_margin(),
            column_height: default_column_height(),
            bar_width: default_bar_width(),
            x_spacing: default_x_spacing(),
        }
    }
}

// ============================================================================
// Heatmap Configuration
// ============================================================================

/// Heatmap binning configuration
#[derive(Deserialize, Debug, Clone)]
pub struct HeatmapConfig {
    /// Number of output bins along each axis when zooming into a selection
    #[serde(default = "default_zoom_bins")]
    pub zoom_bins: usize,
}

fn default_zoom_bins() -> usize { 10 }

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            zoom_bins: default_zoom_bins(),
        }
    }
}

// ============================================================================
// Top-Level View Configuration
// ============================================================================

/// All view configurations
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ViewConfig {
    #[serde(default)]
    pub circular: CircularConfig,
    #[serde(default)]
    pub karyogram: KaryogramConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub coverage: CoverageConfig,
}

impl ViewConfig {
    /// Load view configuration from a JSON file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: ViewConfig = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }
}
