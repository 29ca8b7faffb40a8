//! Genome-coordinate-to-visual-space mapping and aggregation.
//!
//! Turns chromosome lengths, per-window coverage samples and structural
//! variant breakpoints into normalized geometric output: circular sector
//! allocations, karyogram band grids, connector curves and binned interaction
//! matrices. Rendering is left to the consumer.

pub mod config;
pub mod coverage;
pub mod error;
pub mod geometry;
pub mod heatmap;
pub mod layout;
pub mod model;
pub mod style;

pub use error::{SvError, SvResult};
pub use model::GenomeModel;
