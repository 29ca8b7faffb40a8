//! Layout engines mapping genome coordinates into visual space.

pub mod circular;
pub mod connections;
pub mod karyogram;
