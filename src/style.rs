//! Color definitions for layout output.
//!
//! Engines emit color *specifications*; turning them into pens/brushes is the
//! renderer's job.

use crate::geometry::Point;
use crate::model::Stain;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Return this color darkened by `factor` percent: each channel is scaled
    /// by `100/factor`, so `darker(300)` is one third of the brightness and
    /// `darker(100)` is the identity.
    pub fn darker(&self, factor: u32) -> Color {
        let factor = factor.max(1);
        let scale = |c: u8| ((c as u32 * 100) / factor).min(255) as u8;
        Color::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    /// CSS-style hex string, e.g. "#f3f1ac".
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const DARK_RED: Color = Color::rgb(128, 0, 0);
    pub const GRAY: Color = Color::rgb(160, 160, 160);
    pub const LIGHT_GRAY: Color = Color::rgb(211, 211, 211);
    pub const DARK_GRAY: Color = Color::rgb(96, 96, 96);
}

/// How a connector (or any shape) should be filled.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Flat(Color),
    /// Linear gradient between two anchor points.
    Linear {
        from: Point,
        to: Point,
        start: Color,
        end: Color,
    },
}

/// Fill color for a cytoband stain.
pub fn stain_color(stain: Stain) -> Color {
    match stain {
        Stain::Acen => Color::DARK_RED,
        Stain::Gneg => Color::WHITE,
        Stain::Gpos25 => Color::LIGHT_GRAY,
        Stain::Gpos50 => Color::GRAY,
        Stain::Gpos75 => Color::DARK_GRAY,
        Stain::Gpos100 => Color::BLACK,
        Stain::Gvar => Color::WHITE,
        Stain::Stalk => Color::RED,
    }
}

/// Per-chromosome color assignment: a fixed start color, each following
/// chromosome slightly darker, walking the dataset in canonical order.
#[derive(Debug, Clone)]
pub struct ChromosomePalette {
    colors: Vec<(String, Color)>,
}

/// Start of the chromosome color cycle.
const CYCLE_START: Color = Color::rgb(243, 241, 172);

impl ChromosomePalette {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut color = CYCLE_START;
        let mut colors = Vec::new();
        for name in names {
            colors.push((name.into(), color));
            color = color.darker(105);
        }
        ChromosomePalette { colors }
    }

    pub fn color(&self, name: &str) -> Color {
        self.colors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
            .unwrap_or(Color::GRAY)
    }
}
