//! Loads palette snapshots from TOML files.
//!
//! ```toml
//! version = 1
//!
//! [colors]
//! 0 = "#525252"
//! 1 = "#a8281d"
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use ballcube_core::{Palette, PaletteColor, DEFAULT_COLOR_INDEX};
use serde::Deserialize;

const SUPPORTED_PALETTE_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct PaletteFile {
    version: u32,
    colors: BTreeMap<String, String>,
}

/// Reads and validates the palette stored at `path`.
pub(crate) fn load_palette(path: &Path) -> Result<Palette> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read palette file at {}", path.display()))?;
    parse_palette(&contents)
        .with_context(|| format!("invalid palette file at {}", path.display()))
}

fn parse_palette(contents: &str) -> Result<Palette> {
    let file: PaletteFile =
        toml::from_str(contents).context("failed to parse palette toml contents")?;
    if file.version != SUPPORTED_PALETTE_VERSION {
        bail!(
            "unsupported palette version {}; expected {}",
            file.version,
            SUPPORTED_PALETTE_VERSION
        );
    }

    let mut entries = Vec::with_capacity(file.colors.len());
    for (index, color) in &file.colors {
        let index = index
            .trim()
            .parse::<u32>()
            .with_context(|| format!("palette index `{index}` is not a non-negative integer"))?;
        let color = color
            .parse::<PaletteColor>()
            .with_context(|| format!("palette entry {index} has an invalid colour"))?;
        entries.push((index, color));
    }

    let palette = Palette::from_entries(entries);
    if palette.len() != file.colors.len() {
        bail!("palette file lists the same index more than once");
    }
    if palette.get(DEFAULT_COLOR_INDEX).is_none() {
        bail!("palette file is missing the default colour at index {DEFAULT_COLOR_INDEX}");
    }
    Ok(palette)
}
