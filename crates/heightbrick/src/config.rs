//! # Generation Config
//!
//! Every knob of a generation run in one place.
//!
//! Values are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults ([`GenerationConfig::default`])
//! 2. An optional TOML file ([`GenerationConfig::load`])
//! 3. Explicit command line flags
//!
//! ```toml
//! heightmap = "maps/island.png"
//! colormap = "maps/island_colors.png"
//! output = "out/island.bls"
//! width = 256
//! z = 40
//! gap_fill = true
//! optimize = true
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use heightbrick_core::CoreError;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Default colormap, relative to the working directory.
pub const DEFAULT_COLORMAP: &str = "res/default/colorMap.png";
/// Default palette file.
pub const DEFAULT_COLORSET: &str = "res/default/colorSet.txt";
/// Default brick catalog.
pub const DEFAULT_BRICKS: &str = "res/default/defaultBricks.json";
/// Default output file.
pub const DEFAULT_OUTPUT: &str = "out/map.bls";
/// Default owner id written to every brick.
pub const DEFAULT_BLID: i64 = 999_999;

/// Parameters for one heightmap-to-save run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Heightmap image. Has no default.
    pub heightmap: PathBuf,
    /// Colormap image.
    pub colormap: PathBuf,
    /// Palette text file.
    pub colorset: PathBuf,
    /// Brick catalog JSON.
    pub bricks: PathBuf,
    /// Save file to write.
    pub output: PathBuf,
    /// Target width in cells; the image's own width when unset.
    pub width: Option<u32>,
    /// Target height in cells; the image's own height when unset.
    pub height: Option<u32>,
    /// Stretch heights to span this many plates above the lowest point.
    pub z: Option<u32>,
    /// Vertical step heights snap to (1 = plate, 3 = brick).
    pub step: u32,
    /// Owner BL_ID; any negative value writes no owner lines.
    pub blid: i64,
    /// Lower the map so its lowest cell sits at height 0.
    pub ground: bool,
    /// Stack bricks to cover steep drops.
    pub gap_fill: bool,
    /// Merge uniform 2x2 blocks into large bricks.
    pub optimize: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::new(),
            colormap: PathBuf::from(DEFAULT_COLORMAP),
            colorset: PathBuf::from(DEFAULT_COLORSET),
            bricks: PathBuf::from(DEFAULT_BRICKS),
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: None,
            height: None,
            z: None,
            step: 1,
            blid: DEFAULT_BLID,
            ground: false,
            gap_fill: false,
            optimize: false,
        }
    }
}

impl GenerationConfig {
    /// Parses a TOML config. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the text is not valid TOML, has unknown
    /// keys, or holds values of the wrong type.
    pub fn from_toml_str(source_name: &str, text: &str) -> AppResult<Self> {
        toml::from_str(text).map_err(|e| AppError::Config {
            path: source_name.to_string(),
            reason: e.message().to_string(),
        })
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotFound` if the file does not exist
    /// - `AppError::Config` if it cannot be parsed
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(&name, &e))?;
        let config = Self::from_toml_str(&name, &text)?;
        debug!(path = %name, "loaded generation config");
        Ok(config)
    }

    /// Checks that the config describes a runnable generation.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidParameter` for an empty path
    /// - `AppError::Config` for a zero step or zero target dimension
    pub fn validate(&self) -> AppResult<()> {
        let paths = [
            ("heightmap", &self.heightmap),
            ("colormap", &self.colormap),
            ("colorset", &self.colorset),
            ("bricks", &self.bricks),
            ("output", &self.output),
        ];
        for (what, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(CoreError::InvalidParameter(format!("{what} path must not be empty")).into());
            }
        }

        if self.step == 0 {
            return Err(invalid("step must be at least 1"));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(invalid("width and height must be positive"));
        }
        Ok(())
    }

    /// Owner id to stamp on bricks, or `None` when `blid` is negative.
    #[must_use]
    pub fn owner(&self) -> Option<u32> {
        u32::try_from(self.blid).ok()
    }
}

fn invalid(reason: &str) -> AppError {
    AppError::Config {
        path: "<settings>".to_string(),
        reason: reason.to_string(),
    }
}

fn axis(value: Option<u32>) -> String {
    value.map_or_else(|| "source".to_string(), |v| v.to_string())
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generating \"{}\" with settings:", self.output.display())?;
        writeln!(f, " [+] Heightmap:  {}", self.heightmap.display())?;
        writeln!(f, " [+] Colormap:   {}", self.colormap.display())?;
        writeln!(f, " [+] Colorset:   {}", self.colorset.display())?;
        writeln!(f, " [+] Bricks:     {}", self.bricks.display())?;
        writeln!(f, " [+] X size:     {}", axis(self.width))?;
        writeln!(f, " [+] Y size:     {}", axis(self.height))?;
        writeln!(f, " [+] Z size:     {}", axis(self.z))?;
        writeln!(f, " [+] Step:       {}", self.step)?;
        match self.owner() {
            Some(id) => writeln!(f, " [+] BL_ID:      {id}")?,
            None => writeln!(f, " [+] BL_ID:      none")?,
        }
        writeln!(f, " [+] Ground:     {}", self.ground)?;
        writeln!(f, " [+] Gap fill:   {}", self.gap_fill)?;
        write!(f, " [+] Optimize:   {}", self.optimize)
    }
}
