//! # Brick Records
//!
//! The save file's per-brick text: one position line, followed by any number
//! of `+-` metadata lines.
//!
//! ```text
//! 1x1f" 0.00 0.50 0.1 0 0 12  0 0 1 1 1
//! +-OWNER 999999
//! ```
//!
//! ## Coordinates
//!
//! Grid positions are first expressed in plate units (studs on X/Y, plates
//! on Z), then converted to save units by halving X/Y and dividing Z by 5,
//! rounded to 2 and 1 decimals. The mapping was fitted against the game for
//! 1x1 plates; merged bricks reuse it with half their footprint and a
//! catalog offset.

use std::fmt;

use serde::Deserialize;

/// Brick dimensions: studs along X and Y, plates along Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "[u32; 3]")]
pub struct BrickShape {
    /// Studs along X.
    pub x: u32,
    /// Studs along Y.
    pub y: u32,
    /// Plates along Z.
    pub z: u32,
}

impl BrickShape {
    /// Creates a shape.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl From<[u32; 3]> for BrickShape {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// A position in save units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BrickPosition {
    /// X in save units.
    pub x: f64,
    /// Y in save units.
    pub y: f64,
    /// Z in save units.
    pub z: f64,
}

impl BrickPosition {
    /// Converts a plate-unit position to save units.
    #[must_use]
    pub fn from_plate_units(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: round_to(x / 2.0, 2),
            y: round_to(y / 2.0, 2),
            z: round_to(z / 5.0, 1),
        }
    }

    /// Position of a 1x1-footprint brick at grid `(row, col)` whose top sits
    /// at `top` plates.
    #[must_use]
    pub fn small(shape: BrickShape, row: usize, col: usize, top: i64) -> Self {
        Self::from_plate_units(
            f64::from(shape.x) * row as f64,
            f64::from(shape.y) * col as f64,
            f64::from(shape.z) / 2.0 + top as f64,
        )
    }

    /// Position of a merged brick anchored at grid `(row, col)`.
    ///
    /// `offset` is already in save units and is added after conversion.
    #[must_use]
    pub fn large(shape: BrickShape, row: usize, col: usize, top: i64, offset: [f64; 2]) -> Self {
        let mut pos = Self::from_plate_units(
            f64::from(shape.x) / 2.0 * row as f64,
            f64::from(shape.y) / 2.0 * col as f64,
            f64::from(shape.z) / 2.0 + top as f64,
        );
        pos.x += offset[0];
        pos.y += offset[1];
        pos
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// One `+-EVENT` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventData {
    /// Delay in milliseconds.
    pub delay: u32,
    /// Whether the event fires.
    pub enabled: bool,
    /// Input event name.
    pub input: String,
    /// Unidentified field, usually 0.
    pub unknown: i32,
    /// Target name.
    pub target: String,
    /// Output event name.
    pub output: String,
    /// Output parameter field.
    pub output_field: i32,
}

impl Default for EventData {
    fn default() -> Self {
        Self {
            delay: 0,
            enabled: true,
            input: String::new(),
            unknown: 0,
            target: String::new(),
            output: String::new(),
            output_field: 0,
        }
    }
}

/// Metadata attached to a brick, one `+-` line each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrickData {
    /// `+-OWNER <bl_id>`.
    Owner {
        /// Owning player's BL_ID.
        bl_id: u32,
    },
    /// `+-EVENT ...`.
    Event(EventData),
    /// `+-EMITTER <ui_name> <direction>`.
    Emitter {
        /// Emitter datablock name.
        ui_name: String,
        /// Emission direction.
        direction: String,
    },
    /// `+-LIGHT <ui_name> <unknown>`.
    Light {
        /// Light datablock name.
        ui_name: String,
        /// Unidentified field, usually 1.
        unknown: i32,
    },
    /// `+-ITEM <ui_name> <direction> <position> <respawn_ms>`.
    Item {
        /// Item datablock name.
        ui_name: String,
        /// Facing direction.
        direction: i32,
        /// Placement position.
        position: i32,
        /// Respawn time in milliseconds.
        respawn_ms: u32,
    },
}

impl BrickData {
    /// `+-ITEM` with the game's usual direction, position and respawn time.
    #[must_use]
    pub fn item(ui_name: impl Into<String>) -> Self {
        Self::Item {
            ui_name: ui_name.into(),
            direction: 2,
            position: 2,
            respawn_ms: 4000,
        }
    }
}

impl fmt::Display for BrickData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner { bl_id } => writeln!(f, "+-OWNER {bl_id}"),
            Self::Event(ev) => writeln!(
                f,
                "+-EVENT {} {} {} {} {} {} {}",
                ev.delay,
                u8::from(ev.enabled),
                ev.input,
                ev.unknown,
                ev.target,
                ev.output,
                ev.output_field
            ),
            Self::Emitter { ui_name, direction } => writeln!(f, "+-EMITTER {ui_name} {direction}"),
            Self::Light { ui_name, unknown } => writeln!(f, "+-LIGHT {ui_name} {unknown}"),
            Self::Item {
                ui_name,
                direction,
                position,
                respawn_ms,
            } => writeln!(f, "+-ITEM {ui_name} {direction} {position} {respawn_ms}"),
        }
    }
}

/// One brick as written to the save file.
#[derive(Clone, Debug, PartialEq)]
pub struct BrickRecord {
    /// Catalog name; written with a trailing `"`.
    pub ui_name: String,
    /// Position in save units.
    pub position: BrickPosition,
    /// Rotation id (0-3).
    pub angle: u8,
    /// Whether the brick is a baseplate.
    pub is_baseplate: bool,
    /// Palette index.
    pub color_index: usize,
    /// Print texture name; empty for none.
    pub print_id: String,
    /// Color effect id.
    pub color_fx: u8,
    /// Shape effect id.
    pub shape_fx: u8,
    /// Whether raycasts hit the brick.
    pub raycasting: bool,
    /// Whether the brick collides.
    pub colliding: bool,
    /// Whether the brick is rendered.
    pub rendering: bool,
    /// Trailing `+-` lines, in order.
    pub data: Vec<BrickData>,
}

impl BrickRecord {
    /// A plain, unrotated, solid, visible brick.
    #[must_use]
    pub fn new(ui_name: impl Into<String>, position: BrickPosition, color_index: usize) -> Self {
        Self {
            ui_name: ui_name.into(),
            position,
            angle: 0,
            is_baseplate: false,
            color_index,
            print_id: String::new(),
            color_fx: 0,
            shape_fx: 0,
            raycasting: true,
            colliding: true,
            rendering: true,
            data: Vec::new(),
        }
    }

    /// Appends a metadata line.
    #[must_use]
    pub fn with_data(mut self, data: BrickData) -> Self {
        self.data.push(data);
        self
    }
}

impl fmt::Display for BrickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}\" {:.2} {:.2} {:.1} {} {} {} {} {} {} {} {} {}",
            self.ui_name,
            self.position.x,
            self.position.y,
            self.position.z,
            self.angle,
            u8::from(self.is_baseplate),
            self.color_index,
            self.print_id,
            self.color_fx,
            self.shape_fx,
            u8::from(self.raycasting),
            u8::from(self.colliding),
            u8::from(self.rendering),
        )?;
        for data in &self.data {
            write!(f, "{data}")?;
        }
        Ok(())
    }
}
