//! Composite values shared by many message layouts.
//!
//! A character ID and a map location show up in most monitor messages,
//! so they encode and decode themselves instead of every message
//! repeating the same field sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Reader, WireError, Writer};

/// A value that can write itself into a frame payload.
pub trait WireEncode {
    fn encode(&self, writer: &mut Writer<'_>);
}

/// A value that can read itself out of a frame payload.
pub trait WireDecode: Sized {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError>;
}

// ---------------------------------------------------------------------------
// CharacterId
// ---------------------------------------------------------------------------

/// Server-assigned identifier of a character (player or NPC).
///
/// Sent as an unsigned 32-bit integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

impl WireEncode for CharacterId {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.write_uint(self.0);
    }
}

impl WireDecode for CharacterId {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self(reader.read_uint()?))
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A tile position on the game map.
///
/// Sent as three signed 16-bit values in `x, y, z` order; `z` is the
/// map level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Location {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Location {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl WireEncode for Location {
    fn encode(&self, writer: &mut Writer<'_>) {
        writer.write_short(self.x);
        writer.write_short(self.y);
        writer.write_short(self.z);
    }
}

impl WireDecode for Location {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            x: reader.read_short()?,
            y: reader.read_short()?,
            z: reader.read_short()?,
        })
    }
}
