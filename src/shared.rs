use crate::{CndError, Result, StringError};
use arrayvec::ArrayString;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn iter(&self) -> impl Iterator<Item = f32> {
        [self.x, self.y, self.z].into_iter()
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(vector: Vector3) -> Self {
        [vector.x, vector.y, vector.z]
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(vector: [f32; 3]) -> Self {
        Vector3 {
            x: vector[0],
            y: vector[1],
            z: vector[2],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// Pitch/yaw/roll orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Box3 {
    pub min: Vector3,
    pub max: Vector3,
}

/// Four-stop color ramp used for actor voice tinting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct GradientColor {
    pub stops: [LinearColor; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<Vector3>(), 12);
static_assertions::const_assert_eq!(std::mem::size_of::<Vector2>(), 8);
static_assertions::const_assert_eq!(std::mem::size_of::<GradientColor>(), 64);

/// Fixed capacity, null-padded string field.
///
/// On-disk name fields reserve `LEN` bytes and keep the last byte zero, so at
/// most `LEN - 1` visible characters fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedString<const LEN: usize>(ArrayString<LEN>);

impl<const LEN: usize> FixedString<LEN> {
    /// Builds a fixed string from an owned field buffer, trimming at the first
    /// null byte and dropping trailing whitespace.
    pub fn from_field(buf: &[u8; LEN]) -> Result<Self> {
        let end = buf.iter().position(|&c| c == 0).unwrap_or(LEN);
        let name = std::str::from_utf8(&buf[..end]).map_err(StringError::NonUtf8)?;
        let name = name.trim_end();
        Ok(FixedString(ArrayString::from(name).expect("trimmed field fits its own buffer")))
    }

    pub fn new(value: &str) -> Result<Self> {
        if value.len() > LEN - 1 {
            return Err(StringError::TooLong {
                len: value.len(),
                capacity: LEN,
            }
            .into());
        }
        Ok(FixedString(
            ArrayString::from(value).expect("length checked above"),
        ))
    }

    /// The null-padded on-disk representation.
    pub fn to_field(&self) -> [u8; LEN] {
        let mut buf = [0u8; LEN];
        buf[..self.0.len()].copy_from_slice(self.0.as_bytes());
        buf
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const LEN: usize> AsRef<str> for FixedString<LEN> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const LEN: usize> Display for FixedString<LEN> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// 64 byte resource name field used throughout the container.
pub type ResourceName = FixedString<64>;

pub(crate) fn decode_name(buf: &[u8; 64]) -> Result<String> {
    Ok(ResourceName::from_field(buf)?.as_str().to_owned())
}

pub(crate) fn encode_name(function: &'static str, name: &str) -> Result<[u8; 64]> {
    ResourceName::new(name)
        .map(|name| name.to_field())
        .map_err(|_| {
            CndError::format(function, format!("resource name '{name}' is too long"))
        })
}

/// Maps the on-disk `-1` index sentinel to an in-memory optional index.
pub fn idx_from_raw(idx: i32) -> Option<usize> {
    (idx > -1).then(|| idx as usize)
}

pub fn idx_to_raw(idx: Option<usize>) -> i32 {
    idx.map(|idx| idx as i32).unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_string_round_trip() {
        let name = FixedString::<64>::new("gen_vines_mossy.mat").unwrap();
        let field = name.to_field();
        assert_eq!(field[19], 0);
        assert_eq!(FixedString::<64>::from_field(&field).unwrap(), name);
    }

    #[test]
    fn fixed_string_max_len() {
        let longest = "a".repeat(63);
        let name = FixedString::<64>::new(&longest).unwrap();
        assert_eq!(FixedString::<64>::from_field(&name.to_field()).unwrap().as_str(), longest);
        assert!(FixedString::<64>::new(&"a".repeat(64)).is_err());
    }

    #[test]
    fn fixed_string_trims_whitespace() {
        let mut field = [0u8; 64];
        field[..6].copy_from_slice(b"walk  ");
        assert_eq!(FixedString::<64>::from_field(&field).unwrap().as_str(), "walk");
    }

    #[test]
    fn idx_sentinel() {
        assert_eq!(idx_from_raw(-1), None);
        assert_eq!(idx_from_raw(3), Some(3));
        assert_eq!(idx_to_raw(None), -1);
        assert_eq!(idx_to_raw(Some(3)), 3);
    }
}
