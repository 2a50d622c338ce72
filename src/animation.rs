use crate::{Rotator, Vector3};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use num_enum::{FromPrimitive, IntoPrimitive};

/// Most key markers a single animation may carry.
pub const MAX_KEY_MARKERS: usize = 16;

bitflags! {
    /// Playback flags of a keyframe animation. An empty set means plain looping.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct AnimationFlags: u32 {
        const PAUSES_ON_FIRST_FRAME = 0x1;
        const DOES_NOT_LOOP         = 0x2;
        const PAUSES_ON_LAST_FRAME  = 0x4;
        const RESTART_IF_PLAYING    = 0x8;
        const FINISH_IN_GIVEN_TIME  = 0x10;
        const END_SMOOTHLY          = 0x20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct KeyframeFlags: u32 {
        const POSITION_CHANGE = 0x1;
        const ROTATION_CHANGE = 0x2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum KeyMarkerKind {
    LeftFootstep = 1,
    RightFootstep = 2,
    ActivateBin = 3,
    SaberUnknown1 = 4,
    SaberUnknown2 = 5,
    SwimLeft = 6,
    LeftRunFootstep = 8,
    RightRunFootstep = 9,
    Death = 10,
    SwimRight = 13,
    #[num_enum(catch_all)]
    Unknown(u32),
}

/// A timed event on the animation track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMarker {
    pub frame: f32,
    pub kind: KeyMarkerKind,
}

/// One sampled key of a node track: placement plus first derivatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct KeyNodeEntry {
    pub frame: u32,
    pub flags: u32,
    pub pos: Vector3,
    pub dpos: Vector3,
    pub rot: Rotator,
    pub drot: Rotator,
}

static_assertions::const_assert_eq!(std::mem::size_of::<KeyNodeEntry>(), 56);

impl KeyNodeEntry {
    pub fn flags(&self) -> KeyframeFlags {
        KeyframeFlags::from_bits_retain(self.flags)
    }
}

/// Binds an animation track to a mesh node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyNode {
    pub mesh_name: String,
    pub node: u32,
    pub entries: Vec<KeyNodeEntry>,
}

/// A keyframe set loaded from a KEY file or a container keyframes section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    pub flags: AnimationFlags,
    pub kind: u32,
    pub frames: u32,
    pub fps: f32,
    pub joints: u32,
    pub markers: Vec<KeyMarker>,
    pub nodes: Vec<KeyNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_kind_is_lossless_for_unknown_values() {
        let kind = KeyMarkerKind::from(77u32);
        assert_eq!(kind, KeyMarkerKind::Unknown(77));
        assert_eq!(u32::from(kind), 77);
        assert_eq!(u32::from(KeyMarkerKind::Death), 10);
    }
}
