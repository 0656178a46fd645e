//! Privilege bits carried by a PrivateMapKey.
//!
//! Only the low 8 bits are defined; the field is written as a full 32-bit
//! big-endian word.

use std::ops::{BitOr, BitOrAssign};

/// A set of room privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrivilegeMap(u32);

impl PrivilegeMap {
    /// No privileges.
    pub const NONE: Self = Self(0);
    /// Create the room.
    pub const CREATE_ROOM: Self = Self(1);
    /// Enter the room.
    pub const ENTER_ROOM: Self = Self(1 << 1);
    /// Publish audio.
    pub const SEND_AUDIO: Self = Self(1 << 2);
    /// Receive audio.
    pub const RECV_AUDIO: Self = Self(1 << 3);
    /// Publish video.
    pub const SEND_VIDEO: Self = Self(1 << 4);
    /// Receive video.
    pub const RECV_VIDEO: Self = Self(1 << 5);
    /// Publish the sub stream (screen share).
    pub const SEND_SUB_VIDEO: Self = Self(1 << 6);
    /// Receive the sub stream (screen share).
    pub const RECV_SUB_VIDEO: Self = Self(1 << 7);
    /// Every defined privilege.
    pub const ALL: Self = Self(0xff);

    /// Wrap raw bits. Undefined high bits are kept as-is.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits as written into the permission buffer.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl From<u32> for PrivilegeMap {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<PrivilegeMap> for u32 {
    fn from(p: PrivilegeMap) -> Self {
        p.0
    }
}

impl BitOr for PrivilegeMap {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PrivilegeMap {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_union_of_every_bit() {
        let every = PrivilegeMap::CREATE_ROOM
            | PrivilegeMap::ENTER_ROOM
            | PrivilegeMap::SEND_AUDIO
            | PrivilegeMap::RECV_AUDIO
            | PrivilegeMap::SEND_VIDEO
            | PrivilegeMap::RECV_VIDEO
            | PrivilegeMap::SEND_SUB_VIDEO
            | PrivilegeMap::RECV_SUB_VIDEO;
        assert_eq!(every, PrivilegeMap::ALL);
        assert_eq!(every.bits(), 255);
    }

    #[test]
    fn enter_and_receive_is_42() {
        let mut p = PrivilegeMap::ENTER_ROOM;
        p |= PrivilegeMap::RECV_AUDIO;
        p |= PrivilegeMap::RECV_VIDEO;
        assert_eq!(p.bits(), 42);
        assert!(p.contains(PrivilegeMap::RECV_AUDIO));
        assert!(!p.contains(PrivilegeMap::SEND_AUDIO));
    }
}
