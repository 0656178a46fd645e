//! Permission buffer ("userbuf") encoding.
//!
//! Layout, all integers big-endian:
//!
//! | size | field                                          |
//! |------|------------------------------------------------|
//! | 1    | version: 1 with a room code, else 0            |
//! | 2    | identifier length                              |
//! | N    | identifier, one byte per character             |
//! | 4    | sdkappid                                       |
//! | 4    | numeric room id (0 with a room code)           |
//! | 4    | absolute expiry (issue time + expire-after)    |
//! | 4    | privilege map                                  |
//! | 4    | account type                                   |
//! | 2    | room code length (room code only)              |
//! | R    | room code, one byte per character (room code only) |
//!
//! Characters are taken as UTF-16 code units and truncated to their low byte;
//! lengths count code units. Every integer wraps instead of failing.

use crate::privilege::PrivilegeMap;

/// Size of the fields that do not depend on the identifier or room code.
const FIXED_LEN: usize = 1 + 2 + 4 * 5;

/// The room a PrivateMapKey is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Room<'a> {
    /// Numeric room id.
    Id(u32),
    /// String room id.
    Code(&'a str),
}

/// Room permissions embedded in a PrivateMapKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission<'a> {
    /// Target room.
    pub room: Room<'a>,
    /// Granted privileges.
    pub privilege_map: PrivilegeMap,
    /// Account type tag, 0 for regular accounts.
    pub account_type: u32,
}

impl<'a> Permission<'a> {
    /// Permission for a numeric room with account type 0.
    pub fn room_id(room_id: u32, privilege_map: impl Into<PrivilegeMap>) -> Self {
        Self {
            room: Room::Id(room_id),
            privilege_map: privilege_map.into(),
            account_type: 0,
        }
    }

    /// Permission for a string room with account type 0.
    pub fn room_code(room_code: &'a str, privilege_map: impl Into<PrivilegeMap>) -> Self {
        Self {
            room: Room::Code(room_code),
            privilege_map: privilege_map.into(),
            account_type: 0,
        }
    }
}

/// Encode the permission buffer for `identifier`.
///
/// `issue_time` must be the same reading used for the signed envelope.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_userbuf(
    identifier: &str,
    sdkappid: u64,
    permission: &Permission<'_>,
    issue_time: u64,
    expire_after: u64,
) -> Vec<u8> {
    let account: Vec<u16> = identifier.encode_utf16().collect();
    let room_code: Option<Vec<u16>> = match permission.room {
        Room::Code(code) => Some(code.encode_utf16().collect()),
        Room::Id(_) => None,
    };

    let len = FIXED_LEN + account.len() + room_code.as_ref().map_or(0, |c| 2 + c.len());
    let mut buf = Vec::with_capacity(len);

    buf.push(u8::from(room_code.is_some()));
    put_str(&mut buf, &account);

    buf.extend_from_slice(&(sdkappid as u32).to_be_bytes());
    let room_id = match permission.room {
        Room::Id(id) => id,
        Room::Code(_) => 0,
    };
    buf.extend_from_slice(&room_id.to_be_bytes());
    buf.extend_from_slice(&(issue_time.wrapping_add(expire_after) as u32).to_be_bytes());
    buf.extend_from_slice(&permission.privilege_map.bits().to_be_bytes());
    buf.extend_from_slice(&permission.account_type.to_be_bytes());

    // Tail carries the room code itself, never the identifier's bytes.
    if let Some(code) = &room_code {
        put_str(&mut buf, code);
    }

    debug_assert_eq!(buf.len(), len);
    buf
}

/// Offset of the privilege map for an identifier of `identifier_len` code units.
pub fn privilege_offset(identifier_len: usize) -> usize {
    1 + 2 + identifier_len + 4 * 3
}

#[allow(clippy::cast_possible_truncation)]
fn put_str(buf: &mut Vec<u8>, units: &[u16]) {
    buf.extend_from_slice(&(units.len() as u16).to_be_bytes());
    buf.extend(units.iter().map(|&u| u as u8));
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: u64 = 1_400_000_001;
    const NOW: u64 = 1_700_000_000;

    #[test]
    fn numeric_room_layout() {
        let p = Permission::room_id(1234, 255u32);
        let buf = encode_userbuf("ab", APP, &p, NOW, 300);

        let mut expected = vec![0u8, 0, 2, b'a', b'b'];
        expected.extend_from_slice(&1_400_000_001u32.to_be_bytes());
        expected.extend_from_slice(&[0, 0, 0x04, 0xd2]);
        expected.extend_from_slice(&1_700_000_300u32.to_be_bytes());
        expected.extend_from_slice(&[0, 0, 0, 0xff]);
        expected.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn room_code_layout() {
        let p = Permission::room_code("room-7", PrivilegeMap::ENTER_ROOM);
        let buf = encode_userbuf("user1", APP, &p, NOW, 60);

        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..3], &[0, 5]);
        assert_eq!(&buf[3..8], b"user1");
        // numeric room id is zeroed
        assert_eq!(&buf[12..16], &[0, 0, 0, 0]);
        let tail = &buf[buf.len() - 8..];
        assert_eq!(&tail[..2], &[0, 6]);
        assert_eq!(&tail[2..], b"room-7");
    }

    #[test]
    fn length_law() {
        for id in ["", "a", "alice", "a-much-longer-identifier_0123456789"] {
            let l = id.len();
            let plain = encode_userbuf(id, APP, &Permission::room_id(1, 255u32), NOW, 1);
            assert_eq!(plain.len(), 23 + l);
            for code in ["", "r", "room-code"] {
                let r = code.len();
                let coded = encode_userbuf(id, APP, &Permission::room_code(code, 255u32), NOW, 1);
                assert_eq!(coded.len(), 25 + l + r);
            }
        }
    }

    #[test]
    fn privileges_differ_only_in_privilege_word() {
        let all = encode_userbuf("alice", APP, &Permission::room_id(9, 255u32), NOW, 86400);
        let some = encode_userbuf("alice", APP, &Permission::room_id(9, 42u32), NOW, 86400);
        assert_eq!(all.len(), some.len());

        let off = privilege_offset(5);
        let diff: Vec<usize> = (0..all.len()).filter(|&i| all[i] != some[i]).collect();
        assert!(diff.iter().all(|i| (off..off + 4).contains(i)), "{diff:?}");
        assert_eq!(&all[off..off + 4], &[0, 0, 0, 255]);
        assert_eq!(&some[off..off + 4], &[0, 0, 0, 42]);
    }

    #[test]
    fn wide_values_wrap() {
        let p = Permission {
            room: Room::Id(u32::MAX),
            privilege_map: PrivilegeMap::from_bits(0x1234_56ff),
            account_type: 7,
        };
        let sdkappid = (1u64 << 32) | 0x0102_0304;
        let buf = encode_userbuf("x", sdkappid, &p, u64::from(u32::MAX), 2);
        assert_eq!(&buf[4..8], &[1, 2, 3, 4]);
        assert_eq!(&buf[8..12], &[0xff; 4]);
        // (2^32 - 1) + 2 wraps to 1
        assert_eq!(&buf[12..16], &[0, 0, 0, 1]);
        assert_eq!(&buf[16..20], &[0x12, 0x34, 0x56, 0xff]);
        assert_eq!(&buf[20..24], &[0, 0, 0, 7]);
    }

    #[test]
    fn length_fields_wrap_at_16_bits() {
        let id = "a".repeat(65_537);
        let code = "r".repeat(65_538);
        let buf = encode_userbuf(&id, 1, &Permission::room_code(&code, 255u32), 0, 0);
        assert_eq!(buf.len(), 25 + 65_537 + 65_538);
        assert_eq!(&buf[1..3], &[0, 1]);
        let tail = 23 + 65_537;
        assert_eq!(&buf[tail..tail + 2], &[0, 2]);
        assert!(buf[tail + 2..].iter().all(|&b| b == b'r'));

        let buf = encode_userbuf(&id, 1, &Permission::room_code("r", 255u32), 0, 0);
        assert_eq!(buf.len(), 65_563);
    }

    #[test]
    fn non_ascii_is_truncated_per_code_unit() {
        // U+0101 truncates to 0x01; length counts one code unit.
        let buf = encode_userbuf("\u{101}", APP, &Permission::room_id(0, 0u32), NOW, 0);
        assert_eq!(&buf[1..4], &[0, 1, 0x01]);
        assert_eq!(buf.len(), 24);
    }
}
