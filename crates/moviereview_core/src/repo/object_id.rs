//! Structured 12-byte object identifiers.
//!
//! # Responsibility
//! - Generate identifiers for reviews inserted without a caller key.
//! - Convert between the binary key and its 24-char hex text form.
//!
//! # Invariants
//! - Layout: 4-byte big-endian Unix seconds, 5 per-process random bytes,
//!   3-byte big-endian wrapping counter.
//! - Never leaves the repository module; callers only see hex strings.

use once_cell::sync::Lazy;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub(crate) const OBJECT_ID_LEN: usize = 12;
const HEX_LEN: usize = OBJECT_ID_LEN * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_RANDOM: Lazy<[u8; 5]> = Lazy::new(|| {
    let seed = Uuid::new_v4();
    let mut out = [0u8; 5];
    out.copy_from_slice(&seed.as_bytes()[..5]);
    out
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| {
    let seed = Uuid::new_v4();
    let bytes = seed.as_bytes();
    AtomicU32::new(u32::from_be_bytes([0, bytes[6], bytes[7], bytes[8]]))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub(crate) fn generate() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default();
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(PROCESS_RANDOM.as_slice());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parses the 24-char hex form. Anything else yields `None`.
    pub(crate) fn parse_hex(value: &str) -> Option<Self> {
        if value.len() != HEX_LEN {
            return None;
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (slot, pair) in bytes.iter_mut().zip(value.as_bytes().chunks_exact(2)) {
            *slot = (hex_value(pair[0])? << 4) | hex_value(pair[1])?;
        }
        Some(Self(bytes))
    }

    pub(crate) fn from_slice(value: &[u8]) -> Option<Self> {
        let bytes: [u8; OBJECT_ID_LEN] = value.try_into().ok()?;
        Some(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn to_hex(self) -> String {
        self.to_string()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
