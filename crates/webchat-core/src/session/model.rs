//! Session identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes in a session id (128 bits).
pub const SESSION_ENTROPY_BYTES: usize = 16;

/// Opaque identifier correlating every turn of one conversation.
///
/// Generated ids look like `session_<epoch-ms>_<32 hex chars>`; the
/// timestamp prefix only helps when reading backend logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an id read back from storage.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a fresh id from a creation timestamp and random bytes.
    pub fn generate(created_at_millis: i64, random: &[u8; SESSION_ENTROPY_BYTES]) -> Self {
        let hex: String = random.iter().map(|byte| format!("{byte:02x}")).collect();
        Self(format!("session_{created_at_millis}_{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let mut bytes = [0u8; SESSION_ENTROPY_BYTES];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        let id = SessionId::generate(1_760_000_000_000, &bytes);
        assert_eq!(
            id.as_str(),
            "session_1760000000000_ab000000000000000000000000000001"
        );
    }
}
