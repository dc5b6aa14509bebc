// crates/bondline-core/src/account.rs
//
// Account identifiers and market subjects.
//
// Accounts are 20-byte addresses rendered as 0x-prefixed hex. Configs and
// tests usually name accounts by label; a label maps to an address through
// SHA-256, so "alice" is the same account everywhere.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::BondlineError;

/// Domain separator for label-derived addresses.
const LABEL_DOMAIN: &[u8] = b"bondline:account:";

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The all-zero address. Never an authorized caller.
    pub const ZERO: AccountId = AccountId([0u8; 20]);

    /// Derive a deterministic address from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(LABEL_DOMAIN);
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        AccountId(bytes)
    }

    /// Parse a `0x`-prefixed 40-digit hex address.
    pub fn from_hex(s: &str) -> Result<Self, BondlineError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| BondlineError::InvalidAccount(format!("missing 0x prefix: {}", s)))?;
        let raw = hex::decode(digits)
            .map_err(|e| BondlineError::InvalidAccount(format!("{}: {}", s, e)))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| BondlineError::InvalidAccount(format!("expected 20 bytes: {}", s)))?;
        Ok(AccountId(bytes))
    }

    /// Parse either a hex address or, failing the `0x` prefix, a label.
    pub fn parse(s: &str) -> Result<Self, BondlineError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BondlineError::InvalidAccount("empty account".to_string()));
        }
        if trimmed.starts_with("0x") {
            Self::from_hex(trimmed)
        } else {
            Ok(Self::from_label(trimmed))
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Short form for tables and logs: `0x1234…abcd`.
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[36..])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short())
    }
}

impl FromStr for AccountId {
    type Err = BondlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Key of a content item within a creator's namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentKey(pub String);

impl ContentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Market key of a content item: the creator that owns it plus its key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentSubject {
    pub creator: AccountId,
    pub key: ContentKey,
}

impl ContentSubject {
    pub fn new(creator: AccountId, key: impl Into<String>) -> Self {
        Self {
            creator,
            key: ContentKey::new(key),
        }
    }
}

impl fmt::Display for ContentSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.creator, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_deterministic() {
        assert_eq!(AccountId::from_label("alice"), AccountId::from_label("alice"));
        assert_ne!(AccountId::from_label("alice"), AccountId::from_label("bob"));
        assert!(!AccountId::from_label("alice").is_zero());
    }

    #[test]
    fn test_hex_parse() {
        let alice = AccountId::from_label("alice");
        let parsed = AccountId::parse(&alice.to_hex()).unwrap();
        assert_eq!(parsed, alice);
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        assert!(AccountId::parse("0x1234").is_err());
        assert!(AccountId::parse("0xzz").is_err());
        assert!(AccountId::parse("   ").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let alice = AccountId::from_label("alice");
        let json = serde_json::to_string(&alice).unwrap();
        assert_eq!(json, format!("\"{}\"", alice.to_hex()));

        // Labels are accepted on the way in.
        let from_label: AccountId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(from_label, alice);
    }

    #[test]
    fn test_content_subject_display() {
        let creator = AccountId::from_label("carol");
        let subject = ContentSubject::new(creator, "post-1");
        assert!(subject.to_string().ends_with(":post-1"));
    }
}
