//! Opaque model version identifiers.
//!
//! A version is whatever the model store understands: a tag such as `latest`
//! or a registry version number. The gateway never interprets it.
//!
//! Every textual source (env, config file, JSON, `&str`) goes through the
//! same rule: a token made only of ASCII digits that fits a `u64` is a
//! `Number`, anything else is a `Tag`. Tokens are never trimmed here.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Version identifier forwarded verbatim to the model store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum VersionId {
    Number(u64),
    Tag(String),
}

impl VersionId {
    /// Tag conventionally resolved by stores to the newest registered version.
    pub const LATEST: &'static str = "latest";

    pub fn latest() -> Self {
        Self::Tag(Self::LATEST.to_string())
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Tag(tag) if tag == Self::LATEST)
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Tag(_) => None,
        }
    }

    fn from_token(token: &str) -> Self {
        match decimal(token) {
            Some(n) => Self::Number(n),
            None => Self::Tag(token.to_string()),
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

impl From<u64> for VersionId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for VersionId {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}

impl From<String> for VersionId {
    fn from(token: String) -> Self {
        match decimal(&token) {
            Some(n) => Self::Number(n),
            None => Self::Tag(token),
        }
    }
}

/// `u64::from_str` also accepts a leading `+`, which would not round-trip.
fn decimal(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl FromStr for VersionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = VersionId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative version number or a version tag")
            }

            fn visit_u64<E: de::Error>(self, n: u64) -> Result<VersionId, E> {
                Ok(VersionId::Number(n))
            }

            fn visit_i64<E: de::Error>(self, n: i64) -> Result<VersionId, E> {
                u64::try_from(n)
                    .map(VersionId::Number)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(n), &self))
            }

            fn visit_str<E: de::Error>(self, token: &str) -> Result<VersionId, E> {
                Ok(VersionId::from_token(token))
            }

            fn visit_string<E: de::Error>(self, token: String) -> Result<VersionId, E> {
                Ok(VersionId::from(token))
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}
