// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identifier type shared by every entity in the system.
//!
//! Every id is a fixed 12-character lowercase hex string: the first 12 hex
//! digits of a random 128-bit value. Unlike a job-id/agent-id prefixed
//! scheme, ids here carry no type tag — they are handed back to HTTP clients
//! verbatim and compared only within their own entity kind.

use uuid::Uuid;

/// Fixed length of every id, in ASCII bytes.
pub const ID_LEN: usize = 12;

/// Fixed-size inline id buffer. Always exactly 12 ASCII bytes, `Copy`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdBuf([u8; ID_LEN]);

impl IdBuf {
    /// Generate a fresh random id: the first 12 hex digits of a random
    /// 128-bit value.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self::new(&hex[..ID_LEN])
    }

    /// Build an id from an existing string (parsing / deserialization).
    ///
    /// Pads with `0` or truncates to fit the fixed 12-byte buffer, so this
    /// never panics on foreign input; callers that must enforce the exact
    /// contract can check `s.len() == ID_LEN` themselves.
    pub fn new(s: &str) -> Self {
        let mut buf = [b'0'; ID_LEN];
        let bytes = s.as_bytes();
        let n = bytes.len().min(ID_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        Self(buf)
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only ever built from ASCII hex or `0` padding.
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl std::fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl std::borrow::Borrow<str> for IdBuf {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Ok(IdBuf::new(s))
    }
}

/// Define a newtype id wrapper around [`IdBuf`].
///
/// Generates `new()` (random), `from_string()` (parse), `as_str()`,
/// `Display`/`Debug`, `From<String>`, `From<&str>`, `PartialEq<str>`,
/// `Borrow<str>`, and `Deref` impls.
///
/// ```ignore
/// define_id! {
///     pub struct ProjectId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $crate::id::IdBuf);

        impl $name {
            /// Generate a new random id.
            pub fn new() -> Self {
                Self($crate::id::IdBuf::generate())
            }

            /// Parse an id from an existing string.
            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self($crate::id::IdBuf::new(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
