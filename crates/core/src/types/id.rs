//! Identifiers for catalog entities.
//!
//! Remote records carry numeric identifiers assigned by the upstream catalog
//! API. Records authored on this side carry a [`LocalId`] of the form
//! `local_<unix-millis>_<suffix>`. [`ProductId`] keeps the two namespaces
//! apart as an explicit tagged variant.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`
/// - `From<u64>` and `Into<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use stockroom_core::define_id;
/// define_id!(ReviewerId);
/// define_id!(BrandId);
///
/// let reviewer = ReviewerId::new(1);
/// let brand = BrandId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ReviewerId = brand;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);

/// Prefix shared by every locally generated identifier.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Errors that can occur when parsing identifiers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product id cannot be empty")]
    Empty,
    /// The input has the local prefix but nothing after it.
    #[error("local product id must have a suffix after `local_`")]
    MissingSuffix,
    /// The input is neither a number nor a local id.
    #[error("invalid product id: {0}")]
    Invalid(String),
}

/// Identifier of a product that exists only in local persisted storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Build an identifier from a creation timestamp and a random suffix.
    #[must_use]
    pub fn from_parts(unix_millis: i64, suffix: &str) -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{unix_millis}_{suffix}"))
    }

    /// Parse a local identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the input lacks the `local_` prefix or has nothing
    /// after it.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        match s.strip_prefix(LOCAL_ID_PREFIX) {
            Some("") => Err(ProductIdError::MissingSuffix),
            Some(_) => Ok(Self(s.to_owned())),
            None => Err(ProductIdError::Invalid(s.to_owned())),
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LocalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a product in the merged catalog.
///
/// Serialized as a JSON number for remote products and as a string for
/// local ones, matching what the upstream API and the local store each use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductId {
    /// Identifier assigned by the upstream catalog API.
    Remote(u64),
    /// Identifier generated for a locally authored record.
    Local(LocalId),
}

impl ProductId {
    /// Returns `true` for identifiers of locally authored records.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Returns the remote identifier, if this is one.
    #[must_use]
    pub const fn as_remote(&self) -> Option<u64> {
        match self {
            Self::Remote(id) => Some(*id),
            Self::Local(_) => None,
        }
    }
}

impl From<LocalId> for ProductId {
    fn from(id: LocalId) -> Self {
        Self::Local(id)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self::Remote(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if s.starts_with(LOCAL_ID_PREFIX) {
            return LocalId::parse(s).map(Self::Local);
        }
        s.parse::<u64>()
            .map(Self::Remote)
            .map_err(|_| ProductIdError::Invalid(s.to_owned()))
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Remote(id) => serializer.serialize_u64(*id),
            Self::Local(id) => serializer.serialize_str(id.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self::Remote(id)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
