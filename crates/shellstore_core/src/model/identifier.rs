//! Identification scheme and identifier value type.
//!
//! # Invariants
//! - Two identifiers are equal iff scheme and id string both match.
//! - `Identifier` exposes no mutators; a new value must be built instead.

use crate::model::InvalidEnumValue;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Kind of identification scheme an `Identifier` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierType {
    /// Application-defined identifier.
    #[serde(rename = "Custom")]
    Custom,
    /// Internationalized resource identifier.
    #[serde(rename = "IRI")]
    Iri,
    /// International registration data identifier.
    #[serde(rename = "IRDI")]
    Irdi,
}

impl IdentifierType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "Custom",
            Self::Iri => "IRI",
            Self::Irdi => "IRDI",
        }
    }
}

impl Display for IdentifierType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Custom" => Ok(Self::Custom),
            "IRI" => Ok(Self::Iri),
            "IRDI" => Ok(Self::Irdi),
            other => Err(InvalidEnumValue::new("identifier type", other)),
        }
    }
}

/// Globally unique identity of an identifiable entity.
///
/// The `id` string doubles as the document key inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "idType")]
    id_type: IdentifierType,
    id: String,
}

impl Identifier {
    pub fn new(id_type: IdentifierType, id: impl Into<String>) -> Self {
        Self {
            id_type,
            id: id.into(),
        }
    }

    /// Shorthand for an `IdentifierType::Custom` identifier.
    pub fn custom(id: impl Into<String>) -> Self {
        Self::new(IdentifierType::Custom, id)
    }

    /// Creates a custom identifier backed by a random v4 UUID.
    pub fn generate() -> Self {
        Self::custom(Uuid::new_v4().to_string())
    }

    pub fn id_type(&self) -> IdentifierType {
        self.id_type
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id_type, self.id)
    }
}
