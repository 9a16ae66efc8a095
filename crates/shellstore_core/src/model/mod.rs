//! Domain model for administration shells and their submodel references.
//!
//! # Responsibility
//! - Define identity (`Identifier`) and link (`Reference`) value types.
//! - Define the `Shell` document and its reference-set bookkeeping.
//! - Define closed-set enumerations with strict reverse lookup.
//!
//! # Invariants
//! - Identifiers never change once assigned to an entity.
//! - A shell holds at most one reference per target identifier.
//! - Enumerated values decode through explicit, exhaustive lookups that fail
//!   with `InvalidEnumValue` instead of defaulting.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod identifier;
pub mod occupation;
pub mod reference;
pub mod shell;
pub mod submodel;

/// A value outside the closed set of an enumerated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnumValue {
    /// Name of the enumerated type that rejected the value.
    pub kind: &'static str,
    /// Rejected raw value, rendered as text.
    pub value: String,
}

impl InvalidEnumValue {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl Display for InvalidEnumValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value `{}`", self.kind, self.value)
    }
}

impl Error for InvalidEnumValue {}
