//! Reference value objects linking a shell to related elements.
//!
//! # Responsibility
//! - Describe a pointer to another element as a chain of keys.
//! - Resolve the target identifier and short name used for bookkeeping.
//!
//! # Invariants
//! - References own no lifecycle; they are copied in and out of shells.
//! - The target of a reference is determined by its last key.

use crate::model::identifier::{Identifier, IdentifierType};
use crate::model::InvalidEnumValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of element a key step points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyElement {
    Asset,
    AssetAdministrationShell,
    ConceptDescription,
    Submodel,
    SubmodelElement,
    SubmodelElementCollection,
    Property,
    Operation,
}

/// How the `value` of a key is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "Custom")]
    Custom,
    #[serde(rename = "IRI")]
    Iri,
    #[serde(rename = "IRDI")]
    Irdi,
    /// Value is the short name of a local element.
    #[serde(rename = "IdShort")]
    IdShort,
    #[serde(rename = "FragmentId")]
    FragmentId,
}

impl KeyType {
    /// Returns the identification scheme when this key carries a global id.
    pub fn identifier_type(self) -> Option<IdentifierType> {
        match self {
            Self::Custom => Some(IdentifierType::Custom),
            Self::Iri => Some(IdentifierType::Iri),
            Self::Irdi => Some(IdentifierType::Irdi),
            Self::IdShort | Self::FragmentId => None,
        }
    }
}

impl From<IdentifierType> for KeyType {
    fn from(value: IdentifierType) -> Self {
        match value {
            IdentifierType::Custom => Self::Custom,
            IdentifierType::Iri => Self::Iri,
            IdentifierType::Irdi => Self::Irdi,
        }
    }
}

impl FromStr for KeyType {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Custom" => Ok(Self::Custom),
            "IRI" => Ok(Self::Iri),
            "IRDI" => Ok(Self::Irdi),
            "IdShort" => Ok(Self::IdShort),
            "FragmentId" => Ok(Self::FragmentId),
            other => Err(InvalidEnumValue::new("key type", other)),
        }
    }
}

/// One step of a reference chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    #[serde(rename = "type")]
    pub element: KeyElement,
    /// Whether the element lives in the same server as the referrer.
    pub local: bool,
    pub value: String,
    #[serde(rename = "idType")]
    pub id_type: KeyType,
}

impl Key {
    pub fn new(
        element: KeyElement,
        local: bool,
        value: impl Into<String>,
        id_type: KeyType,
    ) -> Self {
        Self {
            element,
            local,
            value: value.into(),
            id_type,
        }
    }

    /// Builds a key addressing `identifier` globally.
    pub fn for_identifier(element: KeyElement, local: bool, identifier: &Identifier) -> Self {
        Self::new(
            element,
            local,
            identifier.id(),
            identifier.id_type().into(),
        )
    }
}

/// Pointer to another element, expressed as an ordered key chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub keys: Vec<Key>,
    /// Short name of the element this reference resolves to.
    #[serde(rename = "idShort", default, skip_serializing_if = "Option::is_none")]
    pub id_short: Option<String>,
}

impl Reference {
    pub fn new(keys: Vec<Key>) -> Self {
        Self {
            keys,
            id_short: None,
        }
    }

    pub fn with_id_short(mut self, id_short: impl Into<String>) -> Self {
        self.id_short = Some(id_short.into());
        self
    }

    /// Returns the identifier named by the last key, if it is a global id.
    pub fn target(&self) -> Option<Identifier> {
        let last = self.keys.last()?;
        let id_type = last.id_type.identifier_type()?;
        Some(Identifier::new(id_type, last.value.as_str()))
    }

    /// Returns the short name of the element this reference resolves to.
    ///
    /// The explicit `id_short` wins; otherwise a trailing `IdShort` key is used.
    pub fn target_id_short(&self) -> Option<&str> {
        if let Some(id_short) = self.id_short.as_deref() {
            return Some(id_short);
        }
        self.keys
            .last()
            .filter(|key| key.id_type == KeyType::IdShort)
            .map(|key| key.value.as_str())
    }

    pub fn resolves_to(&self, id_short: &str) -> bool {
        self.target_id_short() == Some(id_short)
    }

    /// Whether both references point at the same target element.
    ///
    /// References without a global target compare by their full key chain.
    pub fn same_target(&self, other: &Reference) -> bool {
        match (self.target(), other.target()) {
            (Some(left), Some(right)) => left == right,
            (None, None) => self.keys == other.keys,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyElement, KeyType, Reference};
    use crate::model::identifier::{Identifier, IdentifierType};

    fn submodel_key(id: &str) -> Key {
        Key::new(KeyElement::Submodel, true, id, KeyType::Custom)
    }

    #[test]
    fn target_uses_last_global_key() {
        let reference = Reference::new(vec![
            Key::new(KeyElement::AssetAdministrationShell, true, "shell", KeyType::Iri),
            submodel_key("sm-1"),
        ]);
        assert_eq!(reference.target(), Some(Identifier::custom("sm-1")));
    }

    #[test]
    fn id_short_key_has_no_global_target_but_resolves_by_name() {
        let reference = Reference::new(vec![Key::new(
            KeyElement::Submodel,
            true,
            "operational",
            KeyType::IdShort,
        )]);
        assert!(reference.target().is_none());
        assert!(reference.resolves_to("operational"));
    }

    #[test]
    fn explicit_id_short_wins_over_key_value() {
        let reference = Reference::new(vec![submodel_key("sm-1")]).with_id_short("technical");
        assert!(reference.resolves_to("technical"));
        assert!(!reference.resolves_to("sm-1"));
    }

    #[test]
    fn same_target_ignores_id_short_and_locality() {
        let a = Reference::new(vec![submodel_key("sm-1")]).with_id_short("a");
        let mut b = Reference::new(vec![submodel_key("sm-1")]).with_id_short("b");
        b.keys[0].local = false;
        assert!(a.same_target(&b));

        let other_scheme = Reference::new(vec![Key::new(
            KeyElement::Submodel,
            true,
            "sm-1",
            KeyType::from(IdentifierType::Irdi),
        )]);
        assert!(!a.same_target(&other_scheme));
    }

    #[test]
    fn key_type_parse_is_strict() {
        assert_eq!("IdShort".parse::<KeyType>().unwrap(), KeyType::IdShort);
        assert!("idshort".parse::<KeyType>().is_err());
    }
}
