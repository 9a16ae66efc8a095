//! Submodel identity record.
//!
//! Submodel content is not modeled; only the identity needed to build
//! references from a shell is kept.

use crate::model::identifier::Identifier;
use crate::model::reference::{Key, KeyElement, Reference};
use crate::store::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submodel {
    identification: Identifier,
    #[serde(rename = "idShort")]
    pub id_short: String,
}

impl Submodel {
    pub fn new(id_short: impl Into<String>, identification: Identifier) -> Self {
        Self {
            identification,
            id_short: id_short.into(),
        }
    }

    pub fn identification(&self) -> &Identifier {
        &self.identification
    }

    /// Builds the reference a shell stores to link this submodel.
    pub fn reference(&self) -> Reference {
        Reference::new(vec![Key::for_identifier(
            KeyElement::Submodel,
            true,
            &self.identification,
        )])
        .with_id_short(self.id_short.as_str())
    }
}

impl Document for Submodel {
    fn document_id(&self) -> &str {
        self.identification.id()
    }
}

#[cfg(test)]
mod tests {
    use super::Submodel;
    use crate::model::identifier::Identifier;
    use crate::model::reference::{KeyElement, KeyType};

    #[test]
    fn reference_points_at_submodel_identity() {
        let submodel = Submodel::new("technical", Identifier::custom("sm-7"));
        let reference = submodel.reference();

        assert_eq!(reference.keys.len(), 1);
        assert_eq!(reference.keys[0].element, KeyElement::Submodel);
        assert_eq!(reference.keys[0].id_type, KeyType::Custom);
        assert_eq!(reference.target(), Some(Identifier::custom("sm-7")));
        assert!(reference.resolves_to("technical"));
    }
}
