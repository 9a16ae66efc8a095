//! Administration shell document.
//!
//! # Responsibility
//! - Hold one asset's identity, short name and submodel references.
//! - Keep the reference list free of duplicate targets.
//!
//! # Invariants
//! - `identification` is fixed at construction.
//! - No two entries of `submodels` share a target (see `Reference::same_target`).
//! - Insertion order of `submodels` is preserved across add/remove.
//! - Decoding keeps the first entry per target and drops later duplicates.

use crate::model::identifier::Identifier;
use crate::model::reference::Reference;
use crate::store::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ShellDocument")]
pub struct Shell {
    identification: Identifier,
    /// Human-readable name; not required to be unique.
    #[serde(rename = "idShort")]
    pub id_short: String,
    #[serde(default)]
    submodels: Vec<Reference>,
}

impl Shell {
    /// Creates a shell with no submodel references.
    pub fn new(id_short: impl Into<String>, identification: Identifier) -> Self {
        Self {
            identification,
            id_short: id_short.into(),
            submodels: Vec::new(),
        }
    }

    pub fn identification(&self) -> &Identifier {
        &self.identification
    }

    pub fn submodel_references(&self) -> &[Reference] {
        &self.submodels
    }

    pub fn contains_submodel_reference(&self, reference: &Reference) -> bool {
        self.submodels
            .iter()
            .any(|existing| existing.same_target(reference))
    }

    /// Appends `reference` unless its target is already referenced.
    ///
    /// Returns `true` when the list changed.
    pub fn add_submodel_reference(&mut self, reference: Reference) -> bool {
        if self.contains_submodel_reference(&reference) {
            return false;
        }
        self.submodels.push(reference);
        true
    }

    /// Removes every reference resolving to `id_short`.
    ///
    /// Returns the number of removed entries.
    pub fn remove_submodel_references(&mut self, id_short: &str) -> usize {
        let before = self.submodels.len();
        self.submodels
            .retain(|reference| !reference.resolves_to(id_short));
        before - self.submodels.len()
    }
}

/// Wire form of `Shell` before the reference set is normalized.
#[derive(Deserialize)]
struct ShellDocument {
    identification: Identifier,
    #[serde(rename = "idShort")]
    id_short: String,
    #[serde(default)]
    submodels: Vec<Reference>,
}

impl From<ShellDocument> for Shell {
    fn from(document: ShellDocument) -> Self {
        let mut shell = Shell::new(document.id_short, document.identification);
        for reference in document.submodels {
            shell.add_submodel_reference(reference);
        }
        shell
    }
}

impl Document for Shell {
    fn document_id(&self) -> &str {
        self.identification.id()
    }
}
