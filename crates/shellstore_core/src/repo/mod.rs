//! Repository layer over document stores.
//!
//! # Responsibility
//! - Define use-case oriented data access for administration shells.
//! - Keep storage backends behind the `DocumentStore` contract.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `IdentityMismatch`)
//!   in addition to store transport errors.

pub mod shell_repo;
