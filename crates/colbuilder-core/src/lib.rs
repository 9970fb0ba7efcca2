//! # Colbuilder Core Library
//!
//! Assembles a multi-copy crystallographic model of a collagen microfibril from a single
//! asymmetric unit, determines which copies are physically connected through their
//! cross-linking residues, and refines cross-link geometry until linked atoms satisfy
//! distance constraints.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless models (`UnitCell`, `CopyModel`,
//!   `CrosslinkPair`), crystallographic geometry, and the text formats exchanged with
//!   external tools.
//!
//! - **[`engine`]: The Logic Core.** Configuration, errors, progress reporting, the
//!   contact graph and the cross-link optimizer with its candidate generators.
//!
//! - **[`workflows`]: The Public API.** Complete procedures: building and analysing the
//!   copy system of a crystal, and optimizing the cross-links of a structure.

pub mod core;
pub mod engine;
pub mod workflows;

pub use crate::core::geometry::crystal::{
    compute_rotation_matrix, shift_from_translation, translation_from_shift,
};
pub use crate::engine::tasks::contact_graph::{is_connected, merge_components};
pub use crate::workflows::optimize::optimize_crosslinks;
