//! Data structures describing the crystal, its placed copies and their cross-links.
//!
//! Every type in this module is a plain value: nothing here owns a file handle or
//! caches derived matrices. Geometry is computed by [`crate::core::geometry`] and
//! threaded through explicitly.

pub mod copy;
pub mod crosslink;
pub mod crystal;
pub mod ids;
pub mod marker;
pub mod structure;
pub mod system;
