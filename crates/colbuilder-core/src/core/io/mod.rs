//! Readers and writers for the text formats exchanged with external tools.
//!
//! Fixed-column formats are described by declarative [`columns::Field`] tables so the
//! parsers can be tested against short or malformed lines without touching geometry.

pub mod columns;
pub mod connect;
pub mod contacts;
pub mod crosslinks;
pub mod pdb;
pub mod traits;
