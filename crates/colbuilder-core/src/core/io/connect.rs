use crate::core::models::ids::CopyId;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Connected components keyed by their smallest member; members sorted ascending.
pub type Components = BTreeMap<CopyId, Vec<CopyId>>;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Writes one line per copy: the copy id followed by the other members of its component.
///
/// Copies without partners are written alone on their line.
pub fn write_connect(components: &Components, writer: &mut impl Write) -> Result<(), ConnectError> {
    for members in components.values() {
        for &id in members {
            write!(writer, "{}", id)?;
            for partner in members.iter().filter(|&&other| other != id) {
                write!(writer, " {}", partner)?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

pub fn write_connect_to_path<P: AsRef<Path>>(
    components: &Components,
    path: P,
) -> Result<(), ConnectError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_connect(components, &mut writer)?;
    writer.flush()?;
    Ok(())
}
