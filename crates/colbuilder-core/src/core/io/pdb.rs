use super::columns::{Field, FieldError};
use super::traits::CoordinateFile;
use crate::core::models::crystal::{SpaceGroup, UnitCell};
use crate::core::models::marker::{MarkerAtom, MarkerSet, marker_arity};
use crate::core::models::structure::{AtomRecord, RecordKind, Structure};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Column layout of `ATOM`/`HETATM` records.
pub mod atom_fields {
    use super::Field;

    pub const RECORD: Field = Field::new("record name", 0, 6);
    pub const SERIAL: Field = Field::new("serial", 6, 11);
    pub const NAME: Field = Field::new("atom name", 12, 16);
    pub const RESIDUE_NAME: Field = Field::new("residue name", 17, 20);
    pub const CHAIN_ID: Field = Field::new("chain id", 21, 22);
    pub const RESIDUE_NUMBER: Field = Field::new("residue number", 22, 26);
    pub const X: Field = Field::new("x", 30, 38);
    pub const Y: Field = Field::new("y", 38, 46);
    pub const Z: Field = Field::new("z", 46, 54);
    pub const SUFFIX_START: usize = 54;
}

/// Column layout of the `CRYST1` record.
pub mod cryst1_fields {
    use super::Field;

    pub const A: Field = Field::new("a", 6, 15);
    pub const B: Field = Field::new("b", 15, 24);
    pub const C: Field = Field::new("c", 24, 33);
    pub const ALPHA: Field = Field::new("alpha", 33, 40);
    pub const BETA: Field = Field::new("beta", 40, 47);
    pub const GAMMA: Field = Field::new("gamma", 47, 54);
    pub const SPACE_GROUP: Field = Field::new("space group", 55, 66);
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: FieldError },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

/// A marker record that was recognized but could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub line: usize,
    /// Raw serial field of the offending line, for diagnosis.
    pub serial: String,
    pub error: FieldError,
}

/// Result of scanning a coordinate file for cross-link marker atoms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerScan {
    pub markers: MarkerSet,
    pub skipped: Vec<SkippedRecord>,
}

fn is_atom_record(line: &str) -> Option<RecordKind> {
    match atom_fields::RECORD.trimmed(line) {
        "ATOM" => Some(RecordKind::Atom),
        "HETATM" => Some(RecordKind::Hetatm),
        _ => None,
    }
}

fn parse_atom(line: &str, kind: RecordKind) -> Result<AtomRecord, FieldError> {
    use atom_fields::*;

    let name = NAME.trimmed(line);
    if name.is_empty() {
        return Err(FieldError::Missing {
            field: NAME.name,
            columns: NAME.columns(),
        });
    }
    Ok(AtomRecord {
        kind,
        serial: SERIAL.parse(line)?,
        name: name.to_string(),
        residue_name: RESIDUE_NAME.trimmed(line).to_string(),
        chain_id: CHAIN_ID.char(line).unwrap_or(' '),
        residue_number: RESIDUE_NUMBER.parse(line)?,
        position: Point3::new(X.parse(line)?, Y.parse(line)?, Z.parse(line)?),
        suffix: line.get(SUFFIX_START..).unwrap_or("").to_string(),
    })
}

/// Scans coordinate records and keeps only the recognized cross-link marker atoms.
///
/// Markers are identified by their exact `(residue name, atom name)` pair before any
/// numeric field is read. A marker line with malformed numbers is skipped, logged,
/// and reported in [`MarkerScan::skipped`]; reading continues with the next line.
///
/// # Errors
///
/// Only I/O failures abort the scan.
pub fn read_markers(reader: &mut impl BufRead) -> Result<MarkerScan, PdbError> {
    let mut scan = MarkerScan::default();

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        let Some(kind) = is_atom_record(&line) else {
            continue;
        };
        let residue_name = atom_fields::RESIDUE_NAME.trimmed(&line);
        let atom_name = atom_fields::NAME.trimmed(&line);
        let Some(arity) = marker_arity(residue_name, atom_name) else {
            continue;
        };

        match parse_atom(&line, kind) {
            Ok(atom) => {
                let serial = atom.serial;
                let previous = scan.markers.insert(
                    serial,
                    MarkerAtom {
                        residue_name: atom.residue_name,
                        atom_name: atom.name,
                        chain_id: atom.chain_id,
                        residue_number: atom.residue_number,
                        arity,
                        position: atom.position,
                    },
                );
                if previous.is_some() {
                    warn!(line = line_num, serial, "Duplicate marker serial; keeping the later record.");
                }
            }
            Err(error) => {
                let serial = atom_fields::SERIAL.trimmed(&line).to_string();
                warn!(
                    line = line_num,
                    serial = %serial,
                    "Skipping malformed cross-link record: {}", error
                );
                scan.skipped.push(SkippedRecord {
                    line: line_num,
                    serial,
                    error,
                });
            }
        }
    }

    debug!(
        markers = scan.markers.len(),
        skipped = scan.skipped.len(),
        "Marker scan complete."
    );
    Ok(scan)
}

pub fn read_markers_from_path<P: AsRef<Path>>(path: P) -> Result<MarkerScan, PdbError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_markers(&mut reader)
}

/// Reads the unit cell and space group from the first `CRYST1` record.
///
/// # Errors
///
/// Returns [`PdbError::MissingRecord`] if the file has no `CRYST1` record and
/// [`PdbError::Parse`] if one of its fields is malformed.
pub fn read_crystal(reader: &mut impl BufRead) -> Result<(UnitCell, SpaceGroup), PdbError> {
    use cryst1_fields::*;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;
        if !line.starts_with("CRYST1") {
            continue;
        }
        let parse = |field: Field| {
            field
                .parse::<f64>(&line)
                .map_err(|kind| PdbError::Parse { line: line_num, kind })
        };
        let unit_cell = UnitCell::new(
            parse(A)?,
            parse(B)?,
            parse(C)?,
            parse(ALPHA)?,
            parse(BETA)?,
            parse(GAMMA)?,
        );
        // A blank space-group field means P 1. Support is decided by the geometry.
        let space_group = SpaceGroup::from_symbol(SPACE_GROUP.trimmed(&line));
        return Ok((unit_cell, space_group));
    }
    Err(PdbError::MissingRecord("CRYST1".into()))
}

pub fn read_crystal_from_path<P: AsRef<Path>>(path: P) -> Result<(UnitCell, SpaceGroup), PdbError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_crystal(&mut reader)
}

fn format_atom_name(name: &str) -> String {
    if name.len() < 4 {
        format!(" {:<3}", name)
    } else {
        name.to_string()
    }
}

pub struct PdbFile;

impl CoordinateFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut atoms = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if line.starts_with("END") && !line.starts_with("ENDMDL") {
                break;
            }
            let Some(kind) = is_atom_record(&line) else {
                continue;
            };
            let atom = parse_atom(&line, kind).map_err(|kind| PdbError::Parse {
                line: line_num,
                kind,
            })?;
            atoms.push(atom);
        }
        if atoms.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(Structure::new(atoms))
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        for atom in &structure.atoms {
            writeln!(
                writer,
                "{:<6}{:>5} {:<4} {:>3} {:1}{:>4}    {:>8.3}{:>8.3}{:>8.3}{}",
                atom.kind.as_str(),
                atom.serial,
                format_atom_name(&atom.name),
                atom.residue_name,
                atom.chain_id,
                atom.residue_number,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.suffix
            )?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
