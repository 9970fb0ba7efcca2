use super::crosslink::CrosslinkPosition;
use nalgebra::{Point3, Vector3};

/// Record kind of a coordinate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    #[default]
    Atom,
    Hetatm,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

/// One atom of a coordinate file, with enough context to write it back.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub kind: RecordKind,
    pub serial: usize,
    pub name: String,
    pub residue_name: String,
    pub chain_id: char,
    pub residue_number: isize,
    pub position: Point3<f64>,
    /// Columns 55 onwards (occupancy, B-factor, element), preserved verbatim.
    pub suffix: String,
}

impl AtomRecord {
    pub fn matches(&self, position: &CrosslinkPosition) -> bool {
        self.chain_id == position.chain_id
            && self.residue_number == position.residue_number
            && self.residue_name == position.residue_type
            && self.name == position.atom_name
    }
}

/// The full atom set of one coordinate file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub atoms: Vec<AtomRecord>,
}

impl Structure {
    pub fn new(atoms: Vec<AtomRecord>) -> Self {
        Self { atoms }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn find(&self, position: &CrosslinkPosition) -> Option<&AtomRecord> {
        self.atoms.iter().find(|atom| atom.matches(position))
    }

    /// Moves every atom of the residue `(chain_id, residue_number)` by `shift`.
    ///
    /// Returns the number of atoms moved.
    pub fn translate_residue(
        &mut self,
        chain_id: char,
        residue_number: isize,
        shift: &Vector3<f64>,
    ) -> usize {
        let mut moved = 0;
        for atom in self
            .atoms
            .iter_mut()
            .filter(|a| a.chain_id == chain_id && a.residue_number == residue_number)
        {
            atom.position += shift;
            moved += 1;
        }
        moved
    }

    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.position += shift;
        }
    }
}
