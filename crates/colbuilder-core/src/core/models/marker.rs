use nalgebra::{Point3, Vector3};
use phf::phf_map;
use std::collections::BTreeMap;

/// Arity of the cross-link a marker residue takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkArity {
    /// Three residues join at one cross-link (pyridinoline-like links).
    Trivalent,
    /// Two residues join at one cross-link.
    Divalent,
}

/// Residue name to the atom that marks a cross-link-forming residue.
static MARKER_ATOMS: phf::Map<&'static str, (&'static str, LinkArity)> = phf_map! {
    "LYX" => ("C13", LinkArity::Trivalent),
    "LY3" => ("CG", LinkArity::Trivalent),
    "LY2" => ("CB", LinkArity::Trivalent),
    "L4Y" => ("CE", LinkArity::Divalent),
    "L5Y" => ("NZ", LinkArity::Divalent),
};

/// Returns the link arity if `(residue_name, atom_name)` is a recognized marker pair.
pub fn marker_arity(residue_name: &str, atom_name: &str) -> Option<LinkArity> {
    MARKER_ATOMS
        .get(residue_name)
        .filter(|(marker_atom, _)| *marker_atom == atom_name)
        .map(|(_, arity)| *arity)
}

/// One cross-link-forming atom read from a coordinate file.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAtom {
    pub residue_name: String,
    pub atom_name: String,
    pub chain_id: char,
    pub residue_number: isize,
    pub arity: LinkArity,
    pub position: Point3<f64>,
}

impl MarkerAtom {
    pub fn translated(&self, vector: &Vector3<f64>) -> Self {
        Self {
            position: translate(&self.position, vector),
            ..self.clone()
        }
    }
}

/// Plain vector addition of a translation onto a position.
#[inline]
pub fn translate(position: &Point3<f64>, vector: &Vector3<f64>) -> Point3<f64> {
    position + vector
}

/// Marker atoms of one structure keyed by their record serial number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    atoms: BTreeMap<usize, MarkerAtom>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, serial: usize, atom: MarkerAtom) -> Option<MarkerAtom> {
        self.atoms.insert(serial, atom)
    }

    pub fn get(&self, serial: usize) -> Option<&MarkerAtom> {
        self.atoms.get(&serial)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &MarkerAtom)> {
        self.atoms.iter().map(|(&serial, atom)| (serial, atom))
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.atoms.values().map(|atom| &atom.position)
    }

    /// Copy of the set with every marker moved by `vector`.
    pub fn translated(&self, vector: &Vector3<f64>) -> Self {
        Self {
            atoms: self
                .atoms
                .iter()
                .map(|(&serial, atom)| (serial, atom.translated(vector)))
                .collect(),
        }
    }

    pub fn count_by_arity(&self, arity: LinkArity) -> usize {
        self.atoms.values().filter(|a| a.arity == arity).count()
    }
}

impl FromIterator<(usize, MarkerAtom)> for MarkerSet {
    fn from_iter<T: IntoIterator<Item = (usize, MarkerAtom)>>(iter: T) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}
