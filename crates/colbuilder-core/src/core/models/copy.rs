use super::ids::CopyId;
use super::marker::MarkerSet;
use nalgebra::Vector3;
use std::collections::BTreeSet;

/// One placed copy of the asymmetric unit.
///
/// The marker atoms are stored already translated into the copy's position, so
/// connectivity tests can compare copies directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyModel {
    pub id: CopyId,
    pub translation: Vector3<f64>,
    pub shift: Vector3<i64>,
    pub markers: MarkerSet,
    pub connections: BTreeSet<CopyId>,
}

impl CopyModel {
    /// Places `base_markers` (the asymmetric unit's markers) at `translation`.
    pub fn place(
        id: CopyId,
        translation: Vector3<f64>,
        shift: Vector3<i64>,
        base_markers: &MarkerSet,
    ) -> Self {
        Self {
            id,
            translation,
            shift,
            markers: base_markers.translated(&translation),
            connections: BTreeSet::new(),
        }
    }

    pub fn add_connection(&mut self, other: CopyId) -> bool {
        if other == self.id {
            return false;
        }
        self.connections.insert(other)
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }
}
