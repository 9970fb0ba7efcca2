use super::copy::CopyModel;
use super::crystal::UnitCell;
use super::ids::CopyId;
use std::collections::{BTreeMap, BTreeSet};

/// Full neighbour sets of every copy. Symmetric when produced by the contact graph.
pub type Adjacency = BTreeMap<CopyId, BTreeSet<CopyId>>;

/// Owned collection of placed copies making up one microfibril model.
#[derive(Debug, Clone, PartialEq)]
pub struct CopySystem {
    unit_cell: UnitCell,
    copies: BTreeMap<CopyId, CopyModel>,
}

impl CopySystem {
    pub fn new(unit_cell: UnitCell) -> Self {
        Self {
            unit_cell,
            copies: BTreeMap::new(),
        }
    }

    pub fn unit_cell(&self) -> &UnitCell {
        &self.unit_cell
    }

    pub fn add_copy(&mut self, copy: CopyModel) -> Option<CopyModel> {
        self.copies.insert(copy.id, copy)
    }

    pub fn copy(&self, id: CopyId) -> Option<&CopyModel> {
        self.copies.get(&id)
    }

    pub fn copy_mut(&mut self, id: CopyId) -> Option<&mut CopyModel> {
        self.copies.get_mut(&id)
    }

    pub fn remove_copy(&mut self, id: CopyId) -> Option<CopyModel> {
        let removed = self.copies.remove(&id)?;
        for copy in self.copies.values_mut() {
            copy.connections.remove(&id);
        }
        Some(removed)
    }

    pub fn ids(&self) -> impl Iterator<Item = CopyId> + '_ {
        self.copies.keys().copied()
    }

    pub fn copies(&self) -> impl Iterator<Item = &CopyModel> {
        self.copies.values()
    }

    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Number of copies with at least one neighbour.
    pub fn connected_count(&self) -> usize {
        self.copies.values().filter(|c| c.is_connected()).count()
    }

    /// Replaces every copy's neighbour set with the entries of `adjacency`.
    pub fn apply_adjacency(&mut self, adjacency: &Adjacency) {
        for copy in self.copies.values_mut() {
            copy.connections.clear();
            if let Some(neighbours) = adjacency.get(&copy.id) {
                for &other in neighbours {
                    copy.add_connection(other);
                }
            }
        }
    }

    /// Drops every copy whose id is not in `keep`, returning the removed ids.
    ///
    /// Used after the external tool has cut the fibril to its final extent.
    pub fn retain_ids(&mut self, keep: &BTreeSet<CopyId>) -> Vec<CopyId> {
        let removed: Vec<CopyId> = self
            .copies
            .keys()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();
        for id in &removed {
            self.remove_copy(*id);
        }
        removed
    }
}
