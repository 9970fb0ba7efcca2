use super::crystal::ShiftMatrix;
use std::collections::BTreeSet;

/// One lattice cell `(x, y, z)` in shift-matrix coordinates.
pub type LatticeNode = [i64; 3];

/// Lattice nodes of every copy lying in the z-layer `z`.
pub fn plane_at(shift: &ShiftMatrix, z: i64) -> BTreeSet<LatticeNode> {
    shift
        .iter()
        .filter(|(_, s)| s.z == z)
        .map(|(_, s)| [s.x, s.y, s.z])
        .collect()
}

/// Full rectangular mesh covering the z-layer `z`, widened by `d_x` and `d_y` cells.
///
/// The mesh spans `-(x_max + d_x)..=(x_max + d_x)` and likewise in y, where the maxima
/// are taken over the copies already in the layer. An empty layer yields an empty mesh.
pub fn extend_plane(shift: &ShiftMatrix, z: i64, d_x: i64, d_y: i64) -> BTreeSet<LatticeNode> {
    let plane = plane_at(shift, z);
    let (Some(x_max), Some(y_max)) = (
        plane.iter().map(|n| n[0]).max(),
        plane.iter().map(|n| n[1]).max(),
    ) else {
        return BTreeSet::new();
    };

    let x_extent = x_max + d_x;
    let y_extent = y_max + d_y;
    let mut mesh = BTreeSet::new();
    for y in -y_extent..=y_extent {
        for x in -x_extent..=x_extent {
            mesh.insert([x, y, z]);
        }
    }
    mesh
}

/// Nodes present in exactly one of the layer and its extension.
///
/// For a layer contained in its own extension this is the set of cells that must be
/// added to fill the mesh.
pub fn plane_nodes(shift: &ShiftMatrix, z: i64, d_x: i64, d_y: i64) -> BTreeSet<LatticeNode> {
    let plane = plane_at(shift, z);
    let extended = extend_plane(shift, z, d_x, d_y);
    plane.symmetric_difference(&extended).copied().collect()
}

/// Cells of the topmost z-layer mesh, widened by one cell along y, that hold no copy yet.
///
/// Occupied cells outside the mesh are left alone, so the result never repeats a node
/// already present in `shift`.
pub fn fill_top_layer(shift: &ShiftMatrix) -> BTreeSet<LatticeNode> {
    let Some(z_top) = shift.iter().map(|(_, s)| s.z).max() else {
        return BTreeSet::new();
    };
    let plane = plane_at(shift, z_top);
    extend_plane(shift, z_top, 0, 1)
        .difference(&plane)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::CopyId;
    use nalgebra::Vector3;

    fn shift_of(nodes: &[[i64; 3]]) -> ShiftMatrix {
        nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (CopyId::new(i as f64), Vector3::new(n[0], n[1], n[2])))
            .collect()
    }

    #[test]
    fn plane_at_selects_one_layer() {
        let shift = shift_of(&[[0, 0, 0], [1, 0, 0], [0, 1, 1]]);
        assert_eq!(plane_at(&shift, 0), BTreeSet::from([[0, 0, 0], [1, 0, 0]]));
        assert_eq!(plane_at(&shift, 1), BTreeSet::from([[0, 1, 1]]));
    }

    #[test]
    fn extend_plane_covers_a_symmetric_rectangle() {
        let shift = shift_of(&[[0, 0, 2], [1, 1, 2]]);
        let mesh = extend_plane(&shift, 2, 0, 1);
        // x in -1..=1, y in -2..=2
        assert_eq!(mesh.len(), 3 * 5);
        assert!(mesh.contains(&[-1, -2, 2]));
        assert!(mesh.contains(&[1, 2, 2]));
    }

    #[test]
    fn plane_nodes_are_the_missing_cells() {
        let shift = shift_of(&[[0, 0, 0], [1, 0, 0], [-1, 0, 0]]);
        let missing = plane_nodes(&shift, 0, 0, 1);
        assert_eq!(missing.len(), 3 * 3 - 3);
        assert!(!missing.contains(&[0, 0, 0]));
        assert!(missing.contains(&[0, 1, 0]));
    }

    #[test]
    fn fill_top_layer_uses_the_highest_z() {
        let shift = shift_of(&[[0, 0, 0], [0, 0, 3]]);
        let nodes = fill_top_layer(&shift);
        assert!(nodes.iter().all(|n| n[2] == 3));
        assert_eq!(nodes, BTreeSet::from([[0, -1, 3], [0, 1, 3]]));
    }

    #[test]
    fn fill_top_layer_skips_occupied_cells_outside_the_mesh() {
        let shift = shift_of(&[[-3, 0, 0], [1, 0, 0]]);
        let nodes = fill_top_layer(&shift);

        // x in -1..=1, y in -1..=1, minus the occupied (1, 0, 0)
        assert_eq!(nodes.len(), 8);
        assert!(!nodes.contains(&[-3, 0, 0]));
        assert!(!nodes.contains(&[1, 0, 0]));
        // the symmetric difference still reports the far cell
        assert!(plane_nodes(&shift, 0, 0, 1).contains(&[-3, 0, 0]));
    }

    #[test]
    fn fill_top_layer_adds_nothing_when_every_x_is_negative() {
        let shift = shift_of(&[[-2, 0, 1], [-1, 0, 1]]);
        assert!(fill_top_layer(&shift).is_empty());
    }

    #[test]
    fn empty_layers_produce_no_nodes() {
        let shift = shift_of(&[[0, 0, 0]]);
        assert!(extend_plane(&shift, 5, 1, 1).is_empty());
        assert!(fill_top_layer(&ShiftMatrix::new()).is_empty());
    }
}
