use crate::core::models::crystal::{SpaceGroup, UnitCell};
use crate::core::models::ids::CopyId;
use nalgebra::{Matrix3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;

const SINGULARITY_EPSILON: f64 = 1e-8;
const INTEGER_SNAP_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error(
        "Unsupported space group {0}. Only P 1 is supported; re-export the asymmetric unit with space group P 1."
    )]
    UnsupportedSpaceGroup(SpaceGroup),

    #[error("Unit cell {cell:?} cannot be converted to Cartesian axes: {reason}")]
    SingularCell { cell: UnitCell, reason: String },

    #[error("Rotation matrix is singular; cannot solve for the shift of copy {0}")]
    SingularSolve(CopyId),
}

/// Fractional-to-Cartesian matrix of a crystal. Its columns are the cell vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix(Matrix3<f64>);

impl RotationMatrix {
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    pub fn cartesian(&self, shift: &Vector3<i64>) -> Vector3<f64> {
        self.0 * shift.map(|v| v as f64)
    }

    pub fn fractional(&self, translation: &Vector3<f64>) -> Option<Vector3<f64>> {
        self.0.lu().solve(translation)
    }
}

/// Cartesian placement offset of every copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationMatrix(BTreeMap<CopyId, Vector3<f64>>);

/// Integer lattice-cell offsets of every copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftMatrix(BTreeMap<CopyId, Vector3<i64>>);

macro_rules! copy_map_impl {
    ($name:ident, $value:ty) => {
        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn insert(&mut self, id: CopyId, value: $value) -> Option<$value> {
                self.0.insert(id, value)
            }

            pub fn get(&self, id: CopyId) -> Option<&$value> {
                self.0.get(&id)
            }

            pub fn contains(&self, id: CopyId) -> bool {
                self.0.contains_key(&id)
            }

            pub fn ids(&self) -> impl Iterator<Item = CopyId> + '_ {
                self.0.keys().copied()
            }

            pub fn iter(&self) -> impl Iterator<Item = (CopyId, &$value)> {
                self.0.iter().map(|(&id, value)| (id, value))
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl FromIterator<(CopyId, $value)> for $name {
            fn from_iter<I: IntoIterator<Item = (CopyId, $value)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

copy_map_impl!(TranslationMatrix, Vector3<f64>);
copy_map_impl!(ShiftMatrix, Vector3<i64>);

/// Computes the rotation matrix `R` of a crystal from its unit cell.
///
/// The columns of `R` are the cell vectors in the standard orientation: `a` along x,
/// `b` in the xy-plane, and `c` completing the cell.
///
/// # Errors
///
/// Returns [`GeometryError::UnsupportedSpaceGroup`] for anything other than `P 1`,
/// and [`GeometryError::SingularCell`] when the parameters do not span a volume.
pub fn compute_rotation_matrix(
    unit_cell: &UnitCell,
    space_group: SpaceGroup,
) -> Result<RotationMatrix, GeometryError> {
    if space_group != SpaceGroup::P1 {
        return Err(GeometryError::UnsupportedSpaceGroup(space_group));
    }

    let singular = |reason: &str| GeometryError::SingularCell {
        cell: *unit_cell,
        reason: reason.to_string(),
    };

    let [a, b, c] = unit_cell.lengths();
    if unit_cell
        .lengths()
        .iter()
        .chain(unit_cell.angles().iter())
        .any(|v| !v.is_finite())
    {
        return Err(singular("parameters must be finite"));
    }
    if a <= 0.0 || b <= 0.0 || c <= 0.0 {
        return Err(singular("edge lengths must be positive"));
    }

    let alpha = unit_cell.alpha.to_radians();
    let beta = unit_cell.beta.to_radians();
    let gamma = unit_cell.gamma.to_radians();

    let sin_gamma = gamma.sin();
    if sin_gamma.abs() < SINGULARITY_EPSILON {
        return Err(singular("sin(gamma) is zero"));
    }

    let bx = b * gamma.cos();
    let by = b * sin_gamma;
    let cx = c * beta.cos();
    let cy = c * (alpha.cos() - beta.cos() * gamma.cos()) / sin_gamma;
    let cz_squared = c * c - cx * cx - cy * cy;
    if cz_squared <= SINGULARITY_EPSILON * c * c {
        return Err(singular("cell angles do not close a three-dimensional cell"));
    }
    let cz = cz_squared.sqrt();

    let matrix = Matrix3::new(
        a, bx, cx, //
        0.0, by, cy, //
        0.0, 0.0, cz,
    );
    if matrix.determinant().abs() < SINGULARITY_EPSILON {
        return Err(singular("cell volume is zero"));
    }
    Ok(RotationMatrix(matrix))
}

/// Solves `R·s = t` for every copy and truncates the solution to integer lattice cells.
///
/// Components within a small tolerance of an integer snap to it first, so round-off
/// in `t` does not cost a whole cell. Any remaining fractional part is dropped.
pub fn shift_from_translation(
    translation: &TranslationMatrix,
    rotation: &RotationMatrix,
) -> Result<ShiftMatrix, GeometryError> {
    let lu = rotation.matrix().lu();
    translation
        .iter()
        .map(|(id, t)| {
            let fractional = lu.solve(t).ok_or(GeometryError::SingularSolve(id))?;
            Ok((id, fractional.map(truncate_to_cell)))
        })
        .collect()
}

/// Computes `T = R·S` for every copy. Exact up to floating-point rounding.
pub fn translation_from_shift(shift: &ShiftMatrix, rotation: &RotationMatrix) -> TranslationMatrix {
    shift
        .iter()
        .map(|(id, s)| (id, rotation.cartesian(s)))
        .collect()
}

fn truncate_to_cell(value: f64) -> i64 {
    let nearest = value.round();
    if (value - nearest).abs() < INTEGER_SNAP_TOLERANCE {
        nearest as i64
    } else {
        value.trunc() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn collagen_cell() -> UnitCell {
        UnitCell::new(39.97, 26.95, 677.9, 89.24, 94.59, 105.58)
    }

    #[test]
    fn orthogonal_cell_gives_a_diagonal_matrix() {
        let r = compute_rotation_matrix(&UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0), SpaceGroup::P1)
            .unwrap();
        let expected = Matrix3::from_diagonal(&Vector3::new(10.0, 20.0, 30.0));
        assert!((r.matrix() - expected).abs().max() < TOLERANCE);
    }

    #[test]
    fn columns_keep_the_cell_edge_lengths() {
        let cell = collagen_cell();
        let r = compute_rotation_matrix(&cell, SpaceGroup::P1).unwrap();
        let m = r.matrix();
        assert!((m.column(0).norm() - cell.a).abs() < 1e-6);
        assert!((m.column(1).norm() - cell.b).abs() < 1e-6);
        assert!((m.column(2).norm() - cell.c).abs() < 1e-6);
    }

    #[test]
    fn other_space_groups_are_rejected() {
        let result = compute_rotation_matrix(&collagen_cell(), SpaceGroup::Number(19));
        assert_eq!(result, Err(GeometryError::UnsupportedSpaceGroup(SpaceGroup::Number(19))));
    }

    #[test]
    fn unknown_symbols_are_unsupported() {
        let group = SpaceGroup::Symbol("C 2 2 2".to_string());
        let err = compute_rotation_matrix(&collagen_cell(), group.clone()).unwrap_err();
        assert_eq!(err, GeometryError::UnsupportedSpaceGroup(group));
        assert!(err.to_string().contains("'C 2 2 2'"));
    }

    #[test]
    fn gamma_of_zero_is_a_singular_cell() {
        let cell = UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 0.0);
        let result = compute_rotation_matrix(&cell, SpaceGroup::P1);
        assert!(matches!(result, Err(GeometryError::SingularCell { .. })));
    }

    #[test]
    fn flat_cells_are_singular() {
        let cell = UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0 + 90.0);
        assert!(compute_rotation_matrix(&cell, SpaceGroup::P1).is_err());

        let cell = UnitCell::new(10.0, 10.0, 10.0, 120.0, 120.0, 120.0);
        assert!(matches!(
            compute_rotation_matrix(&cell, SpaceGroup::P1),
            Err(GeometryError::SingularCell { .. })
        ));
    }

    #[test]
    fn non_positive_lengths_are_rejected() {
        let cell = UnitCell::new(0.0, 10.0, 10.0, 90.0, 90.0, 90.0);
        assert!(matches!(
            compute_rotation_matrix(&cell, SpaceGroup::P1),
            Err(GeometryError::SingularCell { .. })
        ));
    }

    #[test]
    fn lattice_translations_round_trip_exactly() {
        let r = compute_rotation_matrix(&collagen_cell(), SpaceGroup::P1).unwrap();
        let shift: ShiftMatrix = [
            (CopyId::new(0.0), Vector3::new(0, 0, 0)),
            (CopyId::new(1.0), Vector3::new(1, -1, 0)),
            (CopyId::new(2.0), Vector3::new(-2, 3, 1)),
        ]
        .into_iter()
        .collect();

        let t = translation_from_shift(&shift, &r);
        let recovered = shift_from_translation(&t, &r).unwrap();
        assert_eq!(recovered, shift);
    }

    #[test]
    fn arbitrary_translations_round_trip_within_one_cell_per_axis() {
        let r = compute_rotation_matrix(&collagen_cell(), SpaceGroup::P1).unwrap();
        let t: TranslationMatrix = [
            (CopyId::new(0.0), Vector3::new(12.3, -45.6, 700.0)),
            (CopyId::new(1.5), Vector3::new(-80.1, 33.3, -1400.2)),
            (CopyId::new(3.0), Vector3::new(0.4, 0.2, 0.1)),
        ]
        .into_iter()
        .collect();

        let s = shift_from_translation(&t, &r).unwrap();
        let back = translation_from_shift(&s, &r);

        for (id, original) in t.iter() {
            let residual = r.fractional(&(original - back.get(id).unwrap())).unwrap();
            assert!(residual.iter().all(|v| v.abs() < 1.0), "copy {id}: {residual:?}");
        }
    }

    #[test]
    fn truncation_drops_fractions_toward_zero() {
        assert_eq!(truncate_to_cell(1.7), 1);
        assert_eq!(truncate_to_cell(-1.7), -1);
        assert_eq!(truncate_to_cell(0.9999999999), 1);
        assert_eq!(truncate_to_cell(-2.0000000001), -2);
    }
}
