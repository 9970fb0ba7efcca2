use crate::core::geometry::crystal::{
    RotationMatrix, ShiftMatrix, TranslationMatrix, compute_rotation_matrix,
    shift_from_translation, translation_from_shift,
};
use crate::core::geometry::lattice::fill_top_layer;
use crate::core::io::connect::{Components, write_connect_to_path};
use crate::core::io::contacts::{find_contact, read_contacts_from_path, write_contacts_to_path};
use crate::core::io::pdb::{read_crystal_from_path, read_markers_from_path};
use crate::core::models::copy::CopyModel;
use crate::core::models::crystal::UnitCell;
use crate::core::models::ids::CopyId;
use crate::core::models::marker::MarkerSet;
use crate::core::models::system::{Adjacency, CopySystem};
use crate::engine::config::GeometryConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks::contact_graph::{
    adding_one_model, is_connected, merge_components, pairwise_adjacency,
};
use nalgebra::Vector3;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct GeometryOutputs {
    pub contacts_path: PathBuf,
    pub connect_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GeometryResult {
    pub unit_cell: UnitCell,
    pub rotation: RotationMatrix,
    pub shift: ShiftMatrix,
    /// Translation matrix rebuilt from the integer shifts.
    pub translation: TranslationMatrix,
    pub system: CopySystem,
    /// Marker atoms of the asymmetric unit, untranslated.
    pub markers: MarkerSet,
    pub adjacency: Adjacency,
    pub components: Components,
    pub skipped_markers: usize,
    pub outputs: GeometryOutputs,
}

/// Output paths derived from the contacts file: `<stem>_opt.txt` and `<stem>_connect.txt`.
pub fn output_paths(contacts_path: &Path, output_dir: &Path) -> GeometryOutputs {
    let stem = contacts_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contacts".to_string());
    GeometryOutputs {
        contacts_path: output_dir.join(format!("{}_opt.txt", stem)),
        connect_path: output_dir.join(format!("{}_connect.txt", stem)),
    }
}

/// Places one copy of `markers` per entry of `translation`.
pub fn build_system(
    unit_cell: UnitCell,
    translation: &TranslationMatrix,
    shift: &ShiftMatrix,
    markers: &MarkerSet,
) -> CopySystem {
    let mut system = CopySystem::new(unit_cell);
    for (id, t) in translation.iter() {
        let s = shift.get(id).copied().unwrap_or_else(Vector3::zeros);
        system.add_copy(CopyModel::place(id, *t, s, markers));
    }
    system
}

/// Adds the cells missing from the topmost z-layer to `shift` under fresh copy ids.
///
/// New ids continue after the largest existing id. Returns the ids that were added.
pub fn extend_top_layer(shift: &mut ShiftMatrix) -> Vec<CopyId> {
    let mut next = shift
        .ids()
        .map(CopyId::value)
        .fold(-1.0_f64, f64::max)
        .floor()
        + 1.0;
    let mut added = Vec::new();
    for node in fill_top_layer(shift) {
        let id = CopyId::new(next);
        shift.insert(id, Vector3::new(node[0], node[1], node[2]));
        added.push(id);
        next += 1.0;
    }
    added
}

/// Removes every copy not listed in a later contacts matrix. Returns the removed ids.
fn prune_to_contacts(system: &mut CopySystem, contacts: &TranslationMatrix) -> Vec<CopyId> {
    let keep: BTreeSet<CopyId> = contacts.ids().collect();
    let removed = system.retain_ids(&keep);
    if !removed.is_empty() {
        info!(removed = removed.len(), remaining = system.len(), "Pruned copies absent from contacts.");
    }
    removed
}

/// Places copy `id` of a contacts file into an analysed system if it touches a placed copy.
///
/// The copy's translation is snapped to its lattice cell like every other copy. On
/// success the adjacency, components and both matrices include the new copy. Returns
/// `false` and leaves `result` unchanged when the copy is already placed or touches nothing.
#[instrument(skip_all, name = "add_copy", fields(id = %id, cutoff))]
pub fn add_copy(
    result: &mut GeometryResult,
    contacts_path: &Path,
    id: CopyId,
    cutoff: f64,
) -> Result<bool, EngineError> {
    if result.system.copy(id).is_some() {
        return Ok(false);
    }
    let listed: TranslationMatrix = [(id, find_contact(contacts_path, id)?)].into_iter().collect();
    let shift = shift_from_translation(&listed, &result.rotation)?
        .get(id)
        .copied()
        .unwrap_or_else(Vector3::zeros);
    let translation = result.rotation.cartesian(&shift);
    let mut candidate = CopyModel::place(id, translation, shift, &result.markers);
    if !adding_one_model(&result.system, &candidate, cutoff) {
        info!("Copy touches no placed copy; not added.");
        return Ok(false);
    }

    let neighbours: Vec<CopyId> = result
        .system
        .copies()
        .filter(|copy| is_connected(&copy.markers, &candidate.markers, cutoff))
        .map(|copy| copy.id)
        .collect();
    for &other in &neighbours {
        candidate.add_connection(other);
        result.adjacency.entry(other).or_default().insert(id);
        if let Some(copy) = result.system.copy_mut(other) {
            copy.add_connection(id);
        }
    }
    result.adjacency.insert(id, neighbours.iter().copied().collect());
    result.system.add_copy(candidate);
    result.shift.insert(id, shift);
    result.translation.insert(id, translation);
    result.components = merge_components(&result.adjacency);
    info!(neighbours = neighbours.len(), "Added copy to the system.");
    Ok(true)
}

/// Builds the copy system of a crystal and analyses which copies are connected.
///
/// Reads the unit cell and marker atoms of the asymmetric unit and the translation
/// matrix of the contacts file, converts translations to integer lattice shifts and
/// back, places every copy, computes the pairwise contact graph and its components,
/// and writes the symmetrized contacts and the connect file.
#[instrument(skip_all, name = "geometry_workflow")]
pub fn run(config: &GeometryConfig, reporter: &ProgressReporter) -> Result<GeometryResult, EngineError> {
    // === Phase 1: Read inputs ===
    let (unit_cell, space_group, scan, contacts) = reporter.phase("Reading inputs", || {
        let (unit_cell, space_group) = read_crystal_from_path(&config.pdb_path)?;
        let scan = read_markers_from_path(&config.pdb_path)?;
        let contacts = read_contacts_from_path(&config.contacts_path)?;
        Ok::<_, EngineError>((unit_cell, space_group, scan, contacts))
    })?;
    if scan.markers.is_empty() {
        return Err(EngineError::NoMarkers(config.pdb_path.display().to_string()));
    }
    if !scan.skipped.is_empty() {
        warn!(skipped = scan.skipped.len(), "Some cross-link records could not be parsed.");
    }
    info!(
        markers = scan.markers.len(),
        copies = contacts.len(),
        "Loaded asymmetric unit and contacts."
    );

    // === Phase 2: Lattice ===
    let (rotation, shift, translation) = reporter.phase("Lattice", || {
        let rotation = compute_rotation_matrix(&unit_cell, space_group)?;
        let mut shift = shift_from_translation(&contacts, &rotation)?;
        if config.fill_top_layer {
            let added = extend_top_layer(&mut shift);
            info!(added = added.len(), "Filled topmost lattice layer.");
        }
        let translation = translation_from_shift(&shift, &rotation);
        Ok::<_, EngineError>((rotation, shift, translation))
    })?;

    // === Phase 3: Connectivity ===
    let mut system = build_system(unit_cell, &translation, &shift, &scan.markers);
    let (shift, translation) = match &config.prune_with {
        Some(path) => {
            let later = read_contacts_from_path(path)?;
            prune_to_contacts(&mut system, &later);
            let shift: ShiftMatrix = shift
                .iter()
                .filter(|(id, _)| system.copy(*id).is_some())
                .map(|(id, s)| (id, *s))
                .collect();
            let translation: TranslationMatrix = translation
                .iter()
                .filter(|(id, _)| system.copy(*id).is_some())
                .map(|(id, t)| (id, *t))
                .collect();
            (shift, translation)
        }
        None => (shift, translation),
    };
    let (adjacency, components) = reporter.phase("Connectivity", || {
        let adjacency = pairwise_adjacency(&system, &config.connectivity, reporter)?;
        let components = merge_components(&adjacency);
        Ok::<_, EngineError>((adjacency, components))
    })?;
    system.apply_adjacency(&adjacency);
    info!(
        copies = system.len(),
        connected = system.connected_count(),
        components = components.len(),
        "Connectivity analysis complete."
    );

    // === Phase 4: Write outputs ===
    let outputs = output_paths(&config.contacts_path, &config.output_dir);
    reporter.phase("Writing outputs", || {
        write_contacts_to_path(&translation, &outputs.contacts_path)?;
        write_connect_to_path(&components, &outputs.connect_path)?;
        Ok::<_, EngineError>(())
    })?;

    Ok(GeometryResult {
        unit_cell,
        rotation,
        shift,
        translation,
        system,
        markers: scan.markers,
        adjacency,
        components,
        skipped_markers: scan.skipped.len(),
        outputs,
    })
}
