use crate::core::io::connect::Components;
use crate::core::models::copy::CopyModel;
use crate::core::models::ids::CopyId;
use crate::core::models::marker::MarkerSet;
use crate::core::models::system::{Adjacency, CopySystem};
use crate::core::utils::geometry::distance;
use crate::engine::config::ConnectivityConfig;
use crate::engine::error::ConnectivityError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// True if any marker of `a` is strictly closer than `cutoff` to any marker of `b`.
///
/// Stops at the first qualifying pair. An empty set is never connected.
pub fn is_connected(a: &MarkerSet, b: &MarkerSet, cutoff: f64) -> bool {
    a.positions()
        .any(|p| b.positions().any(|q| distance(p, q) < cutoff))
}

fn validate(copies: &[&CopyModel], cutoff: f64) -> Result<(), ConnectivityError> {
    if !cutoff.is_finite() || cutoff <= 0.0 {
        return Err(ConnectivityError::InvalidCutoff(cutoff));
    }
    for copy in copies {
        if let Some((serial, _)) = copy
            .markers
            .iter()
            .find(|(_, m)| m.position.iter().any(|v| !v.is_finite()))
        {
            return Err(ConnectivityError::NonFiniteCoordinate {
                copy: copy.id,
                serial,
            });
        }
    }
    Ok(())
}

/// Tests every unordered pair of copies once and returns the full neighbour sets.
///
/// Every copy appears as a key, including copies with no neighbours, and every
/// connection is recorded in both directions.
#[instrument(skip_all, name = "contact_graph_task")]
pub fn pairwise_adjacency(
    system: &CopySystem,
    config: &ConnectivityConfig,
    reporter: &ProgressReporter,
) -> Result<Adjacency, ConnectivityError> {
    let copies: Vec<&CopyModel> = system.copies().collect();
    validate(&copies, config.cutoff)?;
    info!(copies = copies.len(), cutoff = config.cutoff, "Computing pairwise contacts.");

    let pairs: Vec<(&CopyModel, &CopyModel)> = copies.iter().copied().tuple_combinations().collect();
    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let connected: Vec<(CopyId, CopyId)> = iterator
        .filter_map(|(a, b)| {
            let hit = is_connected(&a.markers, &b.markers, config.cutoff);
            reporter.report(Progress::TaskIncrement);
            hit.then_some((a.id, b.id))
        })
        .collect();

    reporter.report(Progress::TaskFinish);

    let mut adjacency: Adjacency = copies.iter().map(|c| (c.id, BTreeSet::new())).collect();
    for (a, b) in connected {
        adjacency.entry(a).or_default().insert(b);
        adjacency.entry(b).or_default().insert(a);
    }

    let edges: usize = adjacency.values().map(BTreeSet::len).sum::<usize>() / 2;
    info!(edges, "Pairwise contacts complete.");
    Ok(adjacency)
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Joins the sets of `a` and `b`; the smaller root index wins.
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

/// Merges the pairwise relation into connected components (its transitive closure).
///
/// Each component is keyed by its smallest member and lists its members in ascending
/// order. Copies with no neighbours form singleton components. Ids that appear only
/// as neighbours are included as well. The result does not depend on input ordering.
pub fn merge_components(adjacency: &Adjacency) -> Components {
    let ids: Vec<CopyId> = adjacency
        .iter()
        .flat_map(|(id, neighbours)| std::iter::once(id).chain(neighbours))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<CopyId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut sets = DisjointSet::new(ids.len());
    for (id, neighbours) in adjacency {
        for neighbour in neighbours {
            sets.union(index[id], index[neighbour]);
        }
    }

    let mut components = Components::new();
    for (i, &id) in ids.iter().enumerate() {
        let root = ids[sets.find(i)];
        components.entry(root).or_default().push(id);
    }
    debug!(
        copies = ids.len(),
        components = components.len(),
        "Merged connected components."
    );
    components
}

/// True if `candidate` touches at least one copy already placed in `system`.
pub fn adding_one_model(system: &CopySystem, candidate: &CopyModel, cutoff: f64) -> bool {
    system
        .copies()
        .filter(|copy| copy.id != candidate.id)
        .any(|copy| is_connected(&copy.markers, &candidate.markers, cutoff))
}
