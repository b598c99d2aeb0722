//! Evaluation of a result request against stored data.
//!
//! An evaluation runs in four stages:
//! 1. resolve the time selector into targets, each a weighted blend of sets
//! 2. resolve the mesh selector into output entities (node or element indices)
//! 3. for every target, in parallel, convert the stored data to the output
//!    location and blend the sets
//! 4. split the entities into one field per shape or material if requested

use std::collections::HashSet;

use dpf_core::{EntityId, Location, Real, ensure_finite, lerp};
use dpf_mesh::{ElementShape, MeshedRegion};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::field::{
    Field, FieldsContainer, LabelSpace, MATERIAL_LABEL, SHAPE_LABEL, TIME_LABEL, shape_label_value,
};
use crate::request::{EvalRequest, MeshSelector, Split, TimeSelector};
use crate::result_info::{ResultDescriptor, ResultInfo};
use crate::store::ResultStore;
use crate::time_freq::TimeFreqSupport;
use crate::{ResultsError, ResultsResult};

/// One output time: a label, the value reported on the field and the sets
/// (cumulative index, weight) it is blended from.
#[derive(Debug, Clone, PartialEq)]
struct Target {
    label: u32,
    value: Real,
    blend: Vec<(usize, Real)>,
}

/// Evaluate `request` into a labelled container of fields.
pub fn evaluate(
    store: &ResultStore,
    mesh: &MeshedRegion,
    info: &ResultInfo,
    support: &TimeFreqSupport,
    request: &EvalRequest,
) -> ResultsResult<FieldsContainer> {
    let descriptor = info.find(&request.result)?;
    let native = descriptor.location;
    let output = request.location.unwrap_or(native);
    check_conversion(native, output)?;

    let (targets, out_support) = resolve_time(support, &request.time)?;

    let mut adjacency = mesh.node_to_elements();
    adjacency.iter_mut().for_each(Vec::dedup);

    let entities = resolve_entities(mesh, &adjacency, &request.mesh, output)?;
    debug!(
        result = %descriptor.code,
        targets = targets.len(),
        entities = entities.len(),
        %output,
        "evaluating result"
    );

    let ctx = Context {
        store,
        mesh,
        descriptor,
        adjacency: &adjacency,
        native,
        output,
    };

    let per_target: Vec<Vec<Option<Vec<Real>>>> = targets
        .par_iter()
        .map(|target| ctx.blend(target, &entities))
        .collect::<ResultsResult<_>>()?;

    let groups = split_groups(mesh, &adjacency, output, &entities, request.split);
    let mut labels = vec![TIME_LABEL.to_string()];
    match request.split {
        Split::None => {}
        Split::ByShape => labels.push(SHAPE_LABEL.to_string()),
        Split::ByBody => labels.push(MATERIAL_LABEL.to_string()),
    }

    let mut container = FieldsContainer::new(labels, out_support);
    for (target, values) in targets.iter().zip(&per_target) {
        for group in &groups {
            let mut field = Field::new(
                descriptor.name.clone(),
                output,
                descriptor.components,
                descriptor.unit.clone(),
            )
            .with_time_value(target.value);
            for &pos in &group.members {
                if let Some(v) = &values[pos] {
                    field.push(ctx.entity_id(entities[pos]), v);
                }
            }
            let mut space = LabelSpace::from([(TIME_LABEL.to_string(), target.label)]);
            if let Some((label, value)) = group.label {
                space.insert(label.to_string(), value);
            }
            container.add_field(space, field);
        }
    }
    Ok(container)
}

fn check_conversion(native: Location, output: Location) -> ResultsResult<()> {
    use Location::*;
    match (native, output) {
        (a, b) if a == b && a != TimeFreq => Ok(()),
        (ElementalNodal, Nodal)
        | (ElementalNodal, Elemental)
        | (Nodal, Elemental)
        | (Elemental, Nodal) => Ok(()),
        (from, to) => Err(ResultsError::UnsupportedLocation { from, to }),
    }
}

fn resolve_time(
    support: &TimeFreqSupport,
    selector: &TimeSelector,
) -> ResultsResult<(Vec<Target>, TimeFreqSupport)> {
    let n = support.n_sets();
    if n == 0 {
        return Err(ResultsError::InvalidTimeScoping {
            what: "the model has no time/frequency sets".to_string(),
        });
    }
    let sets: Vec<usize> = match selector {
        TimeSelector::Default | TimeSelector::LastSet => vec![n],
        TimeSelector::FirstSet => vec![1],
        TimeSelector::AllSets => (1..=n).collect(),
        TimeSelector::Sets(sets) => sets.clone(),
        TimeSelector::Values(values) => return resolve_values(support, values),
    };
    if sets.is_empty() {
        return Err(ResultsError::InvalidTimeScoping {
            what: "empty set list".to_string(),
        });
    }
    let mut targets = Vec::with_capacity(sets.len());
    for set in sets {
        let step = support
            .step(set)
            .ok_or_else(|| ResultsError::InvalidTimeScoping {
                what: format!("set {set} is outside 1..={n}"),
            })?;
        targets.push(Target {
            label: set as u32,
            value: step.value,
            blend: vec![(set, 1.0)],
        });
    }
    Ok((targets, support.clone()))
}

/// Targets for explicit times/frequencies, labelled by request position.
fn resolve_values(
    support: &TimeFreqSupport,
    values: &[Real],
) -> ResultsResult<(Vec<Target>, TimeFreqSupport)> {
    if values.is_empty() {
        return Err(ResultsError::InvalidTimeScoping {
            what: "empty time/frequency list".to_string(),
        });
    }
    let mut sorted: Vec<(Real, usize)> = support
        .steps()
        .iter()
        .map(|s| (s.value, s.cumulative_index))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut targets = Vec::with_capacity(values.len());
    let mut steps = Vec::with_capacity(values.len());
    for (i, &value) in values.iter().enumerate() {
        let value = ensure_finite(value, "time/frequency value")?;
        let blend = match support.get_cumulative_index_by_value(value) {
            Some(set) => vec![(set, 1.0)],
            None => bracket(&sorted, value),
        };
        let (load_step, substep) = blend
            .first()
            .and_then(|(set, _)| support.step(*set))
            .map(|s| (s.load_step, s.substep))
            .unwrap_or((1, 1));
        targets.push(Target {
            label: (i + 1) as u32,
            value,
            blend,
        });
        steps.push((value, load_step, substep));
    }
    Ok((targets, TimeFreqSupport::new(support.domain(), steps)))
}

/// Weights of the two sets around `x`, or of the two nearest sets when `x`
/// lies outside the range. `sorted` is ordered by value and non-empty.
fn bracket(sorted: &[(Real, usize)], x: Real) -> Vec<(usize, Real)> {
    if sorted.len() == 1 {
        return vec![(sorted[0].1, 1.0)];
    }
    let upper = sorted
        .iter()
        .position(|(v, _)| *v > x)
        .unwrap_or(sorted.len())
        .clamp(1, sorted.len() - 1);
    let (x0, s0) = sorted[upper - 1];
    let (x1, s1) = sorted[upper];
    let t = lerp(x0, 0.0, x1, 1.0, x);
    vec![(s0, 1.0 - t), (s1, t)]
}

fn resolve_entities(
    mesh: &MeshedRegion,
    adjacency: &[Vec<usize>],
    selector: &MeshSelector,
    output: Location,
) -> ResultsResult<Vec<usize>> {
    let scoping = match selector {
        MeshSelector::All => {
            let n = if output == Location::Nodal {
                mesh.n_nodes()
            } else {
                mesh.n_elements()
            };
            return Ok((0..n).collect());
        }
        MeshSelector::Scoping(scoping) => scoping,
        MeshSelector::NamedSelection(name) => mesh.named_selection(name)?,
    };

    let (indices, mask) = mesh.map_scoping(scoping)?;
    if let Some(pos) = mask.iter().position(|found| !found) {
        return Err(ResultsError::ScopingNotInMesh {
            location: scoping.location(),
            id: scoping.ids()[pos],
        });
    }

    let from_nodes = scoping.location() == Location::Nodal;
    let to_nodes = output == Location::Nodal;
    let entities = match (from_nodes, to_nodes) {
        (true, true) | (false, false) => indices,
        (false, true) => {
            let mut seen = HashSet::new();
            indices
                .iter()
                .flat_map(|&e| mesh.elements()[e].connectivity.iter().copied())
                .filter(|n| seen.insert(*n))
                .collect()
        }
        (true, false) => {
            let mut seen = HashSet::new();
            indices
                .iter()
                .flat_map(|&n| adjacency[n].iter().copied())
                .filter(|e| seen.insert(*e))
                .collect()
        }
    };
    Ok(entities)
}

struct Group {
    label: Option<(&'static str, u32)>,
    /// Positions into the output entity list.
    members: Vec<usize>,
}

fn split_groups(
    mesh: &MeshedRegion,
    adjacency: &[Vec<usize>],
    output: Location,
    entities: &[usize],
    split: Split,
) -> Vec<Group> {
    let elements = mesh.elements();
    // Elements an output entity belongs to.
    let owners = |entity: usize| -> Vec<usize> {
        if output == Location::Nodal {
            adjacency[entity].clone()
        } else {
            vec![entity]
        }
    };
    let select = |keep: &dyn Fn(usize) -> bool| -> Vec<usize> {
        (0..entities.len())
            .filter(|&pos| owners(entities[pos]).into_iter().any(keep))
            .collect()
    };

    match split {
        Split::None => vec![Group {
            label: None,
            members: (0..entities.len()).collect(),
        }],
        Split::ByShape => ElementShape::ALL
            .into_iter()
            .map(|shape| Group {
                label: Some((SHAPE_LABEL, shape_label_value(shape))),
                members: select(&|e| elements[e].shape() == shape),
            })
            .collect(),
        Split::ByBody => {
            let unassigned = (0..entities.len())
                .filter(|&pos| {
                    owners(entities[pos])
                        .into_iter()
                        .all(|e| elements[e].material.is_none())
                })
                .count();
            if unassigned > 0 {
                warn!(unassigned, "entities without a material are left out of the body split");
            }
            mesh.materials()
                .into_iter()
                .map(|mat| Group {
                    label: Some((MATERIAL_LABEL, mat)),
                    members: select(&|e| elements[e].material == Some(mat)),
                })
                .collect()
        }
    }
}

struct Context<'a> {
    store: &'a ResultStore,
    mesh: &'a MeshedRegion,
    descriptor: &'a ResultDescriptor,
    adjacency: &'a [Vec<usize>],
    native: Location,
    output: Location,
}

impl Context<'_> {
    fn entity_id(&self, entity: usize) -> EntityId {
        if self.output == Location::Nodal {
            self.mesh.nodes()[entity].id
        } else {
            self.mesh.elements()[entity].id
        }
    }

    /// Values of every output entity at `target`; `None` where any blended
    /// set lacks data.
    fn blend(&self, target: &Target, entities: &[usize]) -> ResultsResult<Vec<Option<Vec<Real>>>> {
        let mut blended: Option<Vec<Option<Vec<Real>>>> = None;
        for &(set, weight) in &target.blend {
            let values = self.set_values(set, entities)?;
            blended = Some(match blended {
                None => values
                    .into_iter()
                    .map(|v| v.map(|v| v.into_iter().map(|x| x * weight).collect()))
                    .collect(),
                Some(acc) => acc
                    .into_iter()
                    .zip(values)
                    .map(|(a, b)| match (a, b) {
                        (Some(a), Some(b)) if a.len() == b.len() => {
                            Some(a.iter().zip(&b).map(|(x, y)| x + y * weight).collect())
                        }
                        _ => None,
                    })
                    .collect(),
            });
        }
        Ok(blended.unwrap_or_else(|| vec![None; entities.len()]))
    }

    /// Values of every output entity at one stored set.
    fn set_values(&self, set: usize, entities: &[usize]) -> ResultsResult<Vec<Option<Vec<Real>>>> {
        let Some(stored) = self.store.get(&self.descriptor.code, set) else {
            return Ok(vec![None; entities.len()]);
        };
        let c = self.descriptor.components;
        let blocks = stored.blocks(self.mesh, self.native, c)?;
        let nodes = self.mesh.nodes();
        let elements = self.mesh.elements();

        let value = |entity: usize| -> Option<Vec<Real>> {
            use Location::*;
            match (self.native, self.output) {
                (Nodal, Nodal) => blocks.get(&nodes[entity].id).map(|b| b.to_vec()),
                (Elemental, Elemental) | (ElementalNodal, ElementalNodal) => {
                    blocks.get(&elements[entity].id).map(|b| b.to_vec())
                }
                (ElementalNodal, Nodal) => {
                    let node_id = nodes[entity].id;
                    let contributions = self.adjacency[entity].iter().flat_map(|&e| {
                        let element = &elements[e];
                        let block = blocks.get(&element.id).copied();
                        element
                            .connectivity
                            .iter()
                            .enumerate()
                            .filter(move |(_, n)| nodes[**n].id == node_id)
                            .filter_map(move |(k, _)| block.map(|b| &b[k * c..(k + 1) * c]))
                    });
                    average(contributions, c)
                }
                (ElementalNodal, Elemental) => blocks
                    .get(&elements[entity].id)
                    .and_then(|b| average(b.chunks_exact(c.max(1)), c)),
                (Nodal, Elemental) => average(
                    elements[entity]
                        .connectivity
                        .iter()
                        .filter_map(|&n| blocks.get(&nodes[n].id).copied()),
                    c,
                ),
                (Elemental, Nodal) => average(
                    self.adjacency[entity]
                        .iter()
                        .filter_map(|&e| blocks.get(&elements[e].id).copied()),
                    c,
                ),
                _ => None,
            }
        };
        Ok(entities.iter().map(|&e| value(e)).collect())
    }
}

/// Component-wise mean of `c`-long blocks; `None` when there are none.
fn average<'a>(blocks: impl Iterator<Item = &'a [Real]>, c: usize) -> Option<Vec<Real>> {
    let mut sum = vec![0.0; c];
    let mut count = 0usize;
    for block in blocks {
        for (s, v) in sum.iter_mut().zip(block) {
            *s += v;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    sum.iter_mut().for_each(|s| *s /= count as Real);
    Some(sum)
}
