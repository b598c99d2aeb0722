//! Evaluated data: fields and labelled field containers.

use core::fmt;
use std::collections::BTreeMap;

use dpf_core::{EntityId, Location, Real, Scoping};
use dpf_mesh::ElementShape;
use serde::{Deserialize, Serialize};

use crate::time_freq::TimeFreqSupport;

/// Values of one result on a set of entities at one time/frequency.
///
/// Data is stored flat; entity `i` owns `data[offsets[i]..offsets[i + 1]]`.
/// For nodal and elemental fields every entity owns `n_components` values;
/// for elemental-nodal fields an element owns one block of `n_components`
/// values per connected node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub location: Location,
    pub n_components: usize,
    pub unit: String,
    /// Time or frequency the values were extracted at.
    pub time_value: Option<Real>,
    ids: Vec<EntityId>,
    offsets: Vec<usize>,
    data: Vec<Real>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        location: Location,
        n_components: usize,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            n_components,
            unit: unit.into(),
            time_value: None,
            ids: Vec::new(),
            offsets: vec![0],
            data: Vec::new(),
        }
    }

    pub fn with_time_value(mut self, value: Real) -> Self {
        self.time_value = Some(value);
        self
    }

    /// Append one entity and its values.
    pub fn push(&mut self, id: EntityId, values: &[Real]) {
        self.ids.push(id);
        self.data.extend_from_slice(values);
        self.offsets.push(self.data.len());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn scoping(&self) -> Scoping {
        Scoping::new(self.location, self.ids.iter().copied())
    }

    /// All values, entity after entity.
    pub fn data(&self) -> &[Real] {
        &self.data
    }

    /// Number of scalar values stored (the elementary data count).
    pub fn elementary_data_count(&self) -> usize {
        self.data.len()
    }

    pub fn entity_data(&self, index: usize) -> Option<&[Real]> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        Some(&self.data[start..end])
    }

    pub fn entity_data_by_id(&self, id: EntityId) -> Option<&[Real]> {
        let index = self.ids.iter().position(|&i| i == id)?;
        self.entity_data(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[Real])> + '_ {
        (0..self.len()).map(move |i| (self.ids[i], &self.data[self.offsets[i]..self.offsets[i + 1]]))
    }

    /// Values of one component across every stored block.
    pub fn component(&self, component: usize) -> Vec<Real> {
        if component >= self.n_components {
            return Vec::new();
        }
        self.data
            .chunks_exact(self.n_components)
            .map(|block| block[component])
            .collect()
    }

    /// Per-component minimum and maximum over every stored block.
    pub fn min_max(&self) -> Option<(Vec<Real>, Vec<Real>)> {
        if self.data.is_empty() || self.n_components == 0 {
            return None;
        }
        let mut min = vec![Real::INFINITY; self.n_components];
        let mut max = vec![Real::NEG_INFINITY; self.n_components];
        for block in self.data.chunks_exact(self.n_components) {
            for (c, &v) in block.iter().enumerate() {
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }
        Some((min, max))
    }

    /// Euclidean norm of every block of components, as a one-component field.
    pub fn norm(&self) -> Field {
        let mut out = Field::new(
            format!("{}_norm", self.name),
            self.location,
            1,
            self.unit.clone(),
        );
        out.time_value = self.time_value;
        for (id, values) in self.iter() {
            let norms: Vec<Real> = values
                .chunks_exact(self.n_components.max(1))
                .map(|block| block.iter().map(|v| v * v).sum::<Real>().sqrt())
                .collect();
            out.push(id, &norms);
        }
        out
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF {} Field", self.name)?;
        writeln!(f, "  Location: {}", self.location)?;
        writeln!(f, "  Unit: {}", self.unit)?;
        writeln!(f, "  {} entities ", self.len())?;
        writeln!(
            f,
            "  Data: {} components and {} elementary data ",
            self.n_components,
            self.elementary_data_count()
        )
    }
}

/// Label values identifying one field of a container, e.g. `{time: 2, elshape: 0}`.
pub type LabelSpace = BTreeMap<String, u32>;

pub const TIME_LABEL: &str = "time";
pub const SHAPE_LABEL: &str = "elshape";
pub const MATERIAL_LABEL: &str = "mat";

/// Label value of a shape in shape-split containers.
pub fn shape_label_value(shape: ElementShape) -> u32 {
    match shape {
        ElementShape::Solid => 0,
        ElementShape::Shell => 1,
        ElementShape::Beam => 2,
        ElementShape::UnknownShape => 3,
    }
}

/// Ordered collection of fields, each identified by a label space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsContainer {
    labels: Vec<String>,
    entries: Vec<(LabelSpace, Field)>,
    time_freq_support: TimeFreqSupport,
}

impl FieldsContainer {
    pub fn new(labels: Vec<String>, time_freq_support: TimeFreqSupport) -> Self {
        Self {
            labels,
            entries: Vec::new(),
            time_freq_support,
        }
    }

    pub fn add_field(&mut self, label_space: LabelSpace, field: Field) {
        self.entries.push((label_space, field));
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.entries.get(index).map(|(_, f)| f)
    }

    pub fn label_space(&self, index: usize) -> Option<&LabelSpace> {
        self.entries.get(index).map(|(l, _)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LabelSpace, &Field)> + '_ {
        self.entries.iter().map(|(l, f)| (l, f))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.entries.iter().map(|(_, f)| f)
    }

    /// Time/frequency support of the sets this container was evaluated on.
    pub fn time_freq_support(&self) -> &TimeFreqSupport {
        &self.time_freq_support
    }

    /// Distinct values taken by `label`, in first-appearance order.
    pub fn get_label_scoping(&self, label: &str) -> Option<Vec<u32>> {
        if !self.labels.iter().any(|l| l == label) {
            return None;
        }
        let mut values = Vec::new();
        for (space, _) in &self.entries {
            if let Some(&v) = space.get(label)
                && !values.contains(&v)
            {
                values.push(v);
            }
        }
        Some(values)
    }

    /// First field whose label space contains every given `(label, value)`.
    pub fn get_field(&self, query: &[(&str, u32)]) -> Option<&Field> {
        self.entries
            .iter()
            .find(|(space, _)| {
                query
                    .iter()
                    .all(|(label, value)| space.get(*label) == Some(value))
            })
            .map(|(_, f)| f)
    }

    pub fn field_by_time(&self, time_label: u32) -> Option<&Field> {
        self.get_field(&[(TIME_LABEL, time_label)])
    }

    pub fn shape_field(&self, shape: ElementShape) -> Option<&Field> {
        self.get_field(&[(SHAPE_LABEL, shape_label_value(shape))])
    }

    pub fn solid_field(&self) -> Option<&Field> {
        self.shape_field(ElementShape::Solid)
    }

    pub fn shell_field(&self) -> Option<&Field> {
        self.shape_field(ElementShape::Shell)
    }

    pub fn beam_field(&self) -> Option<&Field> {
        self.shape_field(ElementShape::Beam)
    }

    pub fn unknown_shape_field(&self) -> Option<&Field> {
        self.shape_field(ElementShape::UnknownShape)
    }

    pub fn get_mat_scoping(&self) -> Option<Vec<u32>> {
        self.get_label_scoping(MATERIAL_LABEL)
    }

    pub fn field_by_mat_id(&self, material: u32) -> Option<&Field> {
        self.get_field(&[(MATERIAL_LABEL, material)])
    }
}

impl fmt::Display for FieldsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF  Fields Container")?;
        writeln!(f, "  with {} field(s)", self.len())?;
        writeln!(f, "  defined on labels: {} ", self.labels.join(" "))?;
        writeln!(f)?;
        writeln!(f, "  with:")?;
        for (i, (space, field)) in self.entries.iter().enumerate() {
            let labels: Vec<String> = space.iter().map(|(k, v)| format!("{k}:  {v}")).collect();
            writeln!(
                f,
                "  - field {} {{{}}} with {} location, {} components and {} entities.",
                i,
                labels.join(", "),
                field.location,
                field.n_components,
                field.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_freq::TimeDomain;

    fn vector_field() -> Field {
        let mut f = Field::new("displacement", Location::Nodal, 3, "m");
        f.push(1, &[3.0, 4.0, 0.0]);
        f.push(7, &[0.0, -1.0, 0.0]);
        f
    }

    #[test]
    fn entity_access() {
        let f = vector_field();
        assert_eq!(f.len(), 2);
        assert_eq!(f.entity_data(1), Some(&[0.0, -1.0, 0.0][..]));
        assert_eq!(f.entity_data_by_id(1), Some(&[3.0, 4.0, 0.0][..]));
        assert_eq!(f.entity_data_by_id(2), None);
        assert_eq!(f.component(1), vec![4.0, -1.0]);
        assert_eq!(f.scoping().ids(), &[1, 7]);
    }

    #[test]
    fn norm_and_extrema() {
        let f = vector_field();
        let n = f.norm();
        assert_eq!(n.n_components, 1);
        assert_eq!(n.data(), &[5.0, 1.0]);
        let (min, max) = f.min_max().unwrap();
        assert_eq!(min, vec![0.0, -1.0, 0.0]);
        assert_eq!(max, vec![3.0, 4.0, 0.0]);
    }

    #[test]
    fn elemental_nodal_blocks() {
        let mut f = Field::new("temperature", Location::ElementalNodal, 1, "degC");
        f.push(10, &[1.0, 2.0, 3.0, 4.0]);
        f.push(30, &[5.0, 6.0]);
        assert_eq!(f.entity_data(0).unwrap().len(), 4);
        assert_eq!(f.entity_data(1).unwrap().len(), 2);
        assert_eq!(f.elementary_data_count(), 6);
    }

    #[test]
    fn container_labels() {
        let support = TimeFreqSupport::new(TimeDomain::Time, [(0.1, 1, 1), (0.2, 1, 2)]);
        let mut fc = FieldsContainer::new(
            vec![TIME_LABEL.to_string(), SHAPE_LABEL.to_string()],
            support,
        );
        for time in [1, 2] {
            for shape in ElementShape::ALL {
                let space = LabelSpace::from([
                    (TIME_LABEL.to_string(), time),
                    (SHAPE_LABEL.to_string(), shape_label_value(shape)),
                ]);
                fc.add_field(space, Field::new(shape.label(), Location::Nodal, 1, ""));
            }
        }
        assert_eq!(fc.len(), 8);
        assert_eq!(fc.get_label_scoping(TIME_LABEL), Some(vec![1, 2]));
        assert_eq!(fc.get_label_scoping(SHAPE_LABEL), Some(vec![0, 1, 2, 3]));
        assert_eq!(fc.get_label_scoping(MATERIAL_LABEL), None);
        assert_eq!(fc.shell_field().unwrap().name, "shell");
        assert_eq!(
            fc.get_field(&[(TIME_LABEL, 2), (SHAPE_LABEL, 2)]).unwrap().name,
            "beam"
        );
    }
}
