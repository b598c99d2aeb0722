//! Named results of a model and the query builder used to evaluate them.

use dpf_core::{EntityId, Location, Scoping};
use dpf_results::{
    EvalRequest, FieldsContainer, MeshSelector, ResultDescriptor, Split, TimeSelector,
};
use tracing::debug;

use crate::error::ModelResult;
use crate::model::Model;

/// The results available in a model, in file order.
#[derive(Clone, Copy)]
pub struct Results<'a> {
    model: &'a Model,
}

impl<'a> Results<'a> {
    pub(crate) fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn descriptors(&self) -> &'a [ResultDescriptor] {
        &self.model.metadata().result_info().results
    }

    pub fn len(&self) -> usize {
        self.descriptors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors().is_empty()
    }

    /// Accessor names, e.g. `displacement`.
    pub fn names(&self) -> Vec<&'a str> {
        self.descriptors().iter().map(|d| d.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultQuery<'a>> + 'a {
        let model = self.model;
        self.descriptors()
            .iter()
            .map(move |d| ResultQuery::new(model, d.clone()))
    }

    /// Query a result by accessor name or code.
    pub fn get(&self, name: &str) -> ModelResult<ResultQuery<'a>> {
        let descriptor = self.model.metadata().result_info().find(name)?;
        Ok(ResultQuery::new(self.model, descriptor.clone()))
    }

    pub fn by_code(&self, code: &str) -> ModelResult<ResultQuery<'a>> {
        let descriptor = self.model.metadata().result_info().by_code(code)?;
        Ok(ResultQuery::new(self.model, descriptor.clone()))
    }

    pub fn displacement(&self) -> ModelResult<ResultQuery<'a>> {
        self.by_code("U")
    }

    pub fn stress(&self) -> ModelResult<ResultQuery<'a>> {
        self.by_code("S")
    }

    pub fn elastic_strain(&self) -> ModelResult<ResultQuery<'a>> {
        self.by_code("EPEL")
    }

    pub fn element_nodal_forces(&self) -> ModelResult<ResultQuery<'a>> {
        self.by_code("ENF")
    }

    /// Thermal temperature if present, otherwise the structural one.
    pub fn temperature(&self) -> ModelResult<ResultQuery<'a>> {
        self.by_code("TEMP").or_else(|_| self.by_code("BFE"))
    }
}

/// Spatial restriction accepted by [`ResultQuery::on_mesh_scoping`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshScopingInput {
    Scoping(Scoping),
    /// Bare ids, taken on the result's native location.
    Ids(Vec<EntityId>),
}

impl From<Scoping> for MeshScopingInput {
    fn from(scoping: Scoping) -> Self {
        MeshScopingInput::Scoping(scoping)
    }
}

impl From<Vec<EntityId>> for MeshScopingInput {
    fn from(ids: Vec<EntityId>) -> Self {
        MeshScopingInput::Ids(ids)
    }
}

impl From<&[EntityId]> for MeshScopingInput {
    fn from(ids: &[EntityId]) -> Self {
        MeshScopingInput::Ids(ids.to_vec())
    }
}

/// Composable description of one evaluation. Nothing is computed until
/// [`ResultQuery::eval`].
#[derive(Debug, Clone)]
pub struct ResultQuery<'a> {
    model: &'a Model,
    descriptor: ResultDescriptor,
    request: EvalRequest,
}

impl<'a> ResultQuery<'a> {
    fn new(model: &'a Model, descriptor: ResultDescriptor) -> Self {
        let request = EvalRequest::new(descriptor.code.clone());
        Self {
            model,
            descriptor,
            request,
        }
    }

    pub fn descriptor(&self) -> &ResultDescriptor {
        &self.descriptor
    }

    pub fn request(&self) -> &EvalRequest {
        &self.request
    }

    pub fn on_all_time_freqs(mut self) -> Self {
        self.request.time = TimeSelector::AllSets;
        self
    }

    pub fn on_first_time_freq(mut self) -> Self {
        self.request.time = TimeSelector::FirstSet;
        self
    }

    pub fn on_last_time_freq(mut self) -> Self {
        self.request.time = TimeSelector::LastSet;
        self
    }

    /// Set indices (`usize`) or times/frequencies (`f64`).
    pub fn on_time_scoping(mut self, selector: impl Into<TimeSelector>) -> Self {
        self.request.time = selector.into();
        self
    }

    pub fn on_mesh_scoping(mut self, scoping: impl Into<MeshScopingInput>) -> Self {
        let scoping = match scoping.into() {
            MeshScopingInput::Scoping(scoping) => scoping,
            MeshScopingInput::Ids(ids) => Scoping::new(self.descriptor.location, ids),
        };
        self.request.mesh = MeshSelector::Scoping(scoping);
        self
    }

    pub fn on_named_selection(mut self, name: impl Into<String>) -> Self {
        self.request.mesh = MeshSelector::NamedSelection(name.into());
        self
    }

    pub fn on_location(mut self, location: Location) -> Self {
        self.request.location = Some(location);
        self
    }

    pub fn split_by_shape(mut self) -> Self {
        self.request.split = Split::ByShape;
        self
    }

    pub fn split_by_body(mut self) -> Self {
        self.request.split = Split::ByBody;
        self
    }

    pub fn eval(&self) -> ModelResult<FieldsContainer> {
        debug!(result = %self.descriptor.code, "evaluating query");
        self.model.evaluate(&self.request)
    }
}
