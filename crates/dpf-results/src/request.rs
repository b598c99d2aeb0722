//! Serializable description of one result evaluation.

use dpf_core::{Location, Real, Scoping};
use serde::{Deserialize, Serialize};

/// Which time/frequency sets to evaluate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values")]
pub enum TimeSelector {
    /// The last set.
    #[default]
    Default,
    AllSets,
    FirstSet,
    LastSet,
    /// Cumulative set indices, 1-based.
    Sets(Vec<usize>),
    /// Times or frequencies; values between sets are interpolated.
    Values(Vec<Real>),
}

impl From<Vec<usize>> for TimeSelector {
    fn from(sets: Vec<usize>) -> Self {
        TimeSelector::Sets(sets)
    }
}

impl From<usize> for TimeSelector {
    fn from(set: usize) -> Self {
        TimeSelector::Sets(vec![set])
    }
}

impl From<Vec<Real>> for TimeSelector {
    fn from(values: Vec<Real>) -> Self {
        TimeSelector::Values(values)
    }
}

impl From<Real> for TimeSelector {
    fn from(value: Real) -> Self {
        TimeSelector::Values(vec![value])
    }
}

/// Which spatial entities to evaluate on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum MeshSelector {
    #[default]
    All,
    Scoping(Scoping),
    NamedSelection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Split {
    #[default]
    None,
    ByShape,
    ByBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRequest {
    /// Result code, e.g. `U`.
    pub result: String,
    #[serde(default)]
    pub time: TimeSelector,
    #[serde(default)]
    pub mesh: MeshSelector,
    /// Output location; `None` keeps the result's native location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub split: Split,
}

impl EvalRequest {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            time: TimeSelector::Default,
            mesh: MeshSelector::All,
            location: None,
            split: Split::None,
        }
    }
}
