//! Result file schema definitions.

use dpf_core::{EntityId, Location};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultFile {
    pub version: u32,
    pub analysis: AnalysisDef,
    pub mesh: MeshDef,
    #[serde(default)]
    pub time_freq_support: TimeFreqSupportDef,
    #[serde(default)]
    pub results: Vec<ResultDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDef {
    pub analysis_type: String,
    pub physics_type: String,
    pub unit_system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeshDef {
    pub unit: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub named_selections: Vec<NamedSelectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: EntityId,
    pub coordinates: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    pub id: EntityId,
    /// Element type name, e.g. `Hex8`.
    #[serde(rename = "type")]
    pub element_type: String,
    pub connectivity: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedSelectionDef {
    pub name: String,
    pub location: Location,
    pub ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeFreqSupportDef {
    #[serde(default)]
    pub steps: Vec<StepDef>,
    /// Version 1 layout: bare values, one load step each.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDef {
    pub time: f64,
    pub load_step: u32,
    pub substep: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDef {
    pub code: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub location: Location,
    pub components: usize,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub sets: Vec<SetDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetDef {
    /// Cumulative set index, 1-based.
    pub set: usize,
    pub ids: Vec<EntityId>,
    pub data: Vec<f64>,
}
