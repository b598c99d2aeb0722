//! Descriptive information about an analysis and the results it recorded.

use core::fmt;

use dpf_core::Location;
use serde::{Deserialize, Serialize};

use crate::time_freq::TimeDomain;
use crate::{ResultsError, ResultsResult};

/// Analysis category. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisType {
    Static,
    Transient,
    Modal,
    Harmonic,
    Other(String),
}

impl AnalysisType {
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisType::Static => "static",
            AnalysisType::Transient => "transient",
            AnalysisType::Modal => "modal",
            AnalysisType::Harmonic => "harmonic",
            AnalysisType::Other(label) => label,
        }
    }

    /// Axis the time/frequency support of this analysis is expressed on.
    pub fn time_domain(&self) -> TimeDomain {
        match self {
            AnalysisType::Modal | AnalysisType::Harmonic => TimeDomain::Frequency,
            _ => TimeDomain::Time,
        }
    }
}

impl From<String> for AnalysisType {
    fn from(label: String) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "static" => AnalysisType::Static,
            "transient" => AnalysisType::Transient,
            "modal" => AnalysisType::Modal,
            "harmonic" => AnalysisType::Harmonic,
            _ => AnalysisType::Other(label),
        }
    }
}

impl From<AnalysisType> for String {
    fn from(t: AnalysisType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named physical quantity available in a result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDescriptor {
    /// Short operator code, e.g. `U`.
    pub code: String,
    /// Accessor name, e.g. `displacement`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Location the data is stored on.
    pub location: Location,
    pub components: usize,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub analysis_type: AnalysisType,
    pub physics_type: String,
    pub unit_system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    pub results: Vec<ResultDescriptor>,
}

impl ResultInfo {
    pub fn n_results(&self) -> usize {
        self.results.len()
    }

    pub fn by_name(&self, name: &str) -> ResultsResult<&ResultDescriptor> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ResultsError::ResultNotFound {
                name: name.to_string(),
            })
    }

    pub fn by_code(&self, code: &str) -> ResultsResult<&ResultDescriptor> {
        self.results
            .iter()
            .find(|r| r.code == code)
            .ok_or_else(|| ResultsError::ResultNotFound {
                name: code.to_string(),
            })
    }

    /// Look up by accessor name first, then by code.
    pub fn find(&self, name_or_code: &str) -> ResultsResult<&ResultDescriptor> {
        self.by_name(name_or_code)
            .or_else(|_| self.by_code(name_or_code))
    }
}

impl fmt::Display for ResultInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF Result Info ")?;
        writeln!(f, "  Analysis: {} ", self.analysis_type)?;
        writeln!(f, "  Physics Type: {} ", self.physics_type)?;
        writeln!(f, "  Unit system: {} ", self.unit_system)?;
        writeln!(f, "  Available results: ")?;
        for r in &self.results {
            writeln!(f, "    {} {} :{} ", r.code, r.display_name, r.description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ResultInfo {
        ResultInfo {
            analysis_type: AnalysisType::Static,
            physics_type: "mecanic".to_string(),
            unit_system: "MKS: m, kg, N, s, V, A, degC".to_string(),
            solver: None,
            job_name: None,
            results: vec![ResultDescriptor {
                code: "U".to_string(),
                name: "displacement".to_string(),
                display_name: "Displacement".to_string(),
                description: "nodal displacements".to_string(),
                location: Location::Nodal,
                components: 3,
                unit: "m".to_string(),
            }],
        }
    }

    #[test]
    fn lookup_by_name_or_code() {
        let info = info();
        assert_eq!(info.find("U").unwrap().name, "displacement");
        assert_eq!(info.find("displacement").unwrap().code, "U");
        assert!(matches!(
            info.find("stress"),
            Err(ResultsError::ResultNotFound { .. })
        ));
    }

    #[test]
    fn report_layout() {
        let expected = "DPF Result Info \n  Analysis: static \n  Physics Type: mecanic \n  Unit system: MKS: m, kg, N, s, V, A, degC \n  Available results: \n    U Displacement :nodal displacements \n";
        assert_eq!(info().to_string(), expected);
    }

    #[test]
    fn analysis_labels_round_trip() {
        assert_eq!(AnalysisType::from("Modal".to_string()), AnalysisType::Modal);
        let other = AnalysisType::from("buckling".to_string());
        assert_eq!(other.as_str(), "buckling");
        assert_eq!(other.time_domain(), TimeDomain::Time);
        assert_eq!(AnalysisType::Harmonic.time_domain(), TimeDomain::Frequency);
    }
}
