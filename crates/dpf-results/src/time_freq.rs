//! Time/frequency support: the ordered list of result sets of an analysis.

use core::fmt;

use dpf_core::{Real, Tolerances, nearly_equal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDomain {
    Time,
    Frequency,
}

impl TimeDomain {
    pub fn column_label(self) -> &'static str {
        match self {
            TimeDomain::Time => "Time (s)",
            TimeDomain::Frequency => "Frequency (Hz)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStep {
    /// 1-based position of the set across all load steps.
    pub cumulative_index: usize,
    pub value: Real,
    pub load_step: u32,
    pub substep: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFreqSupport {
    domain: TimeDomain,
    steps: Vec<TimeStep>,
}

impl TimeFreqSupport {
    /// Build from `(value, load_step, substep)` triples in record order.
    pub fn new(domain: TimeDomain, steps: impl IntoIterator<Item = (Real, u32, u32)>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, (value, load_step, substep))| TimeStep {
                cumulative_index: i + 1,
                value,
                load_step,
                substep,
            })
            .collect();
        Self { domain, steps }
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    pub fn n_sets(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[TimeStep] {
        &self.steps
    }

    pub fn time_frequencies(&self) -> Vec<Real> {
        self.steps.iter().map(|s| s.value).collect()
    }

    pub fn step(&self, cumulative_index: usize) -> Option<&TimeStep> {
        cumulative_index
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
    }

    pub fn first(&self) -> Option<&TimeStep> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&TimeStep> {
        self.steps.last()
    }

    pub fn get_frequency(&self, load_step: u32, substep: u32) -> Option<Real> {
        self.find(load_step, substep).map(|s| s.value)
    }

    pub fn get_frequency_by_cumulative(&self, cumulative_index: usize) -> Option<Real> {
        self.step(cumulative_index).map(|s| s.value)
    }

    pub fn get_cumulative_index(&self, load_step: u32, substep: u32) -> Option<usize> {
        self.find(load_step, substep).map(|s| s.cumulative_index)
    }

    /// Set whose value matches within the default tolerances.
    pub fn get_cumulative_index_by_value(&self, value: Real) -> Option<usize> {
        let tol = Tolerances::default();
        self.steps
            .iter()
            .find(|s| nearly_equal(s.value, value, tol))
            .map(|s| s.cumulative_index)
    }

    fn find(&self, load_step: u32, substep: u32) -> Option<&TimeStep> {
        self.steps
            .iter()
            .find(|s| s.load_step == load_step && s.substep == substep)
    }
}

impl fmt::Display for TimeFreqSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF  Time/Freq Support: ")?;
        writeln!(f, "  Number of sets: {} ", self.n_sets())?;
        writeln!(
            f,
            "{:<15}{:<15}{:<15}{:<15}",
            "Cumulative",
            self.domain.column_label(),
            "LoadStep",
            "Substep"
        )?;
        for s in &self.steps {
            writeln!(
                f,
                "{:<15}{:<15}{:<15}{:<15}",
                s.cumulative_index,
                format!("{:.6}", s.value),
                s.load_step,
                s.substep
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn transient() -> TimeFreqSupport {
        TimeFreqSupport::new(
            TimeDomain::Time,
            [(0.02, 1, 1), (0.04, 1, 2), (0.06, 2, 1), (0.08, 2, 2), (0.1, 2, 3)],
        )
    }

    #[test]
    fn lookups() {
        let tf = transient();
        assert_eq!(tf.n_sets(), 5);
        assert_eq!(tf.get_frequency(1, 1), Some(0.02));
        assert_eq!(tf.get_frequency(1, 2), Some(0.04));
        assert_eq!(tf.get_frequency_by_cumulative(3), Some(0.06));
        assert_eq!(tf.get_cumulative_index(1, 1), Some(1));
        assert_eq!(tf.get_cumulative_index_by_value(0.06), Some(3));
        assert_eq!(tf.get_cumulative_index_by_value(0.07), None);
        assert_eq!(tf.step(0), None);
        assert_eq!(tf.step(6), None);
        assert_eq!(tf.last().unwrap().value, 0.1);
    }

    #[test]
    fn report_layout() {
        let tf = TimeFreqSupport::new(TimeDomain::Time, [(1.0, 1, 1)]);
        let expected = "DPF  Time/Freq Support: \n  Number of sets: 1 \nCumulative     Time (s)       LoadStep       Substep        \n1              1.000000       1              1              \n";
        assert_eq!(tf.to_string(), expected);
    }

    #[test]
    fn frequency_header() {
        let tf = TimeFreqSupport::new(TimeDomain::Frequency, [(12.5, 1, 1)]);
        let report = tf.to_string();
        assert!(report.contains("Frequency (Hz)"));
        assert!(report.contains("12.500000"));
    }

    proptest! {
        #[test]
        fn cumulative_indices_are_positions(values in proptest::collection::vec(0.0f64..1e3, 0..30)) {
            let tf = TimeFreqSupport::new(
                TimeDomain::Time,
                values.iter().map(|&v| (v, 1, 1)),
            );
            prop_assert_eq!(tf.n_sets(), values.len());
            for (i, step) in tf.steps().iter().enumerate() {
                prop_assert_eq!(step.cumulative_index, i + 1);
                prop_assert_eq!(tf.step(i + 1).map(|s| s.value), Some(values[i]));
            }
        }
    }
}
