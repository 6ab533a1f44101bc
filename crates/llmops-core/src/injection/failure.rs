use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::PipelineError;
use crate::step::StepInstance;

/// Decide si el step `step_index` falla en este intento. Se consulta una vez
/// por step ejecutado, en orden.
pub trait FailureInjector: Send + Sync + std::fmt::Debug {
    fn should_fail(&self, step_index: usize, step: &StepInstance) -> bool;
}

/// Fallo uniforme con probabilidad fija, independiente por intento.
#[derive(Debug)]
pub struct RandomFailure {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomFailure {
    pub fn new(probability: f64) -> Result<Self, PipelineError> {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    /// Variante reproducible.
    pub fn seeded(probability: f64, seed: u64) -> Result<Self, PipelineError> {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Result<Self, PipelineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InvalidProbability(probability));
        }
        Ok(Self { probability,
                  rng: Mutex::new(rng) })
    }
}

impl FailureInjector for RandomFailure {
    fn should_fail(&self, _step_index: usize, _step: &StepInstance) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_bool(self.probability)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NeverFail;

impl FailureInjector for NeverFail {
    fn should_fail(&self, _step_index: usize, _step: &StepInstance) -> bool {
        false
    }
}

/// Secuencia fija de decisiones, consumidas en orden de consulta. Agotada la
/// secuencia, ningún step falla.
#[derive(Debug, Default)]
pub struct ScriptedFailures {
    decisions: Mutex<VecDeque<bool>>,
}

impl ScriptedFailures {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self { decisions: Mutex::new(decisions.into_iter().collect()) }
    }

    /// `successes` steps pasan y el siguiente falla.
    pub fn fail_after(successes: usize) -> Self {
        Self::new(std::iter::repeat(false).take(successes).chain(std::iter::once(true)))
    }

    pub fn remaining(&self) -> usize {
        self.decisions.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl FailureInjector for ScriptedFailures {
    fn should_fail(&self, _step_index: usize, _step: &StepInstance) -> bool {
        let mut queue = self.decisions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{StepConfig, StepId, StepKind};

    fn step() -> StepInstance {
        StepInstance { id: StepId(1),
                       config: StepConfig::default_for(StepKind::Filter) }
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        assert_eq!(RandomFailure::new(1.5).unwrap_err(), PipelineError::InvalidProbability(1.5));
        assert!(RandomFailure::new(-0.1).is_err());
    }

    #[test]
    fn extreme_probabilities_are_deterministic() {
        let always = RandomFailure::seeded(1.0, 7).unwrap();
        let never = RandomFailure::seeded(0.0, 7).unwrap();
        for i in 0..20 {
            assert!(always.should_fail(i, &step()));
            assert!(!never.should_fail(i, &step()));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = RandomFailure::seeded(0.3, 42).unwrap();
        let b = RandomFailure::seeded(0.3, 42).unwrap();
        let sa: Vec<bool> = (0..32).map(|i| a.should_fail(i, &step())).collect();
        let sb: Vec<bool> = (0..32).map(|i| b.should_fail(i, &step())).collect();
        assert_eq!(sa, sb);
    }

    #[test]
    fn scripted_fail_after_then_exhausted() {
        let s = ScriptedFailures::fail_after(1);
        assert!(!s.should_fail(0, &step()));
        assert!(s.should_fail(1, &step()));
        assert_eq!(s.remaining(), 0);
        assert!(!s.should_fail(2, &step()));
    }
}
