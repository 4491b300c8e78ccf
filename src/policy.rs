//! Result policies applied after analysis.
//!
//! The detector's own classification is never rewritten in place; callers that
//! want stricter reporting wrap results in a policy.

use crate::classify::{CrimeType, ThreatLevel};
use crate::ClassificationResult;

/// Rewrites a finished result.
pub trait ResultPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, result: ClassificationResult) -> ClassificationResult;
}

/// Leaves results untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl ResultPolicy for PassThrough {
    fn name(&self) -> &'static str {
        "pass_through"
    }

    fn apply(&self, result: ClassificationResult) -> ClassificationResult {
        result
    }
}

/// Downgrades implausible multi-party crimes, raises fixed crimes to a
/// minimum level, and floors the person count for any reported crime.
#[derive(Clone, Debug)]
pub struct PostValidation {
    pub multi_person_crimes: Vec<CrimeType>,
    pub minimum_levels: Vec<(CrimeType, ThreatLevel)>,
}

impl Default for PostValidation {
    fn default() -> Self {
        Self {
            multi_person_crimes: vec![
                CrimeType::Choking,
                CrimeType::AssaultOnFallenVictim,
                CrimeType::Kidnapping,
                CrimeType::CrowdViolence,
                CrimeType::PhysicalAssault,
                CrimeType::Fight,
                CrimeType::Robbery,
            ],
            minimum_levels: vec![
                (CrimeType::Choking, ThreatLevel::Critical),
                (CrimeType::AssaultWithWeapon, ThreatLevel::Critical),
                (CrimeType::Robbery, ThreatLevel::High),
            ],
        }
    }
}

impl ResultPolicy for PostValidation {
    fn name(&self) -> &'static str {
        "post_validation"
    }

    fn apply(&self, mut result: ClassificationResult) -> ClassificationResult {
        if result.persons_detected < 2 && self.multi_person_crimes.contains(&result.crime_type) {
            log::debug!(
                "downgrading {} with {} person(s) to Normal",
                result.crime_type,
                result.persons_detected
            );
            result.crime_type = CrimeType::Normal;
            result.threat_level = ThreatLevel::Low;
            result.crime_detected = false;
            result.confidence = 0.0;
            return result;
        }

        if let Some((_, floor)) = self
            .minimum_levels
            .iter()
            .find(|(crime, _)| *crime == result.crime_type)
        {
            result.threat_level = result.threat_level.max(*floor);
        }

        if result.crime_type != CrimeType::Normal {
            result.persons_detected = result.persons_detected.max(1);
        }
        result
    }
}
