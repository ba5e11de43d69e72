use super::ConfigError;
use serde::{Deserialize, Serialize};

const EXPECTED_TOTAL: f64 = 1.0;
const SUM_TOLERANCE: f64 = 0.01;

/// Relative importance of each sub-score in the final match percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub required_skills: f64,
    pub preferred_skills: f64,
    pub title_similarity: f64,
    #[serde(default)]
    pub experience: f64,
}

impl MatchWeights {
    pub fn new(required_skills: f64, preferred_skills: f64, title_similarity: f64) -> Self {
        Self {
            required_skills,
            preferred_skills,
            title_similarity,
            experience: 0.0,
        }
    }

    pub fn with_experience(mut self, experience: f64) -> Self {
        self.experience = experience;
        self
    }

    pub fn sum(&self) -> f64 {
        self.required_skills + self.preferred_skills + self.title_similarity + self.experience
    }

    /// Rejects negative or non-finite weights and totals outside `1.0 ± 0.01`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("required_skills", self.required_skills),
            ("preferred_skills", self.preferred_skills),
            ("title_similarity", self.title_similarity),
            ("experience", self.experience),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        let total = self.sum();
        if (total - EXPECTED_TOTAL).abs() > SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { total });
        }

        Ok(())
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self::new(0.7, 0.2, 0.1)
    }
}
