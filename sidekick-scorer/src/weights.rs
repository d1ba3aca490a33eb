//! Fusion weights and their per-persona overrides.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sidekick_core::Persona;

use crate::FusionError;

/// Signal strengths blended into one score per candidate.
///
/// Each signal lies in `0.0..=1.0`; the blend is the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight for normalised co-occurrence with the basket.
    pub cooccurrence: f32,
    /// Weight for the strongest association rule into the candidate.
    pub confidence: f32,
    /// Weight for category complementarity.
    pub complement: f32,
    /// Weight for global popularity.
    pub popularity: f32,
}

impl FusionWeights {
    /// Build a weight set, validating it.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidWeights`] when any weight is negative
    /// or non-finite, or when they sum to zero.
    pub fn new(
        cooccurrence: f32,
        confidence: f32,
        complement: f32,
        popularity: f32,
    ) -> Result<Self, FusionError> {
        let weights = Self {
            cooccurrence,
            confidence,
            complement,
            popularity,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Check that the weights can be blended.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidWeights`] when any weight is negative
    /// or non-finite, or when they sum to zero.
    pub fn validate(&self) -> Result<(), FusionError> {
        let weights = self.as_array();
        if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0_f32) {
            return Err(FusionError::InvalidWeights);
        }
        if self.total() <= 0.0_f32 {
            return Err(FusionError::InvalidWeights);
        }
        Ok(())
    }

    /// Weighted mean of the four signals, in the field order of this struct.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "blending requires float maths")]
    pub fn blend(&self, signals: [f32; 4]) -> f32 {
        let total = self.total();
        if total <= 0.0_f32 {
            return 0.0_f32;
        }
        let weighted: f32 = self
            .as_array()
            .iter()
            .zip(signals)
            .map(|(weight, signal)| weight * signal)
            .sum();
        weighted / total
    }

    #[expect(clippy::float_arithmetic, reason = "summing weights requires float maths")]
    fn total(&self) -> f32 {
        self.cooccurrence + self.confidence + self.complement + self.popularity
    }

    const fn as_array(&self) -> [f32; 4] {
        [
            self.cooccurrence,
            self.confidence,
            self.complement,
            self.popularity,
        ]
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            cooccurrence: 0.4_f32,
            confidence: 0.3_f32,
            complement: 0.2_f32,
            popularity: 0.1_f32,
        }
    }
}

/// Fusion weights chosen by customer persona.
///
/// Personas without an explicit entry use the base weights.
///
/// # Examples
/// ```
/// use sidekick_core::Persona;
/// use sidekick_scorer::{FusionWeights, PersonaWeights};
///
/// let table = PersonaWeights::default();
/// let first_timer = table.weights_for(Persona::FirstTimeGuest);
/// assert!(first_timer.popularity > FusionWeights::default().popularity);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaWeights {
    base: FusionWeights,
    overrides: BTreeMap<Persona, FusionWeights>,
}

impl PersonaWeights {
    /// Table with no overrides, so every persona uses `base`.
    #[must_use]
    pub const fn uniform(base: FusionWeights) -> Self {
        Self {
            base,
            overrides: BTreeMap::new(),
        }
    }

    /// Set the weights for `persona`, validating them first.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidWeights`] when `weights` are unusable.
    pub fn with_override(
        mut self,
        persona: Persona,
        weights: FusionWeights,
    ) -> Result<Self, FusionError> {
        weights.validate()?;
        self.overrides.insert(persona, weights);
        Ok(self)
    }

    /// Weights for `persona`.
    #[must_use]
    pub fn weights_for(&self, persona: Persona) -> FusionWeights {
        self.overrides.get(&persona).copied().unwrap_or(self.base)
    }

    /// Check the base weights and every override.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidWeights`] for the first unusable set.
    pub fn validate(&self) -> Result<(), FusionError> {
        self.base.validate()?;
        self.overrides.values().try_for_each(FusionWeights::validate)
    }
}

impl Default for PersonaWeights {
    fn default() -> Self {
        let set = |cooccurrence, confidence, complement, popularity| FusionWeights {
            cooccurrence,
            confidence,
            complement,
            popularity,
        };
        let overrides = BTreeMap::from([
            (Persona::FirstTimeGuest, set(0.3_f32, 0.2_f32, 0.2_f32, 0.3_f32)),
            (Persona::OccasionalGuest, set(0.4_f32, 0.3_f32, 0.2_f32, 0.1_f32)),
            (Persona::RegularRegistered, set(0.4_f32, 0.3_f32, 0.2_f32, 0.1_f32)),
            (Persona::LoyalRegistered, set(0.45_f32, 0.35_f32, 0.15_f32, 0.05_f32)),
            (Persona::Vip, set(0.4_f32, 0.3_f32, 0.25_f32, 0.05_f32)),
        ]);
        Self {
            base: FusionWeights::default(),
            overrides,
        }
    }
}
