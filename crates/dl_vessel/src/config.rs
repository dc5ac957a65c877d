//! Reaction parameters shared by every operation of a vessel.

use dl_strand::CopyErrorRate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;

use crate::VesselError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Seed of the vessel's random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Per-position probability of a polymerase copy error.
    pub copy_error_rate: f64,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            copy_error_rate: CopyErrorRate::default().value(),
        }
    }
}

impl ReactionConfig {
    /// Parse and validate a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, VesselError> {
        let config: ReactionConfig = serde_json::from_str(json)?;
        config.copy_error()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_copy_error_rate(mut self, rate: f64) -> Self {
        self.copy_error_rate = rate;
        self
    }

    pub fn copy_error(&self) -> Result<CopyErrorRate, VesselError> {
        Ok(CopyErrorRate::new(self.copy_error_rate)?)
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
