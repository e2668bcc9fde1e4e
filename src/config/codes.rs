//! Code generation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Batching limits for discount code generation
#[derive(Debug, Clone, Deserialize)]
pub struct CodesConfig {
    /// Codes inserted per round trip
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches in milliseconds
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,

    /// Largest quantity a single request may ask for
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

impl CodesConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Validate generation limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.max_quantity == 0 {
            return Err(ValidationError::InvalidMaxQuantity);
        }
        Ok(())
    }
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
            max_quantity: default_max_quantity(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}

fn default_batch_delay() -> u64 {
    300
}

fn default_max_quantity() -> u32 {
    500
}
