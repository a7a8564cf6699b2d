//! Chunking parameters.

use super::types::ChunkingError;

/// Token budget and overlap configuration for chunk construction.
#[derive(Clone, Debug)]
pub struct ChunkingConfig {
    /// Target maximum estimated tokens per chunk.
    pub target_tokens: usize,
    /// Tokens shared between adjacent fallback windows.
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_tokens: 500,
            overlap_tokens: 50,
        }
    }
}

impl ChunkingConfig {
    /// Checks that the configuration can make forward progress.
    ///
    /// The overlap must leave room for new content in every window, so it
    /// has to be strictly smaller than the target budget.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.target_tokens == 0 {
            return Err(ChunkingError::InvalidConfig(
                "target_tokens must be greater than zero".to_string(),
            ));
        }
        if self.overlap_tokens >= self.target_tokens {
            return Err(ChunkingError::InvalidConfig(format!(
                "overlap_tokens ({}) must be smaller than target_tokens ({})",
                self.overlap_tokens, self.target_tokens
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_target() {
        let config = ChunkingConfig {
            target_tokens: 0,
            overlap_tokens: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ChunkingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_overlap_at_or_above_target() {
        let config = ChunkingConfig {
            target_tokens: 100,
            overlap_tokens: 100,
        };
        assert!(config.validate().is_err());
    }
}
