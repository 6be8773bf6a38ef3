/// Runtime configuration for the delete compilation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TideConfig {
    /// Maximum nesting depth accepted by the canonicalizer.
    pub max_expression_depth: usize,
    /// Gate for the time-series delete rewrite. When off, deletes on
    /// time-series collections compile without a bucket/residual split.
    pub timeseries_deletes_enabled: bool,
}

impl Default for TideConfig {
    fn default() -> Self {
        Self {
            max_expression_depth: 32,
            timeseries_deletes_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TideConfig;

    #[test]
    fn default_config_enables_timeseries_deletes() {
        let config = TideConfig::default();
        assert!(config.timeseries_deletes_enabled);
        assert_eq!(config.max_expression_depth, 32);
    }
}
