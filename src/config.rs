use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::heuristic::Weights;

/// Whether MAX-node values are memoized during one top-level search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Plain,
    /// Key MAX-node values by (board, remaining depth); the table is
    /// discarded when the call returns.
    Memoized,
}

/// Configurable knobs shared by all search strategies. Each strategy reads
/// the fields it needs and ignores the rest.
///
/// - `depth`: plies to search (minimax/expectimax/greedy) or the base of the
///   rollout horizon (MCTS).
/// - `weights`: heuristic coefficients passed to every leaf evaluation.
/// - `simulations_per_move`: MCTS rollouts per legal root move.
/// - `simulation_depth`: MCTS rollout horizon; `None` means `2 * depth`.
/// - `prob_cutoff`: expectimax stops expanding below this cumulative probability.
/// - `sample_cells`: minimax samples at most this many empty cells per MIN node.
/// - `cache`: transposition cache for minimax, expectimax and greedy DFS.
/// - `time_limit_ms`: optional cooperative deadline per top-level call.
/// - `seed`: seed for the strategy's RNG; `None` draws from OS entropy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub depth: u32,
    pub weights: Weights,
    pub simulations_per_move: u32,
    pub simulation_depth: Option<u32>,
    pub prob_cutoff: f64,
    pub sample_cells: usize,
    pub cache: CacheMode,
    pub time_limit_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            weights: Weights::default(),
            simulations_per_move: 100,
            simulation_depth: None,
            prob_cutoff: 1e-4,
            sample_cells: 4,
            cache: CacheMode::Plain,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self { depth, ..Self::default() }
    }

    /// Steps per MCTS rollout.
    #[inline]
    pub fn rollout_horizon(&self) -> u32 {
        self.simulation_depth.unwrap_or(self.depth.saturating_mul(2))
    }

    /// Parse a (possibly partial) JSON object; missing keys take defaults.
    ///
    /// ```
    /// use ai_2048_search::config::{CacheMode, SearchConfig};
    /// let cfg = SearchConfig::from_json_str(r#"{"depth": 5, "cache": "memoized"}"#).unwrap();
    /// assert_eq!(cfg.depth, 5);
    /// assert_eq!(cfg.cache, CacheMode::Memoized);
    /// assert_eq!(cfg.simulations_per_move, 100);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: SearchConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.prob_cutoff.is_finite() && self.prob_cutoff >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "prob_cutoff must be a non-negative number, got {}",
                self.prob_cutoff
            )));
        }
        if self.simulations_per_move == 0 {
            return Err(ConfigError::Invalid("simulations_per_move must be at least 1".into()));
        }
        if self.sample_cells == 0 {
            return Err(ConfigError::Invalid("sample_cells must be at least 1".into()));
        }
        let w = &self.weights;
        if ![w.monotonic, w.smoothness, w.free_tiles, w.merges].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid("weights must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_match_reference_knobs() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.depth, 3);
        assert_eq!(cfg.rollout_horizon(), 6);
        assert_eq!(cfg.prob_cutoff, 1e-4);
        assert_eq!(cfg.sample_cells, 4);
        assert_eq!(cfg.weights, Weights::DEFAULT);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_simulation_depth_wins() {
        let cfg = SearchConfig { simulation_depth: Some(3), ..SearchConfig::with_depth(5) };
        assert_eq!(cfg.rollout_horizon(), 3);
    }

    #[test]
    fn loads_nested_weights_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"depth": 2, "seed": 9, "weights": {{"monotonic": 15.0, "smoothness": 1.5}}}}"#
        )
        .unwrap();
        let cfg = SearchConfig::from_json_path(file.path()).unwrap();
        assert_eq!(cfg.depth, 2);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.weights.monotonic, 15.0);
        assert_eq!(cfg.weights.free_tiles, 10.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            SearchConfig::from_json_str(r#"{"prob_cutoff": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_json_str(r#"{"simulations_per_move": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(SearchConfig::from_json_str(r#"{"algo": "bfs"}"#), Err(ConfigError::Json(_))));
        assert!(matches!(SearchConfig::from_json_path("/nonexistent/cfg.json"), Err(ConfigError::Io(_))));
    }
}
