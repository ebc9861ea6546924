use std::time::Duration;

use crate::action::ActionType;
use crate::error::{ChainError, ErrorSeverity};
use crate::registry::{Selector, SelectorError};
use crate::shape::{BudgetError, SearchBudget};

/// Engine configuration and tunable parameters.
///
/// Per-request overrides on [`crate::ActionContext`] win over these values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainConfig {
    /// Global switch.
    pub enabled: bool,
    pub mining: bool,
    pub interaction: bool,
    pub planting: bool,
    pub harvesting: bool,

    /// Target count budget for ordinary actors.
    pub max_count: u32,
    /// Target count budget for unrestricted (creative) actors.
    pub max_count_unrestricted: u32,
    pub max_distance: u32,
    pub allow_diagonal: bool,
    /// Shape used for mining unless the actor selected another.
    pub shape: String,
    /// Chain only identical blocks, ignoring tags and groups.
    pub strict_matching: bool,
    pub search_timeout_ms: u64,
    pub max_iterations: u32,

    pub consume_durability: bool,
    pub stop_on_low_durability: bool,
    /// Stop before the tool's remaining uses drop to this level.
    pub preserve_durability: u32,

    pub consume_hunger: bool,
    pub hunger_per_block: f32,
    pub hunger_multiplier: f32,
    pub min_hunger_level: u32,

    /// Every block not denied is a valid mining origin.
    pub mine_all_blocks: bool,
    pub allow_bare_hand: bool,
    pub collect_drops: bool,
    pub collect_experience: bool,
    pub harvest_replant: bool,
    /// Surfaces planting accepts below a site; empty means dirt or farmland tags.
    pub farmland: Vec<String>,
    /// Entity search radius for shearing; falls back to `max_distance`.
    pub shear_radius: Option<u32>,
}

impl ChainConfig {
    // ===== validation limits =====
    pub const MAX_COUNT_LIMIT: u32 = 10_240;
    pub const MAX_DISTANCE_LIMIT: u32 = 128;
    pub const MAX_HUNGER_MULTIPLIER: f32 = 10.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_COUNT: u32 = 64;
    pub const DEFAULT_MAX_COUNT_UNRESTRICTED: u32 = 256;
    pub const DEFAULT_MAX_DISTANCE: u32 = 16;
    pub const DEFAULT_SHAPE: &'static str = "connected";
    pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 2_000;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;
    pub const DEFAULT_PRESERVE_DURABILITY: u32 = 1;
    pub const DEFAULT_HUNGER_PER_BLOCK: f32 = 0.025;
    pub const DEFAULT_MIN_HUNGER_LEVEL: u32 = 1;

    pub fn new() -> Self {
        Self {
            enabled: true,
            mining: true,
            interaction: true,
            planting: true,
            harvesting: true,
            max_count: Self::DEFAULT_MAX_COUNT,
            max_count_unrestricted: Self::DEFAULT_MAX_COUNT_UNRESTRICTED,
            max_distance: Self::DEFAULT_MAX_DISTANCE,
            allow_diagonal: true,
            shape: Self::DEFAULT_SHAPE.to_owned(),
            strict_matching: false,
            search_timeout_ms: Self::DEFAULT_SEARCH_TIMEOUT_MS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            consume_durability: true,
            stop_on_low_durability: true,
            preserve_durability: Self::DEFAULT_PRESERVE_DURABILITY,
            consume_hunger: true,
            hunger_per_block: Self::DEFAULT_HUNGER_PER_BLOCK,
            hunger_multiplier: 1.0,
            min_hunger_level: Self::DEFAULT_MIN_HUNGER_LEVEL,
            mine_all_blocks: true,
            allow_bare_hand: true,
            collect_drops: false,
            collect_experience: false,
            harvest_replant: true,
            farmland: Vec::new(),
            shear_radius: None,
        }
    }

    /// Returns the first out-of-range value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=Self::MAX_COUNT_LIMIT).contains(&self.max_count) {
            return Err(ConfigError::out_of_range("max_count", self.max_count, "1..=10240"));
        }
        if !(1..=Self::MAX_COUNT_LIMIT).contains(&self.max_count_unrestricted) {
            return Err(ConfigError::out_of_range(
                "max_count_unrestricted",
                self.max_count_unrestricted,
                "1..=10240",
            ));
        }
        if !(1..=Self::MAX_DISTANCE_LIMIT).contains(&self.max_distance) {
            return Err(ConfigError::out_of_range("max_distance", self.max_distance, "1..=128"));
        }
        if !(0.0..=Self::MAX_HUNGER_MULTIPLIER).contains(&self.hunger_multiplier) {
            return Err(ConfigError::out_of_range(
                "hunger_multiplier",
                self.hunger_multiplier,
                "0..=10",
            ));
        }
        if self.hunger_per_block < 0.0 || !self.hunger_per_block.is_finite() {
            return Err(ConfigError::out_of_range(
                "hunger_per_block",
                self.hunger_per_block,
                ">= 0",
            ));
        }
        if self.search_timeout_ms == 0 {
            return Err(ConfigError::out_of_range("search_timeout_ms", 0, "> 0"));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::out_of_range("max_iterations", 0, "> 0"));
        }
        for entry in &self.farmland {
            entry
                .parse::<Selector>()
                .map_err(|source| ConfigError::InvalidSelector {
                    field: "farmland",
                    entry: entry.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Clamps every out-of-range value into range, logging each correction.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let mut corrected = 0usize;
        let mut note = |field: &'static str, from: String, to: String| {
            corrected += 1;
            tracing::warn!(target: "chain::config", field, %from, %to, "config value corrected");
        };

        let clamped = self.max_count.clamp(1, Self::MAX_COUNT_LIMIT);
        if clamped != self.max_count {
            note("max_count", self.max_count.to_string(), clamped.to_string());
            self.max_count = clamped;
        }
        let clamped = self.max_count_unrestricted.clamp(1, Self::MAX_COUNT_LIMIT);
        if clamped != self.max_count_unrestricted {
            note(
                "max_count_unrestricted",
                self.max_count_unrestricted.to_string(),
                clamped.to_string(),
            );
            self.max_count_unrestricted = clamped;
        }
        let clamped = self.max_distance.clamp(1, Self::MAX_DISTANCE_LIMIT);
        if clamped != self.max_distance {
            note("max_distance", self.max_distance.to_string(), clamped.to_string());
            self.max_distance = clamped;
        }
        let multiplier = if self.hunger_multiplier.is_nan() {
            1.0
        } else {
            self.hunger_multiplier.clamp(0.0, Self::MAX_HUNGER_MULTIPLIER)
        };
        if multiplier != self.hunger_multiplier {
            note(
                "hunger_multiplier",
                self.hunger_multiplier.to_string(),
                multiplier.to_string(),
            );
            self.hunger_multiplier = multiplier;
        }
        if self.hunger_per_block < 0.0 || !self.hunger_per_block.is_finite() {
            note(
                "hunger_per_block",
                self.hunger_per_block.to_string(),
                Self::DEFAULT_HUNGER_PER_BLOCK.to_string(),
            );
            self.hunger_per_block = Self::DEFAULT_HUNGER_PER_BLOCK;
        }
        if self.search_timeout_ms == 0 {
            note(
                "search_timeout_ms",
                "0".into(),
                Self::DEFAULT_SEARCH_TIMEOUT_MS.to_string(),
            );
            self.search_timeout_ms = Self::DEFAULT_SEARCH_TIMEOUT_MS;
        }
        if self.max_iterations == 0 {
            note(
                "max_iterations",
                "0".into(),
                Self::DEFAULT_MAX_ITERATIONS.to_string(),
            );
            self.max_iterations = Self::DEFAULT_MAX_ITERATIONS;
        }
        let before = self.farmland.len();
        self.farmland.retain(|entry| entry.parse::<Selector>().is_ok());
        if self.farmland.len() != before {
            note(
                "farmland",
                format!("{before} entries"),
                format!("{} entries", self.farmland.len()),
            );
        }

        if corrected > 0 {
            tracing::warn!(
                target: "chain::config",
                corrected,
                "configuration contained out-of-range values"
            );
        }
        self
    }

    /// Global switch and the per-action switch together.
    pub fn is_enabled(&self, action: ActionType) -> bool {
        self.enabled
            && match action {
                ActionType::Mining => self.mining,
                ActionType::Interaction => self.interaction,
                ActionType::Planting => self.planting,
                ActionType::Harvesting => self.harvesting,
            }
    }

    /// Exhaustion added per mined block.
    pub fn hunger_cost(&self) -> f32 {
        self.hunger_per_block * self.hunger_multiplier.max(0.0)
    }

    /// Default search budget for an actor.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if the configuration was not validated and
    /// holds a zero limit.
    pub fn budget(&self, unrestricted: bool) -> Result<SearchBudget, BudgetError> {
        let count = if unrestricted {
            self.max_count_unrestricted
        } else {
            self.max_count
        };
        SearchBudget::new(count, self.max_distance)?
            .with_timeout(Duration::from_millis(self.search_timeout_ms))?
            .with_max_iterations(self.max_iterations)
            .map(|budget| budget.with_diagonal(self.allow_diagonal))
    }

    pub fn shear_radius(&self) -> u32 {
        self.shear_radius.unwrap_or(self.max_distance)
    }

    pub fn farmland_selectors(&self) -> Vec<Selector> {
        self.farmland
            .iter()
            .filter_map(|entry| entry.parse().ok())
            .collect()
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range ({expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid {field} entry {entry:?}: {source}")]
    InvalidSelector {
        field: &'static str,
        entry: String,
        source: SelectorError,
    },
}

impl ConfigError {
    fn out_of_range(field: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

impl ChainError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "CONFIG_OUT_OF_RANGE",
            Self::InvalidSelector { .. } => "CONFIG_INVALID_SELECTOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ChainConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.max_count, 64);
        assert_eq!(config.max_distance, 16);
        assert_eq!(config.shear_radius(), 16);
    }

    #[test]
    fn validated_clamps_out_of_range_values() {
        let config = ChainConfig {
            max_count: 0,
            max_distance: 500,
            hunger_multiplier: 42.0,
            max_iterations: 0,
            farmland: vec!["farmland".into(), "Bad Entry".into()],
            ..ChainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "max_count", .. })
        ));

        let fixed = config.validated();
        assert_eq!(fixed.max_count, 1);
        assert_eq!(fixed.max_distance, ChainConfig::MAX_DISTANCE_LIMIT);
        assert_eq!(fixed.hunger_multiplier, ChainConfig::MAX_HUNGER_MULTIPLIER);
        assert_eq!(fixed.max_iterations, ChainConfig::DEFAULT_MAX_ITERATIONS);
        assert_eq!(fixed.farmland, vec!["farmland".to_string()]);
        assert_eq!(fixed.validate(), Ok(()));
    }

    #[test]
    fn budget_follows_actor_mode() {
        let config = ChainConfig::default();
        assert_eq!(config.budget(false).unwrap().max_count(), 64);
        assert_eq!(config.budget(true).unwrap().max_count(), 256);
        assert!(config.budget(false).unwrap().allow_diagonal());
    }
}
