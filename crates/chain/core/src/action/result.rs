use super::{ActionType, ItemStack};
use crate::geom::BlockPos;
use crate::shape::SearchLimit;

/// Why a dispatch ended. Exactly one per result.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StopReason {
    /// Every target was processed, or there was nothing to process.
    Completed,
    MaxCountReached,
    MaxDistanceReached,
    ToolDurabilityLow,
    ToolBroken,
    HungerLow,
    /// A pre-action listener cancelled, or the request was not eligible.
    EventCancelled,
    PermissionDenied,
    ItemsExhausted,
    Timeout,
    /// Reentrant dispatch or a missing host collaborator. Not retried.
    Error,
}

impl StopReason {
    /// True for reasons produced by a resource check breaking the loop.
    pub const fn is_early_stop(self) -> bool {
        matches!(
            self,
            Self::ToolDurabilityLow | Self::ToolBroken | Self::HungerLow | Self::ItemsExhausted
        )
    }
}

/// Aggregate outcome of one dispatch.
///
/// Constructed only by the dispatcher. `targets` is in execution order and
/// holds only targets whose effect reported success.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    pub(crate) action_type: ActionType,
    pub(crate) targets: Vec<BlockPos>,
    pub(crate) durability_used: u32,
    pub(crate) hunger_used: f32,
    pub(crate) stop_reason: StopReason,
    pub(crate) yields: Vec<ItemStack>,
    pub(crate) experience: u32,
    pub(crate) search_limit: Option<SearchLimit>,
}

impl ActionResult {
    pub(crate) fn stopped(action_type: ActionType, stop_reason: StopReason) -> Self {
        Self {
            action_type,
            targets: Vec::new(),
            durability_used: 0,
            hunger_used: 0.0,
            stop_reason,
            yields: Vec::new(),
            experience: 0,
            search_limit: None,
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn targets(&self) -> &[BlockPos] {
        &self.targets
    }

    pub fn total_count(&self) -> usize {
        self.targets.len()
    }

    pub fn durability_used(&self) -> u32 {
        self.durability_used
    }

    pub fn hunger_used(&self) -> f32 {
        self.hunger_used
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn yields(&self) -> &[ItemStack] {
        &self.yields
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    /// Set when target collection was cut short by the time or iteration cap.
    pub fn search_limit(&self) -> Option<SearchLimit> {
        self.search_limit
    }

    pub fn is_success(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop_reason == StopReason::EventCancelled
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} target(s), durability {}, hunger {:.3}, stop {}",
            self.action_type,
            self.targets.len(),
            self.durability_used,
            self.hunger_used,
            self.stop_reason
        );
        if !self.yields.is_empty() {
            let items: u32 = self.yields.iter().map(ItemStack::count).sum();
            out.push_str(&format!(", yields {items}"));
        }
        if self.experience > 0 {
            out.push_str(&format!(", xp {}", self.experience));
        }
        if let Some(limit) = self.search_limit {
            out.push_str(&format!(", search truncated by {limit}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_result_is_empty() {
        let result = ActionResult::stopped(ActionType::Mining, StopReason::EventCancelled);
        assert!(!result.is_success());
        assert!(result.is_cancelled());
        assert_eq!(result.total_count(), 0);
        assert_eq!(
            result.summary(),
            "mining: 0 target(s), durability 0, hunger 0.000, stop EVENT_CANCELLED"
        );
    }

    #[test]
    fn summary_mentions_truncation() {
        let mut result = ActionResult::stopped(ActionType::Harvesting, StopReason::Completed);
        result.targets.push(BlockPos::ORIGIN);
        result.search_limit = Some(SearchLimit::IterationCap);
        assert!(result.summary().ends_with("search truncated by iteration_cap"));
    }
}
