use crate::action::{ActionContext, ActionResult, ActionType, Actor, ItemStack};
use crate::env::HostEnv;
use crate::geom::BlockPos;

/// Fired after collection, before any target is executed.
///
/// Listeners may rewrite the target list or cancel the action. The list left
/// here when the last listener returns is the one the execution loop runs.
#[derive(Debug)]
pub struct PreActionEvent<'e> {
    context: &'e ActionContext<'e>,
    targets: Vec<BlockPos>,
    cancelled: bool,
    cancel_reason: Option<String>,
}

impl<'e> PreActionEvent<'e> {
    pub(crate) fn new(context: &'e ActionContext<'e>, targets: Vec<BlockPos>) -> Self {
        Self {
            context,
            targets,
            cancelled: false,
            cancel_reason: None,
        }
    }

    pub fn context(&self) -> &ActionContext<'e> {
        self.context
    }

    pub fn env(&self) -> &HostEnv<'e> {
        self.context.env()
    }

    pub fn actor(&self) -> &Actor {
        self.context.actor()
    }

    pub fn origin(&self) -> BlockPos {
        self.context.origin()
    }

    pub fn tool(&self) -> &ItemStack {
        self.context.held_item()
    }

    pub fn action_type(&self) -> ActionType {
        self.context.action_type()
    }

    pub fn targets(&self) -> &[BlockPos] {
        &self.targets
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn set_targets(&mut self, targets: Vec<BlockPos>) {
        self.targets = targets;
    }

    /// Returns `true` if the position was present.
    pub fn remove_target(&mut self, pos: BlockPos) -> bool {
        let before = self.targets.len();
        self.targets.retain(|p| *p != pos);
        self.targets.len() != before
    }

    /// Appends `pos` unless it is already a target. Returns `true` if added.
    pub fn add_target(&mut self, pos: BlockPos) -> bool {
        if self.targets.contains(&pos) {
            return false;
        }
        self.targets.push(pos);
        true
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn retain_targets(&mut self, keep: impl FnMut(&BlockPos) -> bool) {
        self.targets.retain(keep);
    }

    /// Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn cancel_with(&mut self, reason: impl Into<String>) {
        self.cancelled = true;
        self.cancel_reason = Some(reason.into());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    pub(crate) fn into_targets(self) -> Vec<BlockPos> {
        self.targets
    }
}

/// Read-only notification of a finished action.
#[derive(Debug, Clone, Copy)]
pub struct PostActionEvent<'e> {
    context: &'e ActionContext<'e>,
    result: &'e ActionResult,
}

impl<'e> PostActionEvent<'e> {
    pub(crate) fn new(context: &'e ActionContext<'e>, result: &'e ActionResult) -> Self {
        Self { context, result }
    }

    pub fn context(&self) -> &ActionContext<'e> {
        self.context
    }

    pub fn env(&self) -> &HostEnv<'e> {
        self.context.env()
    }

    pub fn actor(&self) -> &Actor {
        self.context.actor()
    }

    pub fn origin(&self) -> BlockPos {
        self.context.origin()
    }

    pub fn action_type(&self) -> ActionType {
        self.result.action_type()
    }

    pub fn result(&self) -> &ActionResult {
        self.result
    }
}
