use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use super::{ListenerError, ListenerId, PostActionEvent, PreActionEvent};
use crate::action::ActionType;

type PreListener = dyn for<'e> Fn(&mut PreActionEvent<'e>) -> Result<(), ListenerError> + Send + Sync;
type PrePredicate = dyn for<'e> Fn(&PreActionEvent<'e>) -> bool + Send + Sync;
type PostListener = dyn for<'e> Fn(&PostActionEvent<'e>) -> Result<(), ListenerError> + Send + Sync;
type PostPredicate = dyn for<'e> Fn(&PostActionEvent<'e>) -> bool + Send + Sync;

struct Entry<L: ?Sized, P: ?Sized> {
    id: ListenerId,
    action: Option<ActionType>,
    predicate: Option<Arc<P>>,
    listener: Arc<L>,
}

impl<L: ?Sized, P: ?Sized> Clone for Entry<L, P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            action: self.action,
            predicate: self.predicate.clone(),
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<L: ?Sized, P: ?Sized> Entry<L, P> {
    fn wants(&self, action: ActionType) -> bool {
        self.action.is_none_or(|wanted| wanted == action)
    }
}

/// Ordered pre/post listener lists.
///
/// Listeners run in registration order. A failing or panicking listener is
/// logged and skipped; the remaining listeners still run. Firing works on a
/// snapshot of the lists, so listeners may register or unregister others
/// without deadlocking.
pub struct EventBus {
    pre: RwLock<Vec<Entry<PreListener, PrePredicate>>>,
    post: RwLock<Vec<Entry<PostListener, PostPredicate>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            pre: RwLock::new(Vec::new()),
            post: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ===== pre-action =====

    pub fn register_pre<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&mut PreActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_pre(None, None, Arc::new(listener))
    }

    /// Listener called only for one action type.
    pub fn register_pre_for<F>(&self, action: ActionType, listener: F) -> ListenerId
    where
        F: Fn(&mut PreActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_pre(Some(action), None, Arc::new(listener))
    }

    /// Listener called only when `predicate` accepts the event.
    pub fn register_pre_when<P, F>(&self, predicate: P, listener: F) -> ListenerId
    where
        P: Fn(&PreActionEvent<'_>) -> bool + Send + Sync + 'static,
        F: Fn(&mut PreActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_pre(None, Some(Arc::new(predicate)), Arc::new(listener))
    }

    // ===== post-action =====

    pub fn register_post<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PostActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_post(None, None, Arc::new(listener))
    }

    pub fn register_post_for<F>(&self, action: ActionType, listener: F) -> ListenerId
    where
        F: Fn(&PostActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_post(Some(action), None, Arc::new(listener))
    }

    pub fn register_post_when<P, F>(&self, predicate: P, listener: F) -> ListenerId
    where
        P: Fn(&PostActionEvent<'_>) -> bool + Send + Sync + 'static,
        F: Fn(&PostActionEvent<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.push_post(None, Some(Arc::new(predicate)), Arc::new(listener))
    }

    /// Removes a pre or post listener. Returns `true` if one was removed.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let removed_pre = remove(&self.pre, id);
        let removed = removed_pre || remove(&self.post, id);
        if removed {
            debug!(target: "chain::events", listener = %id, "listener unregistered");
        }
        removed
    }

    pub fn clear(&self) {
        if let Ok(mut pre) = self.pre.write() {
            pre.clear();
        }
        if let Ok(mut post) = self.post.write() {
            post.clear();
        }
    }

    pub fn pre_count(&self) -> usize {
        self.pre.read().map(|list| list.len()).unwrap_or(0)
    }

    pub fn post_count(&self) -> usize {
        self.post.read().map(|list| list.len()).unwrap_or(0)
    }

    // ===== firing =====

    pub fn fire_pre(&self, event: &mut PreActionEvent<'_>) {
        let action = event.action_type();
        for entry in snapshot(&self.pre) {
            if !entry.wants(action) {
                continue;
            }
            if let Some(predicate) = &entry.predicate
                && !guarded(entry.id, "pre", || predicate(&*event)).unwrap_or(false)
            {
                continue;
            }
            let listener = &entry.listener;
            if let Some(Err(e)) = guarded(entry.id, "pre", || listener(&mut *event)) {
                report(entry.id, "pre", action, &e);
            }
        }
    }

    pub fn fire_post(&self, event: &PostActionEvent<'_>) {
        let action = event.action_type();
        for entry in snapshot(&self.post) {
            if !entry.wants(action) {
                continue;
            }
            if let Some(predicate) = &entry.predicate
                && !guarded(entry.id, "post", || predicate(event)).unwrap_or(false)
            {
                continue;
            }
            let listener = &entry.listener;
            if let Some(Err(e)) = guarded(entry.id, "post", || listener(event)) {
                report(entry.id, "post", action, &e);
            }
        }
    }

    // ===== internals =====

    fn allocate(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn push_pre(
        &self,
        action: Option<ActionType>,
        predicate: Option<Arc<PrePredicate>>,
        listener: Arc<PreListener>,
    ) -> ListenerId {
        let id = self.allocate();
        push(&self.pre, Entry { id, action, predicate, listener }, "pre");
        id
    }

    fn push_post(
        &self,
        action: Option<ActionType>,
        predicate: Option<Arc<PostPredicate>>,
        listener: Arc<PostListener>,
    ) -> ListenerId {
        let id = self.allocate();
        push(&self.post, Entry { id, action, predicate, listener }, "post");
        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pre", &self.pre_count())
            .field("post", &self.post_count())
            .finish()
    }
}

fn push<L: ?Sized, P: ?Sized>(list: &RwLock<Vec<Entry<L, P>>>, entry: Entry<L, P>, phase: &'static str) {
    let id = entry.id;
    let action = entry.action;
    match list.write() {
        Ok(mut list) => {
            list.push(entry);
            debug!(
                target: "chain::events",
                listener = %id,
                phase,
                action = ?action,
                "listener registered"
            );
        }
        Err(_) => error!(target: "chain::events", phase, "listener list lock poisoned"),
    }
}

fn remove<L: ?Sized, P: ?Sized>(list: &RwLock<Vec<Entry<L, P>>>, id: ListenerId) -> bool {
    let Ok(mut list) = list.write() else {
        return false;
    };
    let before = list.len();
    list.retain(|entry| entry.id != id);
    list.len() != before
}

fn snapshot<L: ?Sized, P: ?Sized>(list: &RwLock<Vec<Entry<L, P>>>) -> Vec<Entry<L, P>> {
    match list.read() {
        Ok(list) => list.clone(),
        Err(_) => {
            error!(target: "chain::events", "listener list lock poisoned");
            Vec::new()
        }
    }
}

/// Runs listener code, turning a panic into `None`.
fn guarded<R>(id: ListenerId, phase: &'static str, f: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            error!(target: "chain::events", listener = %id, phase, "listener panicked");
            None
        }
    }
}

fn report(id: ListenerId, phase: &'static str, action: ActionType, e: &ListenerError) {
    error!(
        target: "chain::events",
        listener = %id,
        phase,
        %action,
        error = %e,
        "listener failed, continuing"
    );
}
