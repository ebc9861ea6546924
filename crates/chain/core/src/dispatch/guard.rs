use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a dispatch until dropped.
///
/// At most one guard exists per thread. The flag is cleared on drop, so it is
/// released on every exit path including unwinding.
pub(crate) struct DispatchGuard {
    // Tied to the thread that set the flag.
    _not_send: PhantomData<*const ()>,
}

impl DispatchGuard {
    /// Returns `None` when this thread is already dispatching.
    pub(crate) fn acquire() -> Option<Self> {
        DISPATCHING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(Self {
                    _not_send: PhantomData,
                })
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

/// Whether the calling thread is currently inside [`super::Dispatcher::dispatch`].
pub fn is_dispatching() -> bool {
    DISPATCHING.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_on_same_thread_fails() {
        let guard = DispatchGuard::acquire();
        assert!(guard.is_some());
        assert!(is_dispatching());
        assert!(DispatchGuard::acquire().is_none());
        drop(guard);
        assert!(!is_dispatching());
        assert!(DispatchGuard::acquire().is_some());
    }

    #[test]
    fn other_threads_are_independent() {
        let _guard = DispatchGuard::acquire();
        let elsewhere = std::thread::spawn(|| DispatchGuard::acquire().is_some())
            .join()
            .unwrap();
        assert!(elsewhere);
    }
}
