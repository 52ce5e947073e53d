use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

pub type SignalId = usize;
pub type EffectId = usize;

/// Signal ids are process-wide so a signal created on one thread can still be
/// looked up (and ignored) by another thread's runtime.
static NEXT_SIGNAL_ID: AtomicUsize = AtomicUsize::new(0);

pub fn allocate_signal() -> SignalId {
    NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed)
}

enum EffectSlot {
    Idle(Box<dyn FnMut()>),
    /// Callback is checked out while it runs, so the runtime stays unborrowed.
    Running,
    Disposed,
}

#[derive(Default)]
pub struct Runtime {
    current_effect: Option<EffectId>,
    pending_effects: VecDeque<EffectId>,
    effects: Vec<EffectSlot>,
    effect_dependencies: Vec<HashSet<SignalId>>,
    signal_subscribers: HashMap<SignalId, HashSet<EffectId>>,
    batch_depth: usize,
    flushing: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_effect(&mut self, callback: Box<dyn FnMut()>) -> EffectId {
        let id = self.effects.len();
        self.effects.push(EffectSlot::Idle(callback));
        self.effect_dependencies.push(HashSet::new());
        id
    }

    pub fn track_read(&mut self, signal_id: SignalId) {
        if let Some(effect_id) = self.current_effect {
            self.signal_subscribers
                .entry(signal_id)
                .or_default()
                .insert(effect_id);
            self.effect_dependencies[effect_id].insert(signal_id);
        }
    }

    /// Queue every subscriber of `signal_id`. Returns true if the caller
    /// should flush now.
    fn queue_subscribers(&mut self, signal_id: SignalId) -> bool {
        if let Some(subscribers) = self.signal_subscribers.get(&signal_id) {
            for &effect_id in subscribers {
                if !self.pending_effects.contains(&effect_id) {
                    self.pending_effects.push_back(effect_id);
                }
            }
        }
        self.batch_depth == 0 && !self.flushing && !self.pending_effects.is_empty()
    }

    fn checkout(&mut self, effect_id: EffectId) -> Option<Box<dyn FnMut()>> {
        let old_deps = std::mem::take(&mut self.effect_dependencies[effect_id]);
        for signal_id in old_deps {
            if let Some(subscribers) = self.signal_subscribers.get_mut(&signal_id) {
                subscribers.remove(&effect_id);
            }
        }
        match std::mem::replace(&mut self.effects[effect_id], EffectSlot::Running) {
            EffectSlot::Idle(callback) => Some(callback),
            other => {
                self.effects[effect_id] = other;
                None
            }
        }
    }

    fn checkin(&mut self, effect_id: EffectId, callback: Box<dyn FnMut()>) {
        // Disposed while running: drop the callback instead of reinstalling it
        if matches!(self.effects[effect_id], EffectSlot::Running) {
            self.effects[effect_id] = EffectSlot::Idle(callback);
        }
    }

    pub fn dispose_effect(&mut self, effect_id: EffectId) {
        let Some(deps) = self.effect_dependencies.get_mut(effect_id) else {
            return;
        };
        for signal_id in std::mem::take(deps) {
            if let Some(subscribers) = self.signal_subscribers.get_mut(&signal_id) {
                subscribers.remove(&effect_id);
            }
        }
        self.effects[effect_id] = EffectSlot::Disposed;
        self.pending_effects.retain(|id| *id != effect_id);
    }
}

pub fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&mut Runtime) -> R,
{
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/// Try to access the runtime. Does nothing if it is already borrowed.
pub fn try_with_runtime<F>(f: F)
where
    F: FnOnce(&mut Runtime),
{
    RUNTIME.with(|rt| {
        if let Ok(mut runtime) = rt.try_borrow_mut() {
            f(&mut runtime);
        }
    });
}

pub fn create_effect_id(callback: Box<dyn FnMut()>) -> EffectId {
    let id = with_runtime(|rt| rt.allocate_effect(callback));
    run_effect(id);
    id
}

/// Run an effect with dependency tracking. The runtime is not borrowed while
/// the callback executes, so the callback may freely read and write signals.
pub fn run_effect(effect_id: EffectId) {
    let Some(mut callback) = with_runtime(|rt| rt.checkout(effect_id)) else {
        return;
    };
    let prev = with_runtime(|rt| rt.current_effect.replace(effect_id));
    callback();
    with_runtime(|rt| {
        rt.current_effect = prev;
        rt.checkin(effect_id, callback);
    });
}

pub fn notify_write(signal_id: SignalId) {
    let should_flush = RUNTIME.with(|rt| match rt.try_borrow_mut() {
        Ok(mut runtime) => runtime.queue_subscribers(signal_id),
        Err(_) => false,
    });
    if should_flush {
        flush_effects();
    }
}

pub fn flush_effects() {
    with_runtime(|rt| rt.flushing = true);
    while let Some(effect_id) = with_runtime(|rt| rt.pending_effects.pop_front()) {
        run_effect(effect_id);
    }
    with_runtime(|rt| rt.flushing = false);
}

pub fn batch<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    with_runtime(|rt| rt.batch_depth += 1);
    let result = f();
    let should_flush = with_runtime(|rt| {
        rt.batch_depth -= 1;
        rt.batch_depth == 0 && !rt.flushing && !rt.pending_effects.is_empty()
    });
    if should_flush {
        flush_effects();
    }
    result
}

pub(crate) fn reset_runtime() {
    RUNTIME.with(|rt| *rt.borrow_mut() = Runtime::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_effect_runs_on_creation() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        create_effect_id(Box::new(move || counter.set(counter.get() + 1)));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_disposed_effect_is_not_queued() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let signal = allocate_signal();
        let id = create_effect_id(Box::new(move || {
            with_runtime(|rt| rt.track_read(signal));
            counter.set(counter.get() + 1);
        }));
        with_runtime(|rt| rt.dispose_effect(id));
        notify_write(signal);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_batch_defers_effects_until_end() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let signal = allocate_signal();
        create_effect_id(Box::new(move || {
            with_runtime(|rt| rt.track_read(signal));
            counter.set(counter.get() + 1);
        }));

        batch(|| {
            notify_write(signal);
            notify_write(signal);
            assert_eq!(runs.get(), 1);
        });
        assert_eq!(runs.get(), 2);
    }
}
