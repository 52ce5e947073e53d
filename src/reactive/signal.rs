use std::sync::{Arc, RwLock};

use super::invalidation::request_frame;
use super::runtime::{allocate_signal, notify_write, try_with_runtime, SignalId};

struct SignalInner<T> {
    id: SignalId,
    value: RwLock<T>,
}

/// A reactive value that can be read and written from any thread.
///
/// Signals are the bindings of the reactive system: an alert's visibility
/// flag is a `Signal<bool>` shared between the caller and the alert. When a
/// signal's value changes, effects that read it re-run on the UI thread.
///
/// # Thread Safety
/// Values can be written from any thread. Effect notification only happens
/// on the thread that owns the subscribing effects. Other threads just
/// update the value and wake the event loop, so a UI-thread consumer that
/// must see such writes re-reads the value on its next frame.
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: allocate_signal(),
                value: RwLock::new(value),
            }),
        }
    }

    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                inner: self.inner.clone(),
            },
            WriteSignal { inner: self.inner },
        )
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.track();
        self.inner.read(f)
    }

    pub fn with_untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.read(f)
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: PartialEq> Signal<T> {
    /// Sets the signal's value, only triggering updates if the value actually changed.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    /// Updates the signal's value using a closure, only triggering updates if the value changed.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.inner.update(f);
    }
}

impl<T> SignalInner<T> {
    fn track(&self) {
        try_with_runtime(|rt| rt.track_read(self.id));
    }

    fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        // A poisoned lock still holds a consistent bool/struct for our purposes
        let guard = self.value.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn changed(&self) {
        notify_write(self.id);
        request_frame();
    }
}

impl<T: PartialEq> SignalInner<T> {
    fn set(&self, value: T) {
        let Ok(mut guard) = self.value.write() else {
            return; // Lock poisoned, skip update silently
        };
        if *guard != value {
            *guard = value;
            drop(guard);
            self.changed();
        }
    }
}

impl<T: PartialEq + Clone> SignalInner<T> {
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let Ok(mut guard) = self.value.write() else {
            return;
        };
        let old_value = guard.clone();
        f(&mut *guard);
        if *guard != old_value {
            drop(guard);
            self.changed();
        }
    }
}

/// Read-only handle to a signal.
pub struct ReadSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> ReadSignal<T> {
    pub fn get(&self) -> T {
        self.inner.track();
        self.inner.read(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.inner.read(T::clone)
    }
}

/// Write-only handle to a signal.
pub struct WriteSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: PartialEq> WriteSignal<T> {
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }
}

impl<T: PartialEq + Clone> WriteSignal<T> {
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.inner.update(f);
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}
