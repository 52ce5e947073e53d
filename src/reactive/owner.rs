//! Reactive ownership for automatic resource cleanup.
//!
//! Effects and cleanup callbacks created inside [`with_owner`] belong to that
//! owner. Disposing the owner stops its effects and runs its cleanups, which
//! is how an alert's observation of its visibility flag is torn down when the
//! host view leaves the hierarchy.
//!
//! ```ignore
//! let (_, owner) = with_owner(|| {
//!     let effect = create_effect(move || log::debug!("visible: {}", flag.get()));
//!     on_cleanup(|| log::debug!("detached"));
//! });
//! dispose_owner(owner);
//! ```

use std::cell::RefCell;

use super::runtime::{with_runtime, EffectId};

pub type OwnerId = usize;

#[derive(Default)]
struct Owner {
    effects: Vec<EffectId>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    children: Vec<OwnerId>,
}

#[derive(Default)]
struct OwnerArena {
    owners: Vec<Option<Owner>>,
}

impl OwnerArena {
    fn allocate(&mut self) -> OwnerId {
        self.owners.push(Some(Owner::default()));
        self.owners.len() - 1
    }

    fn get_mut(&mut self, id: OwnerId) -> Option<&mut Owner> {
        self.owners.get_mut(id).and_then(|o| o.as_mut())
    }

    fn take(&mut self, id: OwnerId) -> Option<Owner> {
        self.owners.get_mut(id).and_then(|o| o.take())
    }
}

thread_local! {
    static CURRENT_OWNER: RefCell<Option<OwnerId>> = const { RefCell::new(None) };
    static OWNERS: RefCell<OwnerArena> = RefCell::new(OwnerArena::default());
}

/// Execute a closure within a new owner scope.
///
/// Returns the closure's result and the owner ID to pass to [`dispose_owner`].
pub fn with_owner<T>(f: impl FnOnce() -> T) -> (T, OwnerId) {
    let parent = current_owner();

    let owner_id = OWNERS.with(|owners| {
        let mut owners = owners.borrow_mut();
        let id = owners.allocate();
        if let Some(parent_owner) = parent.and_then(|p| owners.get_mut(p)) {
            parent_owner.children.push(id);
        }
        id
    });

    let prev_owner = CURRENT_OWNER.with(|current| current.borrow_mut().replace(owner_id));
    let result = f();
    CURRENT_OWNER.with(|current| *current.borrow_mut() = prev_owner);

    (result, owner_id)
}

pub fn current_owner() -> Option<OwnerId> {
    CURRENT_OWNER.with(|current| *current.borrow())
}

/// Dispose an owner: children first, then cleanups (LIFO), then effects.
pub fn dispose_owner(id: OwnerId) {
    let Some(owner) = OWNERS.with(|owners| owners.borrow_mut().take(id)) else {
        return; // Already disposed
    };

    for child_id in owner.children {
        dispose_owner(child_id);
    }

    for cleanup in owner.cleanups.into_iter().rev() {
        cleanup();
    }

    for effect_id in owner.effects {
        with_runtime(|rt| rt.dispose_effect(effect_id));
    }
}

/// Register a cleanup callback to run when the current owner is disposed.
///
/// Does nothing outside an owner scope.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    with_current(|owner| owner.cleanups.push(Box::new(f)));
}

pub(crate) fn register_effect(id: EffectId) {
    with_current(|owner| owner.effects.push(id));
}

pub(crate) fn effect_has_owner(id: EffectId) -> bool {
    OWNERS.with(|owners| {
        owners
            .borrow()
            .owners
            .iter()
            .flatten()
            .any(|owner| owner.effects.contains(&id))
    })
}

fn with_current(f: impl FnOnce(&mut Owner)) {
    if let Some(owner_id) = current_owner() {
        OWNERS.with(|owners| {
            if let Some(owner) = owners.borrow_mut().get_mut(owner_id) {
                f(owner);
            }
        });
    }
}

pub(crate) fn reset_owners() {
    CURRENT_OWNER.with(|current| *current.borrow_mut() = None);
    OWNERS.with(|owners| *owners.borrow_mut() = OwnerArena::default());
}
