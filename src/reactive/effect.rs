use super::owner::{effect_has_owner, register_effect};
use super::runtime::{create_effect_id, with_runtime, EffectId};

/// Handle to a running effect. Dropping it stops the effect unless it
/// belongs to an owner scope, in which case the owner disposes it.
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let id = create_effect_id(Box::new(f));
        register_effect(id);
        Self { id }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if !effect_has_owner(self.id) {
            with_runtime(|rt| rt.dispose_effect(self.id));
        }
    }
}

pub fn create_effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    Effect::new(f)
}
