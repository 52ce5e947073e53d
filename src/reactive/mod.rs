pub mod effect;
pub mod invalidation;
pub mod owner;
pub mod runtime;
pub mod signal;

pub use effect::{Effect, create_effect};
pub use invalidation::{
    ChangeFlags, init_wakeup, mark_needs_layout, mark_needs_paint, request_frame,
    take_change_flags, take_frame_request,
};
pub use owner::{OwnerId, dispose_owner, on_cleanup, with_owner};
pub use runtime::batch;
pub use signal::{ReadSignal, Signal, WriteSignal, create_signal};

/// Reset all thread-local reactive state.
///
/// Called when an `AlertLoop` finishes so a later run starts clean.
pub(crate) fn reset_reactive() {
    owner::reset_owners();
    runtime::reset_runtime();
    invalidation::reset_invalidation();
}
