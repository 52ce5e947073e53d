use std::cell::Cell;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use calloop::ping::Ping;

bitflags! {
    /// Flags indicating what aspects of rendering need to be updated
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// Layout must be recalculated (content mounted, unmounted or resized)
        const NEEDS_LAYOUT = 0b01;
        /// Visual appearance changed (opacity or offset moved)
        const NEEDS_PAINT  = 0b10;
    }
}

thread_local! {
    static CHANGE_FLAGS: Cell<ChangeFlags> =
        const { Cell::new(ChangeFlags::NEEDS_LAYOUT.union(ChangeFlags::NEEDS_PAINT)) };
}

pub fn mark_needs_layout() {
    CHANGE_FLAGS.with(|flags| {
        flags.set(flags.get() | ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT)
    });
    request_frame();
}

pub fn mark_needs_paint() {
    CHANGE_FLAGS.with(|flags| flags.set(flags.get() | ChangeFlags::NEEDS_PAINT));
    request_frame();
}

/// Return and clear the accumulated change flags.
pub fn take_change_flags() -> ChangeFlags {
    CHANGE_FLAGS.with(|flags| flags.replace(ChangeFlags::empty()))
}

/// Global flag to indicate a frame is requested
static FRAME_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Global wakeup handle for signaling the event loop
static WAKEUP_PING: Mutex<Option<Ping>> = Mutex::new(None);

/// Install the wakeup handle of the running loop (called from `AlertLoop::run()`)
pub fn init_wakeup(ping: Ping) {
    if let Ok(mut wakeup) = WAKEUP_PING.lock() {
        *wakeup = Some(ping);
    }
}

/// Request that the main event loop process a frame
pub fn request_frame() {
    // Only ping on first request - avoids redundant syscalls when multiple signals update
    let was_requested = FRAME_REQUESTED.swap(true, Ordering::Relaxed);
    if !was_requested {
        if let Ok(wakeup) = WAKEUP_PING.lock() {
            if let Some(ping) = wakeup.as_ref() {
                ping.ping();
            }
        }
    }
}

/// Check if a frame has been requested and clear the flag
pub fn take_frame_request() -> bool {
    FRAME_REQUESTED.swap(false, Ordering::Relaxed)
}

pub(crate) fn reset_invalidation() {
    if let Ok(mut wakeup) = WAKEUP_PING.lock() {
        *wakeup = None;
    }
    FRAME_REQUESTED.store(false, Ordering::Relaxed);
    CHANGE_FLAGS.with(|flags| flags.set(ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_change_flags_clears() {
        take_change_flags();
        mark_needs_paint();
        assert_eq!(take_change_flags(), ChangeFlags::NEEDS_PAINT);
        assert!(take_change_flags().is_empty());
    }

    #[test]
    fn test_layout_implies_paint() {
        take_change_flags();
        mark_needs_layout();
        let flags = take_change_flags();
        assert!(flags.contains(ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT));
    }
}
