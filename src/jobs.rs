// ============================================================================
// UI-Loop Job Queue
// ============================================================================
//
// Deferred work that must run on the UI thread: "on the next loop iteration"
// jobs and timed continuations such as the post-exit unmount of an alert.
// Nothing here blocks; the event loop calls `run_due_jobs()` once per
// iteration and sleeps until `next_deadline()` in between.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for jobs and animations.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Used to drive animations and timers
/// deterministically.
pub struct ManualClock {
    base: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }
}

/// Handle returned when scheduling a job, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

type Job = Box<dyn FnOnce()>;

struct JobQueue {
    clock: Rc<dyn Clock>,
    /// Ordered by deadline, then by scheduling order.
    jobs: BTreeMap<(Instant, u64), Job>,
    deadlines: BTreeMap<u64, Instant>,
    next_id: u64,
}

impl JobQueue {
    fn new() -> Self {
        Self {
            clock: Rc::new(SystemClock),
            jobs: BTreeMap::new(),
            deadlines: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, deadline: Instant, job: Job) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.insert((deadline, id), job);
        self.deadlines.insert(id, deadline);
        TimerId(id)
    }

    /// Remove the earliest job that is due and was queued before `watermark`.
    fn pop_due(&mut self, now: Instant, watermark: u64) -> Option<Job> {
        let key = self
            .jobs
            .keys()
            .take_while(|(deadline, _)| *deadline <= now)
            .find(|(_, id)| *id < watermark)
            .copied()?;
        self.deadlines.remove(&key.1);
        self.jobs.remove(&key)
    }
}

thread_local! {
    static JOBS: RefCell<JobQueue> = RefCell::new(JobQueue::new());
}

/// Replace the clock used by jobs and animations on this thread.
pub fn set_clock(clock: Rc<dyn Clock>) {
    JOBS.with(|jobs| jobs.borrow_mut().clock = clock);
}

/// Install a fresh [`ManualClock`] on this thread and return it.
pub fn install_manual_clock() -> Rc<ManualClock> {
    let clock = Rc::new(ManualClock::new());
    set_clock(clock.clone());
    clock
}

pub fn now() -> Instant {
    JOBS.with(|jobs| jobs.borrow().clock.now())
}

/// Run `job` once `delay` has elapsed, on a later loop iteration.
pub fn schedule_after(delay: Duration, job: impl FnOnce() + 'static) -> TimerId {
    let id = JOBS.with(|jobs| {
        let mut jobs = jobs.borrow_mut();
        let deadline = jobs.clock.now() + delay;
        jobs.push(deadline, Box::new(job))
    });
    log::trace!("Scheduled job {:?} in {:?}", id, delay);
    crate::reactive::request_frame();
    id
}

/// Run `job` on the next iteration of the UI loop.
pub fn next_tick(job: impl FnOnce() + 'static) -> TimerId {
    schedule_after(Duration::ZERO, job)
}

/// Cancel a pending job. Returns false if it already ran or was cancelled.
pub fn cancel(id: TimerId) -> bool {
    JOBS.with(|jobs| {
        let mut jobs = jobs.borrow_mut();
        match jobs.deadlines.remove(&id.0) {
            Some(deadline) => jobs.jobs.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    })
}

/// Run every job that is due. Jobs queued while this runs wait for the next
/// call, even if they are already due.
///
/// Returns the number of jobs executed.
pub fn run_due_jobs() -> usize {
    let (now, watermark) = JOBS.with(|jobs| {
        let jobs = jobs.borrow();
        (jobs.clock.now(), jobs.next_id)
    });

    let mut ran = 0;
    // The queue is not borrowed while a job runs, so jobs may schedule more jobs
    while let Some(job) = JOBS.with(|jobs| jobs.borrow_mut().pop_due(now, watermark)) {
        job();
        ran += 1;
    }
    if ran > 0 {
        log::trace!("Ran {} due job(s)", ran);
    }
    ran
}

pub fn next_deadline() -> Option<Instant> {
    JOBS.with(|jobs| jobs.borrow().jobs.keys().next().map(|(deadline, _)| *deadline))
}

pub fn has_pending_jobs() -> bool {
    JOBS.with(|jobs| !jobs.borrow().jobs.is_empty())
}

/// Drop all pending jobs and return to the system clock.
pub(crate) fn reset_jobs() {
    JOBS.with(|jobs| *jobs.borrow_mut() = JobQueue::new());
}
