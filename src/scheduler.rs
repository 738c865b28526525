//! Cancellable periodic and deferred tasks.
//!
//! Every task is owned by the handle returned when it is scheduled.
//! Dropping the handle cancels the task synchronously, so a superseded
//! registration never fires again.

use gloo_timers::callback::{Interval, Timeout};

/// Source of periodic and one-shot callbacks on the current thread.
pub trait Scheduler {
    /// Token for a scheduled task. Dropping it cancels the task.
    type Handle;

    /// Run `task` every `period_ms` milliseconds until the handle is dropped.
    fn every(&self, period_ms: u32, task: Box<dyn FnMut()>) -> Self::Handle;

    /// Run `task` once after `delay_ms` milliseconds unless the handle is dropped first.
    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Scheduler backed by `setInterval` / `setTimeout` through `gloo-timers`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserScheduler;

/// A live browser timer. Dropping it clears the interval or timeout.
pub enum BrowserTask {
    Interval(Interval),
    Timeout(Timeout),
}

impl Scheduler for BrowserScheduler {
    type Handle = BrowserTask;

    fn every(&self, period_ms: u32, mut task: Box<dyn FnMut()>) -> BrowserTask {
        BrowserTask::Interval(Interval::new(period_ms, move || task()))
    }

    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> BrowserTask {
        BrowserTask::Timeout(Timeout::new(delay_ms, task))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic virtual-clock scheduler for native tests.

    use super::Scheduler;
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    enum Job {
        Periodic { period: u64, task: Box<dyn FnMut()> },
        Once(Box<dyn FnOnce()>),
    }

    struct Entry {
        id: u64,
        due: u64,
        // `None` while the job is running.
        job: Option<Job>,
    }

    #[derive(Default)]
    struct Queue {
        now: u64,
        next_id: u64,
        entries: Vec<Entry>,
    }

    impl Queue {
        fn push(&mut self, due: u64, job: Job) -> u64 {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(Entry { id, due, job: Some(job) });
            id
        }

        /// Earliest runnable entry due at or before `limit`, ties broken by registration order.
        fn next_due(&self, limit: u64) -> Option<(u64, u64)> {
            self.entries
                .iter()
                .filter(|e| e.job.is_some() && e.due <= limit)
                .map(|e| (e.due, e.id))
                .min()
        }
    }

    #[derive(Clone, Default)]
    pub struct ManualScheduler {
        queue: Rc<RefCell<Queue>>,
    }

    pub struct ManualHandle {
        id: u64,
        queue: Weak<RefCell<Queue>>,
    }

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            if let Some(queue) = self.queue.upgrade() {
                queue.borrow_mut().entries.retain(|e| e.id != self.id);
            }
        }
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> u64 {
            self.queue.borrow().now
        }

        /// Number of tasks that have not been cancelled or completed.
        pub fn pending(&self) -> usize {
            self.queue.borrow().entries.len()
        }

        /// Move the clock forward by `ms`, firing every task that falls due.
        pub fn advance(&self, ms: u64) {
            let limit = self.queue.borrow().now + ms;
            loop {
                let next = self.queue.borrow().next_due(limit);
                let Some((due, id)) = next else { break };

                let job = {
                    let mut q = self.queue.borrow_mut();
                    q.now = due;
                    let Some(pos) = q.entries.iter().position(|e| e.id == id) else {
                        continue;
                    };
                    let taken = q.entries[pos].job.take();
                    match taken {
                        Some(Job::Once(task)) => {
                            q.entries.remove(pos);
                            Job::Once(task)
                        }
                        Some(job) => job,
                        None => continue,
                    }
                };

                match job {
                    Job::Once(task) => task(),
                    Job::Periodic { period, mut task } => {
                        task();
                        let mut q = self.queue.borrow_mut();
                        // The handle may have been dropped from inside the task.
                        if let Some(entry) = q.entries.iter_mut().find(|e| e.id == id) {
                            entry.due = due + period;
                            entry.job = Some(Job::Periodic { period, task });
                        }
                    }
                }
            }
            self.queue.borrow_mut().now = limit;
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn every(&self, period_ms: u32, task: Box<dyn FnMut()>) -> ManualHandle {
            let mut q = self.queue.borrow_mut();
            let period = u64::from(period_ms.max(1));
            let due = q.now + period;
            let id = q.push(due, Job::Periodic { period, task });
            ManualHandle { id, queue: Rc::downgrade(&self.queue) }
        }

        fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualHandle {
            let mut q = self.queue.borrow_mut();
            let due = q.now + u64::from(delay_ms);
            let id = q.push(due, Job::Once(task));
            ManualHandle { id, queue: Rc::downgrade(&self.queue) }
        }
    }

    mod tests {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::cell::Cell;

        #[test]
        fn periodic_task_fires_once_per_period() {
            let sched = ManualScheduler::new();
            let hits = Rc::new(Cell::new(0));
            let h = hits.clone();
            let _handle = sched.every(1000, Box::new(move || h.set(h.get() + 1)));

            sched.advance(999);
            assert_eq!(hits.get(), 0);
            sched.advance(1);
            assert_eq!(hits.get(), 1);
            sched.advance(3000);
            assert_eq!(hits.get(), 4);
            assert_eq!(sched.now(), 4000);
        }

        #[test]
        fn dropping_handle_cancels() {
            let sched = ManualScheduler::new();
            let hits = Rc::new(Cell::new(0));
            let h = hits.clone();
            let handle = sched.after(500, Box::new(move || h.set(h.get() + 1)));
            assert_eq!(sched.pending(), 1);
            drop(handle);
            assert_eq!(sched.pending(), 0);
            sched.advance(1000);
            assert_eq!(hits.get(), 0);
        }

        #[test]
        fn one_shot_is_removed_after_firing() {
            let sched = ManualScheduler::new();
            let hits = Rc::new(Cell::new(0));
            let h = hits.clone();
            let _handle = sched.after(10, Box::new(move || h.set(h.get() + 1)));
            sched.advance(100);
            assert_eq!(hits.get(), 1);
            assert_eq!(sched.pending(), 0);
        }

        #[test]
        fn periodic_task_can_cancel_itself() {
            let sched = ManualScheduler::new();
            let slot: Rc<RefCell<Option<ManualHandle>>> = Rc::new(RefCell::new(None));
            let hits = Rc::new(Cell::new(0));

            let (s, h) = (slot.clone(), hits.clone());
            let handle = sched.every(
                100,
                Box::new(move || {
                    h.set(h.get() + 1);
                    if h.get() == 2 {
                        s.borrow_mut().take();
                    }
                }),
            );
            *slot.borrow_mut() = Some(handle);

            sched.advance(1000);
            assert_eq!(hits.get(), 2);
            assert_eq!(sched.pending(), 0);
        }
    }
}
