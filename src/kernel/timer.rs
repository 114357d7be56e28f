//! 单线程定时器队列
//!
//! Deadlines are polled from the owner's tick loop instead of being driven by
//! OS timers. Entries are never cancelled; whoever scheduled them decides at
//! fire time whether they still matter.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

type Task = Box<dyn FnOnce()>;

struct Entry {
    deadline: Instant,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap 是大顶堆，这里反转得到最早的 deadline
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct Scheduler {
    clock: Rc<dyn Clock>,
    queue: RefCell<BinaryHeap<Entry>>,
    next_seq: Cell<u64>,
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: RefCell::new(BinaryHeap::new()),
            next_seq: Cell::new(0),
        }
    }

    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock))
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn schedule_after(&self, delay: Duration, task: impl FnOnce() + 'static) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(Entry {
            deadline: self.clock.now() + delay,
            seq,
            task: Box::new(task),
        });
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.borrow().peek().map(|entry| entry.deadline)
    }

    /// Fires every entry that is due, in deadline order.
    ///
    /// The due set is taken before anything runs, so a task scheduled from
    /// inside another task waits for the next pass even with a zero delay.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let mut due = Vec::new();
        {
            let mut queue = self.queue.borrow_mut();
            while queue.peek().is_some_and(|entry| entry.deadline <= now) {
                if let Some(entry) = queue.pop() {
                    due.push(entry);
                }
            }
        }

        let fired = due.len();
        for entry in due {
            (entry.task)();
        }
        fired
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/timer.rs"]
mod tests;
