//! Trailing-edge debounce with generation-based invalidation.
//!
//! A [`DebounceSite`] is one logical place that creates debounced functions.
//! Every time its dependencies change it hands out a new [`Debounced`] and
//! bumps the shared generation. Timers already queued by older versions are
//! left alone; when they fire they compare the generation they captured with
//! the site's current one and do nothing on mismatch.

use super::timer::Scheduler;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Converts a millisecond count into a delay. Negative values mean "next tick".
pub fn delay_from_millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

pub struct DebounceSite<A, D> {
    scheduler: Rc<Scheduler>,
    generation: Rc<Cell<u64>>,
    deps: Option<D>,
    current: Option<Debounced<A>>,
}

impl<A: 'static, D: PartialEq> DebounceSite<A, D> {
    pub fn new(scheduler: Rc<Scheduler>) -> Self {
        Self {
            scheduler,
            generation: Rc::new(Cell::new(0)),
            deps: None,
            current: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Returns the debounced version of `f`.
    ///
    /// While `deps` compares equal to the previous call, the existing function
    /// is returned and `f` is dropped. Otherwise the generation advances and
    /// any call still pending from an older version becomes a no-op.
    pub fn create<F>(&mut self, f: F, delay: Duration, deps: D) -> Debounced<A>
    where
        F: Fn(A) + 'static,
    {
        if let (Some(prev), Some(current)) = (self.deps.as_ref(), self.current.as_ref()) {
            if *prev == deps {
                return current.clone();
            }
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        tracing::debug!(generation, delay_ms = delay.as_millis() as u64, "debounce regenerated");

        let debounced = Debounced {
            scheduler: self.scheduler.clone(),
            site_generation: Rc::downgrade(&self.generation),
            generation,
            calls: Rc::new(Cell::new(0)),
            delay,
            f: Rc::new(f),
        };
        self.deps = Some(deps);
        self.current = Some(debounced.clone());
        debounced
    }
}

pub struct Debounced<A> {
    scheduler: Rc<Scheduler>,
    site_generation: Weak<Cell<u64>>,
    generation: u64,
    calls: Rc<Cell<u64>>,
    delay: Duration,
    f: Rc<dyn Fn(A)>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            site_generation: self.site_generation.clone(),
            generation: self.generation,
            calls: self.calls.clone(),
            delay: self.delay,
            f: self.f.clone(),
        }
    }
}

impl<A: 'static> Debounced<A> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// False once the site has moved on to a newer generation or was dropped.
    pub fn is_current(&self) -> bool {
        self.site_generation
            .upgrade()
            .is_some_and(|current| current.get() == self.generation)
    }

    /// Schedules `f(args)` after the delay. A later call before the delay
    /// elapses supersedes this one.
    pub fn call(&self, args: A) {
        let call = self.calls.get() + 1;
        self.calls.set(call);

        let site_generation = self.site_generation.clone();
        let generation = self.generation;
        let calls = Rc::downgrade(&self.calls);
        let f = self.f.clone();
        self.scheduler.schedule_after(self.delay, move || {
            let Some(current) = site_generation.upgrade() else {
                tracing::debug!(generation, "debounced call dropped: site gone");
                return;
            };
            if current.get() != generation {
                tracing::debug!(
                    generation,
                    current = current.get(),
                    "debounced call dropped: stale generation"
                );
                return;
            }
            // superseded by a newer call on the same function
            if calls.upgrade().map_or(true, |latest| latest.get() != call) {
                return;
            }
            f(args);
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/debounce.rs"]
mod tests;
