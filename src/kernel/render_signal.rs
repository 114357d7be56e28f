use std::cell::Cell;
use std::rc::Rc;

/// Counter whose only meaning is "layout was invalidated since you last looked".
#[derive(Debug, Clone, Default)]
pub struct RenderSignal {
    counter: Rc<Cell<u64>>,
}

/// Cloneable handle that bumps a [`RenderSignal`].
#[derive(Debug, Clone)]
pub struct RenderTrigger {
    counter: Rc<Cell<u64>>,
}

impl RenderSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> u64 {
        self.counter.get()
    }

    pub fn trigger(&self) {
        bump(&self.counter);
    }

    pub fn split(&self) -> (u64, RenderTrigger) {
        (
            self.counter.get(),
            RenderTrigger {
                counter: self.counter.clone(),
            },
        )
    }
}

impl RenderTrigger {
    pub fn trigger(&self) {
        bump(&self.counter);
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}
