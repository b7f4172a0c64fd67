use std::cell::RefCell;
use std::rc::Rc;

use core_types::{Category, CounterStore};

/// Handle to the current load's counter store.
///
/// Shared by every decorator and probe inside one page context; it never
/// leaves that context except as a [`snapshot`](Recorder::snapshot) copy.
#[derive(Clone, Debug, Default)]
pub struct Recorder(Rc<RefCell<CounterStore>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, category: Category, key: &str) {
        self.0.borrow_mut().increment(category, key);
    }

    pub fn set_count(&self, category: Category, key: &str, count: u64) {
        self.0.borrow_mut().set_count(category, key, count);
    }

    pub fn mark(&self, category: Category, key: &str) {
        self.0.borrow_mut().mark(category, key);
    }

    pub fn clear_category(&self, category: Category) {
        self.0.borrow_mut().clear_category(category);
    }

    pub fn get(&self, category: Category, key: &str) -> Option<u64> {
        self.0.borrow().get(category, key)
    }

    pub fn snapshot(&self) -> CounterStore {
        self.0.borrow().clone()
    }
}
