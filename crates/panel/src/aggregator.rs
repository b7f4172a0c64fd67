use bus::EvalError;
use core_types::{CounterStore, merge};

/// Owns the session store and the latest current store of a monitoring
/// session.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    session: CounterStore,
    current: CounterStore,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the outcome of an evaluation as the current store. A failure
    /// leaves an empty current store and returns the message to show.
    pub fn accept(&mut self, result: Result<CounterStore, EvalError>) -> Option<String> {
        match result {
            Ok(current) => {
                self.current = current;
                None
            }
            Err(err) => {
                log::warn!(target: "panel", "evaluation failed: {err}");
                self.current = CounterStore::new();
                Some(err.message).filter(|message| !message.is_empty())
            }
        }
    }

    /// Session plus current, for display. Neither store changes.
    pub fn merged(&self) -> CounterStore {
        merge(&self.session, &self.current)
    }

    /// Folds current into session and discards it.
    pub fn commit(&mut self) {
        self.session = merge(&self.session, &self.current);
        self.current = CounterStore::new();
    }

    pub fn clear_session(&mut self) {
        self.session = CounterStore::new();
    }

    pub fn current(&self) -> &CounterStore {
        &self.current
    }

    pub fn session(&self) -> &CounterStore {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Category;

    fn store(entries: &[(Category, &str, u64)]) -> CounterStore {
        let mut s = CounterStore::new();
        for &(category, key, n) in entries {
            s.set_count(category, key, n);
        }
        s
    }

    #[test]
    fn merged_view_has_no_side_effects() {
        let mut agg = Aggregator::new();
        agg.accept(Ok(store(&[(Category::Accessed, "Worker", 2)])));
        let first = agg.merged();
        let second = agg.merged();
        assert_eq!(first, second);
        assert!(agg.session().is_empty());
        assert_eq!(agg.current().get(Category::Accessed, "Worker"), Some(2));
    }

    #[test]
    fn commit_accumulates_snapshots_and_discards_current() {
        let mut agg = Aggregator::new();
        agg.accept(Ok(store(&[(Category::Elements, "nav", 3)])));
        agg.commit();
        assert!(agg.current().is_empty());
        agg.accept(Ok(store(&[(Category::Elements, "nav", 3)])));
        agg.commit();
        assert_eq!(agg.session().get(Category::Elements, "nav"), Some(6));

        // Committing again without a new report adds nothing.
        agg.commit();
        assert_eq!(agg.session().get(Category::Elements, "nav"), Some(6));
    }

    #[test]
    fn failed_evaluation_empties_current_and_keeps_session() {
        let mut agg = Aggregator::new();
        agg.accept(Ok(store(&[(Category::Listeners, "input", 1)])));
        agg.commit();
        agg.accept(Ok(store(&[(Category::Listeners, "input", 4)])));

        let message = agg.accept(Err(EvalError::new("page crashed")));
        assert_eq!(message.as_deref(), Some("page crashed"));
        assert!(agg.current().is_empty());
        assert_eq!(agg.session().get(Category::Listeners, "input"), Some(1));
        assert_eq!(agg.merged(), *agg.session());

        assert_eq!(agg.accept(Err(EvalError::new(""))), None);
        assert!(agg.current().is_empty());
    }

    #[test]
    fn clear_session_keeps_current() {
        let mut agg = Aggregator::new();
        agg.accept(Ok(store(&[(Category::Doctypes, "HTML5", 1)])));
        agg.commit();
        agg.accept(Ok(store(&[(Category::Doctypes, "non-HTML5", 1)])));
        agg.clear_session();
        assert!(agg.session().is_empty());
        assert_eq!(agg.merged(), *agg.current());
    }
}
