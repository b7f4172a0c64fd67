use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub type Counts = BTreeMap<String, u64>;

/// The five independent frequency tables observed for a page.
///
/// Every value is strictly positive: a key that would drop to zero is removed
/// instead, so absence always means "not observed".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterStore {
    #[serde(default, deserialize_with = "positive_counts")]
    pub accessed: Counts,
    #[serde(default, deserialize_with = "positive_counts")]
    pub doctypes: Counts,
    #[serde(default, deserialize_with = "positive_counts")]
    pub elements: Counts,
    #[serde(default, deserialize_with = "positive_counts")]
    pub attributes: Counts,
    #[serde(default, deserialize_with = "positive_counts")]
    pub listeners: Counts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Accessed,
    Doctypes,
    Elements,
    Attributes,
    Listeners,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Accessed,
        Category::Doctypes,
        Category::Elements,
        Category::Attributes,
        Category::Listeners,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Accessed => "accessed",
            Category::Doctypes => "doctypes",
            Category::Elements => "elements",
            Category::Attributes => "attributes",
            Category::Listeners => "listeners",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: Category) -> &Counts {
        match category {
            Category::Accessed => &self.accessed,
            Category::Doctypes => &self.doctypes,
            Category::Elements => &self.elements,
            Category::Attributes => &self.attributes,
            Category::Listeners => &self.listeners,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut Counts {
        match category {
            Category::Accessed => &mut self.accessed,
            Category::Doctypes => &mut self.doctypes,
            Category::Elements => &mut self.elements,
            Category::Attributes => &mut self.attributes,
            Category::Listeners => &mut self.listeners,
        }
    }

    /// Accumulate: adds one observation under `key`.
    pub fn increment(&mut self, category: Category, key: &str) {
        match self.category_mut(category).get_mut(key) {
            Some(n) => *n = n.saturating_add(1),
            None => {
                self.category_mut(category).insert(key.to_string(), 1);
            }
        }
    }

    /// Replace: `key` now holds `count`; a zero count removes the key.
    pub fn set_count(&mut self, category: Category, key: &str, count: u64) {
        let counts = self.category_mut(category);
        if count == 0 {
            counts.remove(key);
        } else {
            counts.insert(key.to_string(), count);
        }
    }

    /// Set-presence: records that `key` was seen at all.
    pub fn mark(&mut self, category: Category, key: &str) {
        self.set_count(category, key, 1);
    }

    pub fn get(&self, category: Category, key: &str) -> Option<u64> {
        self.category(category).get(key).copied()
    }

    pub fn clear_category(&mut self, category: Category) {
        self.category_mut(category).clear();
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.category(*c).is_empty())
    }

    pub fn total(&self, category: Category) -> u64 {
        self.category(category)
            .values()
            .fold(0u64, |acc, n| acc.saturating_add(*n))
    }
}

/// Merges `current` on top of a copy of `session`, summing matching keys.
///
/// Neither input is touched; keys present in only one side carry over as-is.
pub fn merge(session: &CounterStore, current: &CounterStore) -> CounterStore {
    let mut combined = session.clone();
    for category in Category::ALL {
        let out = combined.category_mut(category);
        for (key, value) in current.category(category) {
            let base = session.category(category).get(key).copied().unwrap_or(0);
            out.insert(key.clone(), base.saturating_add(*value));
        }
    }
    combined
}

fn positive_counts<'de, D>(deserializer: D) -> Result<Counts, D::Error>
where
    D: Deserializer<'de>,
{
    let counts = Counts::deserialize(deserializer)?;
    if let Some((key, _)) = counts.iter().find(|(_, n)| **n == 0) {
        return Err(serde::de::Error::custom(format!(
            "count for {key:?} must be positive"
        )));
    }
    Ok(counts)
}
