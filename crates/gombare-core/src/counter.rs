use std::collections::HashMap;
use std::marker::PhantomData;

use crate::Object;

/// Occurrence counters for repeated keys, one set per container object.
///
/// Containers are identified by address. The `'doc` borrow keeps every
/// counted container alive and unmoved for as long as the counter exists.
#[derive(Debug, Default)]
pub struct IncrementCounter<'doc> {
    counts: HashMap<(usize, String), usize>,
    _document: PhantomData<&'doc Object>,
}

impl<'doc> IncrementCounter<'doc> {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more occurrence of `key` in `container` and returns the
    /// suffixed key `<key>#<count>`.
    ///
    /// ```
    /// # use gombare_core::{IncrementCounter, Object};
    /// let container = Object::new();
    /// let mut counter = IncrementCounter::new();
    /// assert_eq!(counter.next(&container, "X"), "X#1");
    /// assert_eq!(counter.next(&container, "X"), "X#2");
    /// assert_eq!(counter.next(&container, "Y"), "Y#1");
    /// ```
    pub fn next(&mut self, container: &'doc Object, key: &str) -> String {
        let identity = container as *const Object as usize;
        let count = self.counts.entry((identity, key.to_string())).or_insert(0);
        *count += 1;
        format!("{key}#{count}")
    }

    /// Number of distinct (container, key) pairs seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was counted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
