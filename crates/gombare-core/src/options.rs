use std::fmt;

/// Controls the order of the fragments collected from an array of objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Aggregation {
    /// Fragments are sorted before joining, so keys ignore element order (default).
    #[default]
    Sorted,
    /// Fragments keep document order, so keys are positional.
    Document,
}

/// Configuration knobs passed to the key builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyOptions {
    aggregation: Aggregation,
    verify_unique: bool,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self { aggregation: Aggregation::Sorted, verify_unique: true }
    }
}

impl KeyOptions {
    /// Returns how array fragments are ordered.
    ///
    /// ```
    /// # use gombare_core::{Aggregation, KeyOptions};
    /// assert_eq!(KeyOptions::default().aggregation(), Aggregation::Sorted);
    /// ```
    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Returns whether sibling keys must be unique.
    #[must_use]
    pub fn verify_unique(&self) -> bool {
        self.verify_unique
    }

    /// Sets the fragment ordering of array aggregation.
    ///
    /// ```
    /// # use gombare_core::{Aggregation, KeyOptions};
    /// let opts = KeyOptions::default().with_aggregation(Aggregation::Document);
    /// assert_eq!(opts.aggregation(), Aggregation::Document);
    /// ```
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Enables or disables the uniqueness check over sibling keys.
    ///
    /// ```
    /// # use gombare_core::KeyOptions;
    /// let opts = KeyOptions::default().with_verify_unique(false);
    /// assert!(!opts.verify_unique());
    /// ```
    #[must_use]
    pub fn with_verify_unique(mut self, verify_unique: bool) -> Self {
        self.verify_unique = verify_unique;
        self
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sorted => f.write_str("sorted"),
            Aggregation::Document => f.write_str("document"),
        }
    }
}
