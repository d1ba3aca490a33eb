//! Hand-curated complementarity between menu categories.
//!
//! The map answers "what goes with this?" at the category level: wings call
//! for sides and drinks, combos for drinks and desserts. It is configuration,
//! not something learned from orders, and is never mutated while scoring.

use std::collections::HashMap;

use crate::Category;

/// Declarative mapping from a category to its preferred complements.
///
/// # Examples
/// ```
/// use sidekick_core::{Category, ComplementMap};
///
/// let map = ComplementMap::default();
/// assert!(map.complements(Category::Wings, Category::Drinks));
/// assert!(!map.complements(Category::Drinks, Category::Fries));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplementMap {
    map: HashMap<Category, Vec<Category>>,
}

impl ComplementMap {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Append a complement for `category`, ignoring duplicates and
    /// [`Category::Uncategorized`] on either side.
    pub fn insert(&mut self, category: Category, complement: Category) {
        if category == Category::Uncategorized || complement == Category::Uncategorized {
            return;
        }
        let entry = self.map.entry(category).or_default();
        if !entry.contains(&complement) {
            entry.push(complement);
        }
    }

    /// Add complements while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_complements<I>(mut self, category: Category, complements: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        for complement in complements {
            self.insert(category, complement);
        }
        self
    }

    /// Preferred complements for `category`, best first.
    #[must_use]
    pub fn preferred(&self, category: Category) -> &[Category] {
        self.map.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Report whether `candidate` complements `present`.
    #[must_use]
    pub fn complements(&self, present: Category, candidate: Category) -> bool {
        self.preferred(present).contains(&candidate)
    }

    /// Report whether `candidate` complements any of the `present`
    /// categories.
    pub fn complements_any<'a, I>(&self, present: I, candidate: Category) -> bool
    where
        I: IntoIterator<Item = &'a Category>,
    {
        present
            .into_iter()
            .any(|category| self.complements(*category, candidate))
    }
}

impl Default for ComplementMap {
    fn default() -> Self {
        use Category::{Chicken, Combos, Desserts, DipsSauces, Drinks, Fries, Sides, Subs, Wings};

        Self::new()
            .with_complements(Wings, [Sides, Fries, Drinks, DipsSauces])
            .with_complements(Chicken, [Fries, Sides, Drinks, DipsSauces])
            .with_complements(Fries, [Wings, Chicken, Drinks, DipsSauces])
            .with_complements(Sides, [Wings, Chicken, Drinks])
            .with_complements(DipsSauces, [Wings, Chicken, Fries])
            .with_complements(Drinks, [Wings, Sides, Desserts])
            .with_complements(Combos, [Drinks, Desserts, DipsSauces])
            .with_complements(Subs, [Fries, Drinks])
            .with_complements(Desserts, [Drinks])
    }
}
