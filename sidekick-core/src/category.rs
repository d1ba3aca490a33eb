//! Menu categories and the keyword rules that assign them.
//!
//! The enum offers compile-time safety for complementarity lookups.
//!
//! # Examples
//! ```
//! use sidekick_core::Category;
//!
//! assert_eq!(Category::DipsSauces.as_str(), "dips_sauces");
//! assert_eq!(Category::Wings.to_string(), "wings");
//! ```

use crate::ItemName;

/// Broad menu category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    /// Bone-in and boneless wings.
    Wings,
    /// Tenders, strips and other chicken that is not wings.
    Chicken,
    /// Fries of every cut and seasoning.
    Fries,
    /// Corn, rings, salads and other sides.
    Sides,
    /// Dips and sauces.
    DipsSauces,
    /// Fountain and bottled drinks.
    Drinks,
    /// Bundled meals.
    Combos,
    /// Subs and sandwiches.
    Subs,
    /// Desserts and shakes.
    Desserts,
    /// Items no keyword rule recognised.
    Uncategorized,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Wings,
        Self::Chicken,
        Self::Fries,
        Self::Sides,
        Self::DipsSauces,
        Self::Drinks,
        Self::Combos,
        Self::Subs,
        Self::Desserts,
        Self::Uncategorized,
    ];

    /// Return the category as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use sidekick_core::Category;
    ///
    /// assert_eq!(Category::Drinks.as_str(), "drinks");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wings => "wings",
            Self::Chicken => "chicken",
            Self::Fries => "fries",
            Self::Sides => "sides",
            Self::DipsSauces => "dips_sauces",
            Self::Drinks => "drinks",
            Self::Combos => "combos",
            Self::Subs => "subs",
            Self::Desserts => "desserts",
            Self::Uncategorized => "uncategorized",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == folded)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Keyword rules mapping item names onto categories.
///
/// Names and keywords are split into lower-cased word tokens. A keyword
/// matches when its tokens appear consecutively in the name, each token
/// either equal to the keyword word, its plural (`wing` matches `wings`) or
/// a numeric size with the word as unit (`oz` matches `20oz`). Rules are
/// checked in insertion order and the first matching group wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<(Category, Vec<Keyword>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Keyword {
    words: Vec<String>,
}

impl Keyword {
    fn parse(raw: &str) -> Option<Self> {
        let words: Vec<String> = tokens(&raw.to_lowercase()).map(str::to_owned).collect();
        (!words.is_empty()).then_some(Self { words })
    }

    fn matches(&self, name: &[&str]) -> bool {
        name.windows(self.words.len()).any(|window| {
            window
                .iter()
                .zip(&self.words)
                .all(|(token, word)| token_matches(token, word))
        })
    }
}

fn tokens(folded: &str) -> impl Iterator<Item = &str> {
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

fn token_matches(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    let plural = ["s", "es"]
        .into_iter()
        .any(|suffix| token.strip_suffix(suffix) == Some(word));
    let sized = token.strip_suffix(word).is_some_and(|size| {
        !size.is_empty() && size.chars().all(|c| c.is_ascii_digit())
    });
    plural || sized
}

impl CategoryRules {
    /// Create an empty rule set that classifies everything as
    /// [`Category::Uncategorized`].
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a keyword group while consuming `self`, enabling chaining.
    ///
    /// Keywords without any word characters are ignored.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parsed = keywords
            .into_iter()
            .filter_map(|keyword| Keyword::parse(&Into::<String>::into(keyword)))
            .collect();
        self.rules.push((category, parsed));
        self
    }

    /// Classify an item by name.
    ///
    /// # Examples
    /// ```
    /// use sidekick_core::{Category, CategoryRules, ItemName};
    ///
    /// let rules = CategoryRules::default();
    /// let item = ItemName::new("Ranch Dip - Regular").unwrap();
    /// assert_eq!(rules.categorise(&item), Category::DipsSauces);
    /// ```
    #[must_use]
    pub fn categorise(&self, item: &ItemName) -> Category {
        let folded = item.folded();
        let name: Vec<&str> = tokens(&folded).collect();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| keyword.matches(&name)))
            .map_or(Category::Uncategorized, |(category, _)| *category)
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        // Combos and fries precede wings: "Wings Combo" is a combo and
        // "Buffalo Fries" are fries even though both carry a wings keyword.
        Self::empty()
            .with_keywords(Category::Combos, ["combo", "meal deal", "family pack"])
            .with_keywords(Category::Fries, ["fries", "fry"])
            .with_keywords(
                Category::Wings,
                ["wing", "buffalo", "grilled", "spicy", "mild", "honey bbq", "lemon pepper"],
            )
            .with_keywords(
                Category::Chicken,
                ["chicken", "strips", "tender", "crispy", "nugget"],
            )
            .with_keywords(
                Category::DipsSauces,
                ["dip", "sauce", "ranch", "blue cheese", "honey mustard"],
            )
            .with_keywords(
                Category::Sides,
                ["corn", "onion", "rings", "salad", "coleslaw", "bread", "veggie", "side"],
            )
            .with_keywords(
                Category::Drinks,
                ["drink", "soda", "cola", "sprite", "juice", "water", "iced tea", "lemonade", "oz"],
            )
            .with_keywords(Category::Subs, ["sub", "sandwich", "wrap"])
            .with_keywords(
                Category::Desserts,
                ["dessert", "cake", "brownie", "cookie", "shake", "pie"],
            )
    }
}
