//! Customer-facing recommender combining personas, fusion and freshness.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{Datelike, Month, NaiveDateTime, TimeDelta};
use log::debug;
use sidekick_core::{
    CustomerDirectory, PartialOrderQuery, Persona, Recommendation, RecommendationHistory,
    Recommender,
};

use crate::{
    FreshnessContext, FreshnessPolicy, FusionError, FusionRecommender, PersonaWeights,
    PlatformProfiles, SeasonalCalendar,
};

/// Registered customers with at least this many orders count as loyal.
pub const DEFAULT_LOYAL_ORDER_THRESHOLD: u32 = 10;

/// Configuration layered on top of score fusion for live requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionConfig {
    /// Fusion weights per persona.
    pub persona_weights: PersonaWeights,
    /// Freshness filter and injection settings.
    pub freshness: FreshnessPolicy,
    /// Recommendation count per channel.
    pub platforms: PlatformProfiles,
    /// Seasonal promotions.
    pub seasonal: SeasonalCalendar,
    /// Order count at which registered customers become loyal.
    pub loyal_order_threshold: u32,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            persona_weights: PersonaWeights::default(),
            freshness: FreshnessPolicy::default(),
            platforms: PlatformProfiles::default(),
            seasonal: SeasonalCalendar::default(),
            loyal_order_threshold: DEFAULT_LOYAL_ORDER_THRESHOLD,
        }
    }
}

impl ProductionConfig {
    /// Check every weight set and the freshness policy.
    ///
    /// # Errors
    /// Returns the first [`FusionError`] found.
    pub fn validate(&self) -> Result<(), FusionError> {
        self.persona_weights.validate()?;
        self.freshness.validate()
    }
}

/// Recommender used when serving customers.
///
/// Each request picks fusion weights from the customer's persona, ranks the
/// candidates, demotes what the customer saw recently, injects trending and
/// seasonal items, and sizes the list for the store's channel. Trending and
/// seasonal lists are computed once for the reference time `as_of`.
#[derive(Debug, Clone)]
pub struct ProductionRecommender {
    fusion: FusionRecommender,
    config: ProductionConfig,
    directory: CustomerDirectory,
    as_of: NaiveDateTime,
    trending: Vec<usize>,
    seasonal: Vec<usize>,
}

impl ProductionRecommender {
    /// Prepare a recommender serving requests at `as_of`.
    ///
    /// # Errors
    /// Returns [`FusionError`] when `config` fails validation.
    pub fn new(
        fusion: FusionRecommender,
        config: ProductionConfig,
        directory: CustomerDirectory,
        as_of: NaiveDateTime,
    ) -> Result<Self, FusionError> {
        config.validate()?;
        let catalog = &fusion.tables().catalog;
        let trending = fusion
            .tables()
            .timeline
            .trending(as_of, config.freshness.trending_window);
        let seasonal = month_of(as_of)
            .map(|month| config.seasonal.resolve(month, catalog))
            .unwrap_or_default();
        debug!(
            "production recommender at {as_of}: {} trending, {} seasonal items",
            trending.len(),
            seasonal.len()
        );
        Ok(Self {
            fusion,
            config,
            directory,
            as_of,
            trending,
            seasonal,
        })
    }

    /// Reference time used for history windows and recording.
    #[must_use]
    pub const fn as_of(&self) -> NaiveDateTime {
        self.as_of
    }

    /// Persona of the customer placing `query`.
    #[must_use]
    pub fn persona(&self, query: &PartialOrderQuery) -> Persona {
        self.directory
            .customer(query.customer.as_ref())
            .persona(self.config.loyal_order_threshold)
    }

    /// Number of recommendations the store's channel shows.
    #[must_use]
    pub fn slots(&self, query: &PartialOrderQuery) -> usize {
        self.config
            .platforms
            .count(self.directory.channel(query.store.as_ref()))
    }

    /// Recommend for `query` given what the customer was already shown.
    #[must_use]
    pub fn recommend_with_history(
        &self,
        query: &PartialOrderQuery,
        history: &RecommendationHistory,
    ) -> Recommendation {
        self.recommend_for(query, history, self.slots(query))
    }

    /// Recommend for `query` and record the delivered items in `history`.
    ///
    /// Anonymous queries are answered but leave no history.
    pub fn deliver(
        &self,
        query: &PartialOrderQuery,
        history: &mut RecommendationHistory,
    ) -> Recommendation {
        let recommendation = self.recommend_with_history(query, history);
        if let Some(customer) = query.customer.as_ref() {
            history.record(customer, recommendation.names().cloned(), self.as_of);
        }
        recommendation
    }

    fn recommend_for(
        &self,
        query: &PartialOrderQuery,
        history: &RecommendationHistory,
        count: usize,
    ) -> Recommendation {
        let persona = self.persona(query);
        let weights = self.config.persona_weights.weights_for(persona);
        let ranked = self.fusion.rank_query(query, &weights);
        let recent = self.recent_positions(query, history);
        let context = FreshnessContext {
            known: &ranked.known,
            recent: &recent,
            trending: &self.trending,
            seasonal: &self.seasonal,
        };
        let items = self
            .config
            .freshness
            .select(&ranked.candidates, &context, count)
            .into_iter()
            .filter_map(|pick| self.fusion.to_item(pick.index, pick.score, pick.kind))
            .collect();
        debug!(
            "query {} as {persona}: {} recently shown items",
            query.id,
            recent.len()
        );
        let recommendation = Recommendation::new(query.id.clone(), items);
        if ranked.flagged {
            recommendation.flagged()
        } else {
            recommendation
        }
    }

    fn recent_positions(
        &self,
        query: &PartialOrderQuery,
        history: &RecommendationHistory,
    ) -> BTreeMap<usize, TimeDelta> {
        let Some(customer) = query.customer.as_ref() else {
            return BTreeMap::new();
        };
        let catalog = &self.fusion.tables().catalog;
        let mut recent: BTreeMap<usize, TimeDelta> = BTreeMap::new();
        for entry in history.recent(customer, self.as_of, self.config.freshness.window) {
            let Some(position) = catalog.position(&entry.item) else {
                continue;
            };
            let age = self.as_of - entry.recommended_at;
            recent
                .entry(position)
                .and_modify(|shown| *shown = (*shown).min(age))
                .or_insert(age);
        }
        recent
    }
}

impl Recommender for ProductionRecommender {
    fn recommend(&self, query: &PartialOrderQuery, count: usize) -> Recommendation {
        self.recommend_for(query, &RecommendationHistory::default(), count)
    }
}

fn month_of(at: NaiveDateTime) -> Option<Month> {
    u8::try_from(at.month())
        .ok()
        .and_then(|number| Month::try_from(number).ok())
}
