//! How many recommendations each ordering channel shows.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use sidekick_core::{Channel, RECOMMENDATION_SLOTS};

/// Recommendation counts per channel.
///
/// The website has room for a longer carousel; app and kiosk screens show
/// the standard three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfiles {
    /// Slots shown in the mobile app.
    pub digital: usize,
    /// Slots shown on in-store kiosks.
    pub kiosk: usize,
    /// Slots shown on the website.
    pub website: usize,
}

impl PlatformProfiles {
    /// Number of recommendations shown on `channel`.
    #[must_use]
    pub const fn count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Digital => self.digital,
            Channel::Kiosk => self.kiosk,
            Channel::Website => self.website,
        }
    }
}

impl Default for PlatformProfiles {
    fn default() -> Self {
        Self {
            digital: RECOMMENDATION_SLOTS,
            kiosk: RECOMMENDATION_SLOTS,
            website: 5,
        }
    }
}
