//! Trending score and ranking pass.
//!
//! The score rewards engagement and decays with age:
//!
//! ```text
//! score = (likes * 1.5 + replies * 2 + views * 0.5) / (hours_age + 2)^1.8
//! ```
//!
//! Dislikes do not contribute. `hours_age` is floored at zero, so the
//! denominator is never below `2^1.8`.

use chrono::{DateTime, Duration, Utc};

/// Weight of a single like.
pub const LIKE_WEIGHT: f64 = 1.5;

/// Weight of a single reply.
pub const REPLY_WEIGHT: f64 = 2.0;

/// Weight of a single view.
pub const VIEW_WEIGHT: f64 = 0.5;

/// Hours added to the age before decay is applied.
pub const AGE_OFFSET_HOURS: f64 = 2.0;

/// Decay exponent.
pub const GRAVITY: f64 = 1.8;

/// Engagement counters feeding the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u64,
    pub replies: u64,
    pub views: u64,
}

impl Engagement {
    fn weighted(self) -> f64 {
        (self.likes as f64).mul_add(
            LIKE_WEIGHT,
            (self.replies as f64).mul_add(REPLY_WEIGHT, self.views as f64 * VIEW_WEIGHT),
        )
    }
}

/// Score for the given engagement at the given age in hours.
///
/// Negative or NaN ages count as zero.
#[must_use]
pub fn score(engagement: Engagement, hours_age: f64) -> f64 {
    let hours_age = if hours_age > 0.0 { hours_age } else { 0.0 };
    engagement.weighted() / (hours_age + AGE_OFFSET_HOURS).powf(GRAVITY)
}

/// Fractional hours elapsed between `created_at` and `now`, floored at zero.
#[must_use]
pub fn hours_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - created_at).num_milliseconds().max(0);
    elapsed as f64 / 3_600_000.0
}

/// Score for an item created at `created_at`, evaluated at `now`.
#[must_use]
pub fn score_at(engagement: Engagement, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    score(engagement, hours_since(created_at, now))
}

/// Result of ranking one entry of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    /// Freshly computed score.
    pub score: f64,
    /// 1-based position within the page.
    pub rank: i32,
}

/// Score every entry of a page and number them by page position.
///
/// The order of the input is kept; entries are not re-sorted by their new
/// scores. Ranks are page-relative: the first entry of every page is rank 1.
pub fn rank_page<I>(entries: I, now: DateTime<Utc>) -> Vec<Ranked>
where
    I: IntoIterator<Item = (Engagement, DateTime<Utc>)>,
{
    entries
        .into_iter()
        .zip(1..)
        .map(|((engagement, created_at), rank)| Ranked {
            score: score_at(engagement, created_at, now),
            rank,
        })
        .collect()
}

/// Creation-time window for the trending feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// Last 24 hours.
    #[default]
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl TimeRange {
    /// Parse `24h`, `7d` or `30d`. Anything else means the last 24 hours.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "7d" => Self::Week,
            "30d" => Self::Month,
            _ => Self::Day,
        }
    }

    /// Length of the window.
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    /// Earliest creation time inside the window ending at `now`.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}
