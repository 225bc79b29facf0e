use serde::{Deserialize, Serialize};

/// Raw signals a platform adapter extracts from a post before scoring.
/// Missing counts are treated as zero; scoring never fails.
#[derive(Debug, Clone, Default)]
pub struct PostSignals {
    pub likes: u32,
    pub reposts: u32,
    pub replies: u32,
    pub verified: bool,
    pub has_profile_bio: bool,
    pub account_age_days: Option<i64>,
    pub text_chars: usize,
}

/// Per-factor breakdown of a credibility score. Factors are strictly
/// additive on top of the base score, never subtractive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredibilityFactors {
    pub engagement: u8,
    pub account_age: u8,
    pub verification: u8,
    pub content_quality: u8,
}

pub const BASE_SCORE: u8 = 50;

/// Heuristic 0-100 credibility rating for a social-media post.
///
/// Starts at a base of 50 and adds tiered bonuses for engagement, account
/// age, verification signals, and content length, clamped to 100. Low-signal
/// accounts float near the base rather than toward zero.
pub fn score(signals: &PostSignals) -> (u8, CredibilityFactors) {
    let total_engagement =
        signals.likes as u64 + signals.reposts as u64 + signals.replies as u64;

    let engagement: u8 = if total_engagement > 100 {
        25
    } else if total_engagement > 50 {
        15
    } else if total_engagement > 10 {
        10
    } else {
        5
    };

    let account_age: u8 = match signals.account_age_days {
        Some(days) if days > 365 => 10,
        Some(days) if days > 180 => 5,
        _ => 0,
    };

    let verification: u8 = if signals.verified {
        15
    } else if signals.has_profile_bio {
        10
    } else {
        0
    };

    // Substantial but not spammy.
    let content_quality: u8 = if (100..=1000).contains(&signals.text_chars) {
        10
    } else if (40..100).contains(&signals.text_chars) {
        5
    } else {
        0
    };

    let factors = CredibilityFactors {
        engagement,
        account_age,
        verification,
        content_quality,
    };

    let total = BASE_SCORE as u32
        + engagement as u32
        + account_age as u32
        + verification as u32
        + content_quality as u32;

    (total.min(100) as u8, factors)
}
