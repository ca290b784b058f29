//! Activity recency classification.
//!
//! Every table and filter asks the same three questions about a person's last
//! activity: are they "active now", what label to show, and which coarse
//! bucket they fall in. All three are answered here from a parsed [`Recency`].
//!
//! Recency comes from one of two sources:
//! - a legacy free-text phrase such as `"25 minutes ago"` ([`Recency::parse`])
//! - a real elapsed duration ([`Recency::from_elapsed`])

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s+(minute|hour|day|week|month)(s?)\s+ago\s*$")
        .expect("recency phrase regex must compile")
});

/// Longest "minutes ago" that still counts as active now
const ACTIVE_NOW_MINUTES: u32 = 30;
/// Longest "hours ago" (plural) that still counts as active now
const ACTIVE_NOW_HOURS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Unit {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    fn short(&self) -> &'static str {
        match self {
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "mo",
        }
    }
}

/// A parsed "N unit(s) ago" value.
///
/// `plural` records the wording, not the amount: the classifier treats
/// "1 hour ago" and "1 hours ago" differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recency {
    pub amount: u32,
    pub unit: Unit,
    pub plural: bool,
}

impl Recency {
    pub fn new(amount: u32, unit: Unit) -> Self {
        Self {
            amount,
            unit,
            plural: amount != 1,
        }
    }

    /// Parse a free-text phrase. Returns None for anything that is not
    /// `<N> <unit>[s] ago`.
    pub fn parse(phrase: &str) -> Option<Self> {
        let caps = PHRASE_RE.captures(phrase)?;
        let amount = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let unit = Unit::from_str(caps.get(2)?.as_str())?;
        let plural = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        Some(Self {
            amount,
            unit,
            plural,
        })
    }

    /// Render an elapsed duration in the unit a table would show.
    /// Negative durations (clock skew) count as one minute.
    pub fn from_elapsed(elapsed: Duration) -> Self {
        let minutes = elapsed.num_minutes().max(1);
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();

        if minutes < 60 {
            Self::new(minutes as u32, Unit::Minute)
        } else if hours < 24 {
            Self::new(hours as u32, Unit::Hour)
        } else if days < 14 {
            Self::new(days as u32, Unit::Day)
        } else if days < 60 {
            Self::new((days / 7) as u32, Unit::Week)
        } else {
            Self::new(u32::try_from(days / 30).unwrap_or(u32::MAX), Unit::Month)
        }
    }

    /// Whether this counts as "active now".
    ///
    /// The singular "hour ago" wording is always active regardless of its
    /// amount, while plural hours must be within [`ACTIVE_NOW_HOURS`].
    /// Fixture data only ever says "1 hour ago", so the two agree in practice.
    pub fn is_active_now(&self) -> bool {
        match (self.unit, self.plural) {
            (Unit::Minute, _) => self.amount <= ACTIVE_NOW_MINUTES,
            (Unit::Hour, false) => true,
            (Unit::Hour, true) => self.amount <= ACTIVE_NOW_HOURS,
            _ => false,
        }
    }

    pub fn bucket(&self) -> ActivityBucket {
        BUCKET_RULES
            .iter()
            .find(|rule| rule.matches(self))
            .map(|rule| rule.bucket)
            .unwrap_or(ActivityBucket::Inactive)
    }
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.plural { "s" } else { "" };
        write!(f, "{} {}{} ago", self.amount, self.unit.as_str(), suffix)
    }
}

/// Coarse recency classification used by the "last active" filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityBucket {
    Now,
    Last24h,
    Last7d,
    Last30d,
    Inactive,
    /// The recency phrase could not be parsed
    Unrecognized,
}

impl ActivityBucket {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "now" => Some(Self::Now),
            "24h" => Some(Self::Last24h),
            "7d" => Some(Self::Last7d),
            "30d" => Some(Self::Last30d),
            "inactive" => Some(Self::Inactive),
            "unrecognized" => Some(Self::Unrecognized),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Last24h => "24h",
            Self::Last7d => "7d",
            Self::Last30d => "30d",
            Self::Inactive => "inactive",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Whether a record in this bucket passes a filter on `selected`.
    /// Selecting `inactive` also admits unparseable recency.
    pub fn satisfies(&self, selected: ActivityBucket) -> bool {
        *self == selected
            || (selected == ActivityBucket::Inactive && *self == ActivityBucket::Unrecognized)
    }
}

/// One (predicate, bucket) pair. `plural: None` accepts either wording and
/// `max: None` accepts any amount.
struct BucketRule {
    unit: Unit,
    plural: Option<bool>,
    max: Option<u32>,
    bucket: ActivityBucket,
}

impl BucketRule {
    fn matches(&self, recency: &Recency) -> bool {
        self.unit == recency.unit
            && self.plural.is_none_or(|p| p == recency.plural)
            && self.max.is_none_or(|max| recency.amount <= max)
    }
}

const fn rule(
    unit: Unit,
    plural: Option<bool>,
    max: Option<u32>,
    bucket: ActivityBucket,
) -> BucketRule {
    BucketRule {
        unit,
        plural,
        max,
        bucket,
    }
}

/// Evaluated top to bottom, first match wins, default [`ActivityBucket::Inactive`]
const BUCKET_RULES: &[BucketRule] = &[
    rule(Unit::Minute, None, None, ActivityBucket::Now),
    rule(Unit::Hour, Some(false), None, ActivityBucket::Now),
    rule(Unit::Hour, Some(true), Some(2), ActivityBucket::Now),
    rule(Unit::Hour, Some(true), Some(24), ActivityBucket::Last24h),
    rule(Unit::Day, Some(false), None, ActivityBucket::Last24h),
    rule(Unit::Day, Some(true), Some(7), ActivityBucket::Last7d),
    rule(Unit::Day, Some(true), Some(30), ActivityBucket::Last30d),
    rule(Unit::Week, Some(false), None, ActivityBucket::Last30d),
    rule(Unit::Week, Some(true), Some(4), ActivityBucket::Last30d),
];

/// Everything a table needs to render and filter one person's recency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub is_active_now: bool,
    pub bucket: ActivityBucket,
    pub label: String,
}

impl Activity {
    fn from_recency(recency: Recency, original: &str) -> Self {
        Self {
            is_active_now: recency.is_active_now(),
            bucket: recency.bucket(),
            label: online_label(&recency).unwrap_or_else(|| original.to_string()),
        }
    }
}

fn online_label(recency: &Recency) -> Option<String> {
    if !recency.is_active_now() {
        return None;
    }
    if recency.unit == Unit::Hour && !recency.plural {
        return Some("Online since 1h".to_string());
    }
    Some(format!(
        "Online since {}{}",
        recency.amount,
        recency.unit.short()
    ))
}

/// Classify a free-text recency phrase
pub fn classify_activity(last_active: &str) -> Activity {
    match Recency::parse(last_active) {
        Some(recency) => Activity::from_recency(recency, last_active),
        None => Activity {
            is_active_now: false,
            bucket: ActivityBucket::Unrecognized,
            label: last_active.to_string(),
        },
    }
}

/// Classify a real elapsed duration (`now - last_seen`).
///
/// Label and "active now" follow the rendered phrase, but the bucket is
/// measured on the elapsed time itself: the rendering rounds down, so 30h
/// reads "1 day ago" and 34 days reads "4 weeks ago".
pub fn classify_elapsed(elapsed: Duration) -> Activity {
    let recency = Recency::from_elapsed(elapsed);
    Activity {
        bucket: elapsed_bucket(elapsed),
        ..Activity::from_recency(recency, &recency.to_string())
    }
}

fn elapsed_bucket(elapsed: Duration) -> ActivityBucket {
    if elapsed.num_hours() <= i64::from(ACTIVE_NOW_HOURS) {
        ActivityBucket::Now
    } else if elapsed <= Duration::hours(24) {
        ActivityBucket::Last24h
    } else if elapsed <= Duration::days(7) {
        ActivityBucket::Last7d
    } else if elapsed <= Duration::days(30) {
        ActivityBucket::Last30d
    } else {
        ActivityBucket::Inactive
    }
}

/// Phrase-only shortcuts, used by `/classify`. Tables go through `Person::activity`.
pub fn is_active_now(last_active: &str) -> bool {
    classify_activity(last_active).is_active_now
}

pub fn online_since_label(last_active: &str) -> String {
    classify_activity(last_active).label
}

pub fn activity_bucket(last_active: &str) -> ActivityBucket {
    classify_activity(last_active).bucket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phrases() {
        let r = Recency::parse("25 minutes ago").unwrap();
        assert_eq!(r.amount, 25);
        assert_eq!(r.unit, Unit::Minute);
        assert!(r.plural);

        let r = Recency::parse("  1 Hour ago ").unwrap();
        assert_eq!(r.unit, Unit::Hour);
        assert!(!r.plural);

        assert!(Recency::parse("yesterday").is_none());
        assert!(Recency::parse("ago 3 days").is_none());
        assert!(Recency::parse("").is_none());
    }

    #[test]
    fn test_active_now_minutes() {
        assert!(is_active_now("25 minutes ago"));
        assert!(is_active_now("30 minutes ago"));
        assert!(!is_active_now("45 minutes ago"));
    }

    #[test]
    fn test_active_now_hours() {
        assert!(is_active_now("1 hour ago"));
        assert!(is_active_now("2 hours ago"));
        assert!(!is_active_now("3 hours ago"));
        assert!(!is_active_now("1 day ago"));
        assert!(!is_active_now("not a phrase"));
    }

    #[test]
    fn test_singular_hour_is_always_active() {
        // Wording decides, not magnitude.
        assert!(is_active_now("5 hour ago"));
        assert_eq!(online_since_label("5 hour ago"), "Online since 1h");
    }

    #[test]
    fn test_buckets() {
        assert_eq!(activity_bucket("10 minutes ago"), ActivityBucket::Now);
        assert_eq!(activity_bucket("2 hours ago"), ActivityBucket::Now);
        assert_eq!(activity_bucket("5 hours ago"), ActivityBucket::Last24h);
        assert_eq!(activity_bucket("1 day ago"), ActivityBucket::Last24h);
        assert_eq!(activity_bucket("5 days ago"), ActivityBucket::Last7d);
        assert_eq!(activity_bucket("20 days ago"), ActivityBucket::Last30d);
        assert_eq!(activity_bucket("1 week ago"), ActivityBucket::Last30d);
        assert_eq!(activity_bucket("3 weeks ago"), ActivityBucket::Last30d);
        assert_eq!(activity_bucket("6 weeks ago"), ActivityBucket::Inactive);
        assert_eq!(activity_bucket("40 days ago"), ActivityBucket::Inactive);
        assert_eq!(activity_bucket("2 months ago"), ActivityBucket::Inactive);
    }

    #[test]
    fn test_unrecognized_is_explicit() {
        assert_eq!(activity_bucket("last tuesday"), ActivityBucket::Unrecognized);
        assert!(ActivityBucket::Unrecognized.satisfies(ActivityBucket::Inactive));
        assert!(!ActivityBucket::Inactive.satisfies(ActivityBucket::Unrecognized));
        assert!(!ActivityBucket::Last7d.satisfies(ActivityBucket::Inactive));
    }

    #[test]
    fn test_online_since_label() {
        assert_eq!(online_since_label("10 minutes ago"), "Online since 10m");
        assert_eq!(online_since_label("1 hour ago"), "Online since 1h");
        assert_eq!(online_since_label("2 hours ago"), "Online since 2h");
        assert_eq!(online_since_label("3 days ago"), "3 days ago");
        assert_eq!(online_since_label("45 minutes ago"), "45 minutes ago");
        assert_eq!(online_since_label("whenever"), "whenever");
    }

    #[test]
    fn test_from_elapsed_units() {
        assert_eq!(
            Recency::from_elapsed(Duration::seconds(20)),
            Recency::new(1, Unit::Minute)
        );
        assert_eq!(
            Recency::from_elapsed(Duration::minutes(-5)),
            Recency::new(1, Unit::Minute)
        );
        assert_eq!(
            Recency::from_elapsed(Duration::minutes(90)),
            Recency::new(1, Unit::Hour)
        );
        assert_eq!(
            Recency::from_elapsed(Duration::days(20)),
            Recency::new(2, Unit::Week)
        );
        assert_eq!(
            Recency::from_elapsed(Duration::days(90)),
            Recency::new(3, Unit::Month)
        );
        assert_eq!(
            Recency::from_elapsed(Duration::hours(3)).to_string(),
            "3 hours ago"
        );
    }

    #[test]
    fn test_elapsed_agrees_with_phrases() {
        let cases = [
            (Duration::minutes(25), ActivityBucket::Now, true),
            (Duration::minutes(45), ActivityBucket::Now, false),
            (Duration::minutes(150), ActivityBucket::Now, true),
            (Duration::hours(3), ActivityBucket::Last24h, false),
            (Duration::hours(24), ActivityBucket::Last24h, false),
            (Duration::days(5), ActivityBucket::Last7d, false),
            (Duration::days(10), ActivityBucket::Last30d, false),
            (Duration::days(28), ActivityBucket::Last30d, false),
            (Duration::days(42), ActivityBucket::Inactive, false),
        ];
        for (elapsed, bucket, active) in cases {
            let activity = classify_elapsed(elapsed);
            assert_eq!(activity.bucket, bucket, "elapsed {:?}", elapsed);
            assert_eq!(activity.is_active_now, active, "elapsed {:?}", elapsed);

            let phrase = Recency::from_elapsed(elapsed).to_string();
            assert_eq!(classify_activity(&phrase), activity);
        }
    }

    #[test]
    fn test_elapsed_bucket_uses_real_time() {
        let cases = [
            (Duration::hours(30), "1 day ago", ActivityBucket::Last7d),
            (Duration::days(7), "7 days ago", ActivityBucket::Last7d),
            (Duration::hours(7 * 24 + 1), "7 days ago", ActivityBucket::Last30d),
            (Duration::days(30), "4 weeks ago", ActivityBucket::Last30d),
            (Duration::days(34), "4 weeks ago", ActivityBucket::Inactive),
        ];
        for (elapsed, label, bucket) in cases {
            let activity = classify_elapsed(elapsed);
            assert_eq!(activity.label, label, "elapsed {:?}", elapsed);
            assert_eq!(activity.bucket, bucket, "elapsed {:?}", elapsed);
            assert!(!activity.is_active_now);
        }
    }

    #[test]
    fn test_elapsed_label() {
        assert_eq!(
            classify_elapsed(Duration::minutes(12)).label,
            "Online since 12m"
        );
        assert_eq!(classify_elapsed(Duration::days(3)).label, "3 days ago");
    }
}
