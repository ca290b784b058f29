//! Stat card aggregates and display formatting.
//!
//! Aggregates are recomputed from the (small) filtered collections on every
//! request; nothing is cached.

use crate::activity::ActivityBucket;
use crate::records::{
    CallLog, Person, Priority, Status, Ticket, Tier, Withdrawal, WithdrawalStatus,
};
use chrono::{DateTime, Utc};

/// Totals shown on a person section's stat cards
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonSummary {
    pub count: usize,
    pub active: usize,
    pub active_now: usize,
    pub premium: usize,
    pub unrecognized_activity: usize,
    pub wallet_balance: f64,
    pub total_earnings: f64,
    pub total_losses: f64,
    pub games_played: u64,
    pub wins: u64,
}

impl PersonSummary {
    pub fn from_people<'a, I>(people: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let mut summary = Self::default();
        for p in people {
            let activity = p.activity(now);
            summary.count += 1;
            if p.status == Status::Active {
                summary.active += 1;
            }
            if activity.is_active_now {
                summary.active_now += 1;
            }
            if activity.bucket == ActivityBucket::Unrecognized {
                summary.unrecognized_activity += 1;
            }
            if p.tier == Tier::Premium {
                summary.premium += 1;
            }
            summary.wallet_balance += p.wallet_balance;
            summary.total_earnings += p.total_earnings;
            summary.total_losses += p.total_losses;
            summary.games_played += u64::from(p.games_played);
            summary.wins += u64::from(p.wins);
        }
        summary
    }

    /// `wins / games_played * 100`, one decimal; 0 when nothing was played
    pub fn win_rate(&self) -> f64 {
        percentage(self.wins as f64, self.games_played as f64)
    }

    /// Data files may carry more wins than games; losses floor at zero
    pub fn loss_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let losses = self.games_played.saturating_sub(self.wins);
        percentage(losses as f64, self.games_played as f64)
    }

    pub fn average_wallet(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.wallet_balance / self.count as f64
        }
    }

    pub fn premium_share(&self) -> f64 {
        percentage(self.premium as f64, self.count as f64)
    }
}

/// Totals for the wallet section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WithdrawalSummary {
    pub pending_count: usize,
    pub pending_amount: f64,
    pub approved_amount: f64,
    pub rejected_count: usize,
}

impl WithdrawalSummary {
    pub fn from_withdrawals<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Withdrawal>,
    {
        let mut summary = Self::default();
        for w in items {
            match w.status {
                WithdrawalStatus::Pending => {
                    summary.pending_count += 1;
                    summary.pending_amount += w.amount;
                }
                WithdrawalStatus::Approved => summary.approved_amount += w.amount,
                WithdrawalStatus::Rejected => summary.rejected_count += 1,
            }
        }
        summary
    }
}

/// Totals for the support section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketSummary {
    pub total: usize,
    pub open: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TicketSummary {
    pub fn from_tickets<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Ticket>,
    {
        let mut summary = Self::default();
        for t in items {
            summary.total += 1;
            if t.status.is_open() {
                summary.open += 1;
            }
            match t.priority {
                Priority::High => summary.high += 1,
                Priority::Medium => summary.medium += 1,
                Priority::Low => summary.low += 1,
            }
        }
        summary
    }
}

/// Totals for the tip-call section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSummary {
    pub calls: usize,
    pub total_secs: u64,
    pub total_tips: f64,
}

impl CallSummary {
    pub fn from_calls<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a CallLog>,
    {
        let mut summary = Self::default();
        for c in items {
            summary.calls += 1;
            summary.total_secs += u64::from(c.duration_secs);
            summary.total_tips += c.tip_amount;
        }
        summary
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_secs / 60
    }

    pub fn average_tip(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_tips / self.calls as f64
        }
    }
}

/// `part / whole * 100` rounded to one decimal; 0 when `whole` is 0
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole * 1000.0).round() / 10.0
}

/// Insert thousands separators into a run of ASCII digits
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a count with thousands separators
pub fn format_count(n: u64) -> String {
    group_digits(&n.to_string())
}

/// Format a money amount as glyph + separators + two decimals, e.g. `$12,345.60`
pub fn format_amount(value: f64, glyph: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, glyph, group_digits(whole), frac)
}

/// Format a percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format a call duration in seconds as `m:ss` or `h:mm:ss`
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Dataset};

    #[test]
    fn test_person_summary() {
        let users = fixtures::total_users();
        let summary = PersonSummary::from_people(&users, Utc::now());
        assert_eq!(summary.count, 5);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.active_now, 3);
        assert_eq!(summary.premium, 2);
        assert_eq!(summary.games_played, 137);
        assert_eq!(summary.wins, 72);
        assert!((summary.wallet_balance - 2430.75).abs() < 1e-9);
        // 72 / 137 = 52.55%
        assert_eq!(summary.win_rate(), 52.6);
        assert_eq!(summary.loss_rate(), 47.4);
        assert_eq!(summary.premium_share(), 40.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PersonSummary::from_people(&[], Utc::now());
        assert_eq!(summary.win_rate(), 0.0);
        assert_eq!(summary.loss_rate(), 0.0);
        assert_eq!(summary.average_wallet(), 0.0);
    }

    #[test]
    fn test_more_wins_than_games() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"people":[{"id":1,"name":"Odd","email":"o@x.io","gamesPlayed":3,"wins":5}]}"#,
        )
        .unwrap();
        let data = Dataset::load_from(&path).unwrap();

        let summary = PersonSummary::from_people(&data.people, Utc::now());
        assert_eq!(summary.loss_rate(), 0.0);
        assert_eq!(summary.win_rate(), 166.7);
    }

    #[test]
    fn test_wallet_ticket_call_summaries() {
        let data = Dataset::builtin();

        let w = WithdrawalSummary::from_withdrawals(&data.withdrawals);
        assert_eq!(w.pending_count, 2);
        assert_eq!(w.pending_amount, 3700.0);
        assert_eq!(w.approved_amount, 300.0);
        assert_eq!(w.rejected_count, 1);

        let t = TicketSummary::from_tickets(&data.tickets);
        assert_eq!(t.total, 4);
        assert_eq!(t.open, 3);
        assert_eq!(t.high, 2);

        let c = CallSummary::from_calls(&data.calls);
        assert_eq!(c.calls, 3);
        assert_eq!(c.total_minutes(), 38);
        assert_eq!(c.average_tip(), 25.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(2.0, 3.0), 66.7);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12345.6, "$"), "$12,345.60");
        assert_eq!(format_amount(0.0, "$"), "$0.00");
        assert_eq!(format_amount(999.999, "₦"), "₦1,000.00");
        assert_eq!(format_amount(-5.0, "$"), "-$5.00");
        assert_eq!(format_amount(1234567.0, "€"), "€1,234,567.00");
    }

    #[test]
    fn test_format_count_and_duration() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12345678), "12,345,678");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3725), "1:02:05");
        assert_eq!(format_percent(52.6), "52.6%");
    }
}
