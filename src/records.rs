//! Domain records shown in the admin console.
//!
//! Every record is loaded once (built-in fixtures or a JSON data file) and is
//! never mutated afterwards.

use crate::activity::{self, Activity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of account a person record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    #[default]
    User,
    Creator,
    Seller,
    Advertiser,
}

impl PersonKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" | "users" | "consumer" | "consumers" => Some(Self::User),
            "creator" | "creators" => Some(Self::Creator),
            "seller" | "sellers" => Some(Self::Seller),
            "advertiser" | "advertisers" => Some(Self::Advertiser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Creator => "creator",
            Self::Seller => "seller",
            Self::Advertiser => "advertiser",
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Suspended,
    Blocked,
    Pending,
}

impl Status {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            "blocked" => Some(Self::Blocked),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Suspended => "Suspended",
            Self::Blocked => "Blocked",
            Self::Pending => "Pending",
        }
    }
}

/// Subscription class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Tier {
    Premium,
    #[default]
    #[serde(rename = "Non-Premium", alias = "NonPremium")]
    NonPremium,
}

impl Tier {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "premium" => Some(Self::Premium),
            "non-premium" | "nonpremium" | "non_premium" | "free" => Some(Self::NonPremium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::NonPremium => "Non-Premium",
        }
    }
}

/// A user, creator, seller or advertiser account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub kind: PersonKind,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tier: Tier,
    /// Free-text recency such as "25 minutes ago"
    #[serde(default)]
    pub last_active: String,
    /// Authoritative timestamp; when set, recency is computed against `now`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub wallet_balance: f64,
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub total_losses: f64,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub wins: u32,
}

impl Person {
    pub fn new(id: u32, name: &str, email: &str, phone: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            location: String::new(),
            kind: PersonKind::User,
            status: Status::Active,
            tier: Tier::NonPremium,
            last_active: String::new(),
            last_seen: None,
            wallet_balance: 0.0,
            total_earnings: 0.0,
            total_losses: 0.0,
            games_played: 0,
            wins: 0,
        }
    }

    /// Classify how recently this person was active.
    /// Uses `last_seen` when present, otherwise the free-text phrase.
    pub fn activity(&self, now: DateTime<Utc>) -> Activity {
        match self.last_seen {
            Some(seen) => activity::classify_elapsed(now - seen),
            None => activity::classify_activity(&self.last_active),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// A wallet withdrawal request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: u32,
    pub person_id: u32,
    pub amount: f64,
    #[serde(default)]
    pub method: String,
    /// Free-text request time, e.g. "2 hours ago"
    #[serde(default)]
    pub requested: String,
    #[serde(default)]
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "in_progress" | "in-progress" | "inprogress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Open and in-progress tickets still need attention
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// A support ticket
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: u32,
    pub person_id: u32,
    pub subject: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TicketStatus,
}

/// A tip call between a caller and a creator
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    pub id: u32,
    pub caller_id: u32,
    pub creator_id: u32,
    pub duration_secs: u32,
    #[serde(default)]
    pub tip_amount: f64,
}
