//! Built-in data sets and JSON data file loading.

use crate::records::{
    CallLog, Person, PersonKind, Priority, Status, Ticket, TicketStatus, Tier, Withdrawal,
    WithdrawalStatus,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the console can show
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub calls: Vec<CallLog>,
}

impl Dataset {
    /// The built-in mock data
    pub fn builtin() -> Self {
        let mut people = total_users();
        people.extend(creators());
        people.extend(sellers());
        people.extend(advertisers());
        Self {
            people,
            withdrawals: withdrawals(),
            tickets: tickets(),
            calls: calls(),
        }
    }

    /// Load a JSON data file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read data file {}", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("invalid data file {}", path.display()))?;
        Ok(dataset)
    }

    /// People of one kind, in dataset order
    pub fn people_of(&self, kind: PersonKind) -> Vec<&Person> {
        self.people.iter().filter(|p| p.kind == kind).collect()
    }

    pub fn person(&self, id: u32) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn withdrawal(&self, id: u32) -> Option<&Withdrawal> {
        self.withdrawals.iter().find(|w| w.id == id)
    }

    pub fn ticket(&self, id: u32) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Display name for a person id, or "#id" when unknown
    pub fn name_of(&self, id: u32) -> String {
        self.person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }
}

#[allow(clippy::too_many_arguments)]
fn person(
    id: u32,
    name: &str,
    email: &str,
    phone: &str,
    location: &str,
    kind: PersonKind,
    status: Status,
    tier: Tier,
    last_active: &str,
) -> Person {
    let mut p = Person::new(id, name, email, phone);
    p.location = location.to_string();
    p.kind = kind;
    p.status = status;
    p.tier = tier;
    p.last_active = last_active.to_string();
    p
}

fn with_money(mut p: Person, wallet: f64, earnings: f64, losses: f64) -> Person {
    p.wallet_balance = wallet;
    p.total_earnings = earnings;
    p.total_losses = losses;
    p
}

fn with_games(mut p: Person, played: u32, wins: u32) -> Person {
    p.games_played = played;
    p.wins = wins;
    p
}

/// The five consumer accounts shown on the Users section
pub fn total_users() -> Vec<Person> {
    use PersonKind::User;
    vec![
        with_games(
            with_money(
                person(
                    1,
                    "John Doe",
                    "john.doe@example.com",
                    "+1 555 0101",
                    "New York, US",
                    User,
                    Status::Active,
                    Tier::Premium,
                    "2 hours ago",
                ),
                1250.0,
                3400.0,
                900.0,
            ),
            48,
            30,
        ),
        with_games(
            with_money(
                person(
                    2,
                    "Sarah Wilson",
                    "s.wilson@example.com",
                    "+1 555 0102",
                    "Austin, US",
                    User,
                    Status::Active,
                    Tier::Premium,
                    "25 minutes ago",
                ),
                830.5,
                2100.0,
                450.0,
            ),
            32,
            21,
        ),
        with_games(
            with_money(
                person(
                    3,
                    "Mike Johnson",
                    "mike.j@example.com",
                    "+44 20 7946 0103",
                    "London, UK",
                    User,
                    Status::Inactive,
                    Tier::NonPremium,
                    "3 days ago",
                ),
                40.0,
                120.0,
                310.0,
            ),
            15,
            4,
        ),
        with_games(
            with_money(
                person(
                    4,
                    "Emily Davis",
                    "emily.davis@example.com",
                    "+1 555 0104",
                    "Toronto, CA",
                    User,
                    Status::Suspended,
                    Tier::NonPremium,
                    "1 week ago",
                ),
                0.0,
                75.0,
                620.0,
            ),
            22,
            6,
        ),
        with_games(
            with_money(
                person(
                    5,
                    "David Brown",
                    "dbrown@example.com",
                    "+61 2 5550 0105",
                    "Sydney, AU",
                    User,
                    Status::Active,
                    Tier::NonPremium,
                    "1 hour ago",
                ),
                310.25,
                980.0,
                200.0,
            ),
            20,
            11,
        ),
    ]
}

pub fn creators() -> Vec<Person> {
    use PersonKind::Creator;
    vec![
        with_money(
            person(
                101,
                "Amara Okafor",
                "amara@creators.example.com",
                "+234 801 555 0101",
                "Lagos, NG",
                Creator,
                Status::Active,
                Tier::Premium,
                "10 minutes ago",
            ),
            5400.0,
            18250.0,
            0.0,
        ),
        with_money(
            person(
                102,
                "Liam Chen",
                "liam.chen@creators.example.com",
                "+1 555 0202",
                "Vancouver, CA",
                Creator,
                Status::Active,
                Tier::NonPremium,
                "5 hours ago",
            ),
            1200.0,
            6400.0,
            0.0,
        ),
        with_money(
            person(
                103,
                "Priya Nair",
                "priya@creators.example.com",
                "+91 98 5550 0103",
                "Mumbai, IN",
                Creator,
                Status::Pending,
                Tier::NonPremium,
                "20 days ago",
            ),
            0.0,
            0.0,
            0.0,
        ),
        with_money(
            person(
                104,
                "Noah Martins",
                "noah@creators.example.com",
                "+55 11 5550 0104",
                "Sao Paulo, BR",
                Creator,
                Status::Blocked,
                Tier::Premium,
                "6 weeks ago",
            ),
            95.0,
            2300.0,
            0.0,
        ),
    ]
}

pub fn sellers() -> Vec<Person> {
    use PersonKind::Seller;
    vec![
        with_money(
            person(
                201,
                "Kofi Mensah",
                "kofi@shop.example.com",
                "+233 20 555 0201",
                "Accra, GH",
                Seller,
                Status::Active,
                Tier::Premium,
                "1 day ago",
            ),
            2750.0,
            12900.0,
            0.0,
        ),
        with_money(
            person(
                202,
                "Elena Rossi",
                "elena@shop.example.com",
                "+39 06 5550 0202",
                "Rome, IT",
                Seller,
                Status::Active,
                Tier::NonPremium,
                "5 days ago",
            ),
            610.0,
            3050.0,
            0.0,
        ),
        with_money(
            person(
                203,
                "Tomas Novak",
                "tomas@shop.example.com",
                "+420 2 5550 0203",
                "Prague, CZ",
                Seller,
                Status::Pending,
                Tier::NonPremium,
                "2 weeks ago",
            ),
            0.0,
            0.0,
            0.0,
        ),
    ]
}

pub fn advertisers() -> Vec<Person> {
    use PersonKind::Advertiser;
    vec![
        with_money(
            person(
                301,
                "Brightside Media",
                "ads@brightside.example.com",
                "+1 555 0301",
                "Chicago, US",
                Advertiser,
                Status::Active,
                Tier::Premium,
                "3 hours ago",
            ),
            15000.0,
            0.0,
            0.0,
        ),
        with_money(
            person(
                302,
                "Nordic Gear",
                "marketing@nordicgear.example.com",
                "+46 8 5550 0302",
                "Stockholm, SE",
                Advertiser,
                Status::Inactive,
                Tier::NonPremium,
                "2 months ago",
            ),
            220.0,
            0.0,
            0.0,
        ),
    ]
}

pub fn withdrawals() -> Vec<Withdrawal> {
    vec![
        Withdrawal {
            id: 1,
            person_id: 101,
            amount: 2500.0,
            method: "Bank transfer".to_string(),
            requested: "2 hours ago".to_string(),
            status: WithdrawalStatus::Pending,
        },
        Withdrawal {
            id: 2,
            person_id: 201,
            amount: 1200.0,
            method: "PayPal".to_string(),
            requested: "1 day ago".to_string(),
            status: WithdrawalStatus::Pending,
        },
        Withdrawal {
            id: 3,
            person_id: 1,
            amount: 300.0,
            method: "Mobile money".to_string(),
            requested: "3 days ago".to_string(),
            status: WithdrawalStatus::Approved,
        },
        Withdrawal {
            id: 4,
            person_id: 104,
            amount: 95.0,
            method: "Bank transfer".to_string(),
            requested: "1 week ago".to_string(),
            status: WithdrawalStatus::Rejected,
        },
    ]
}

pub fn tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: 1,
            person_id: 2,
            subject: "Tip not credited after call".to_string(),
            priority: Priority::High,
            status: TicketStatus::Open,
        },
        Ticket {
            id: 2,
            person_id: 202,
            subject: "Payout method verification".to_string(),
            priority: Priority::Medium,
            status: TicketStatus::InProgress,
        },
        Ticket {
            id: 3,
            person_id: 3,
            subject: "Cannot reset password".to_string(),
            priority: Priority::Low,
            status: TicketStatus::Resolved,
        },
        Ticket {
            id: 4,
            person_id: 4,
            subject: "Appeal account suspension".to_string(),
            priority: Priority::High,
            status: TicketStatus::Open,
        },
    ]
}

pub fn calls() -> Vec<CallLog> {
    vec![
        CallLog {
            id: 1,
            caller_id: 1,
            creator_id: 101,
            duration_secs: 720,
            tip_amount: 25.0,
        },
        CallLog {
            id: 2,
            caller_id: 2,
            creator_id: 101,
            duration_secs: 300,
            tip_amount: 10.0,
        },
        CallLog {
            id: 3,
            caller_id: 5,
            creator_id: 102,
            duration_secs: 1260,
            tip_amount: 40.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique() {
        let data = Dataset::builtin();
        let ids: HashSet<u32> = data.people.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), data.people.len());
    }

    #[test]
    fn test_people_of_kind() {
        let data = Dataset::builtin();
        assert_eq!(data.people_of(PersonKind::User).len(), 5);
        assert_eq!(data.people_of(PersonKind::Creator).len(), 4);
        assert_eq!(data.name_of(101), "Amara Okafor");
        assert_eq!(data.name_of(999), "#999");
    }

    #[test]
    fn test_references_resolve() {
        let data = Dataset::builtin();
        for w in &data.withdrawals {
            assert!(data.person(w.person_id).is_some(), "withdrawal {}", w.id);
        }
        for t in &data.tickets {
            assert!(data.person(t.person_id).is_some(), "ticket {}", t.id);
        }
    }

    #[test]
    fn test_load_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("dataset.json");
        let data = Dataset::load_from(&path).unwrap();
        assert_eq!(data.people.len(), 3);
        assert!(data.people[2].last_seen.is_some());
        assert_eq!(data.withdrawals.len(), 1);
        assert!(data.calls.is_empty());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Dataset::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("invalid data file"));

        let missing = dir.path().join("missing.json");
        assert!(Dataset::load_from(&missing).is_err());
    }
}
