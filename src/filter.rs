//! Search and facet filtering for list views.
//!
//! A record passes when the free-text search matches (or is empty) AND every
//! facet admits it. Filtering borrows from the source, never reorders, and
//! never mutates it.

use crate::activity::ActivityBucket;
use crate::records::{
    Person, PersonKind, Priority, Status, Ticket, TicketStatus, Tier, Withdrawal,
    WithdrawalStatus,
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// Sentinel meaning "no constraint"
pub const ALL: &str = "all";

/// One filter dimension: either unconstrained or pinned to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    /// Parse a facet value; `"all"` (any case) and the empty string are unconstrained
    pub fn parse(name: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            return Ok(Facet::All);
        }
        parse(value)
            .map(Facet::Only)
            .ok_or_else(|| anyhow!("Unknown {} value: '{}'", name, value))
    }

    pub fn admits(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Facet::All)
    }
}

/// Case-insensitive substring match against any of the given fields
pub fn search_matches(term: &str, fields: &[&str]) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&term))
}

/// Filter state for person tables (users, creators, sellers, advertisers)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub search: String,
    pub kind: Facet<PersonKind>,
    pub status: Facet<Status>,
    pub tier: Facet<Tier>,
    pub last_active: Facet<ActivityBucket>,
}

impl PersonFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one facet by name, e.g. `set("status", "active")`
    pub fn set(&mut self, facet: &str, value: &str) -> Result<()> {
        match facet.trim().to_lowercase().as_str() {
            "search" | "q" => self.search = value.trim().to_string(),
            "type" | "kind" => self.kind = Facet::parse("type", value, PersonKind::from_str)?,
            "status" => self.status = Facet::parse("status", value, Status::from_str)?,
            "tier" => self.tier = Facet::parse("tier", value, Tier::from_str)?,
            "last_active" | "lastactive" | "active" | "activity" => {
                self.last_active = Facet::parse("last_active", value, |s| {
                    // "unrecognized" is a classification outcome, not a filter choice
                    ActivityBucket::from_str(s).filter(|b| *b != ActivityBucket::Unrecognized)
                })?
            }
            other => return Err(anyhow!("Unknown filter facet: '{}'", other)),
        }
        Ok(())
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.trim().is_empty()
            && self.kind.is_all()
            && self.status.is_all()
            && self.tier.is_all()
            && self.last_active.is_all()
    }

    pub fn matches(&self, person: &Person, now: DateTime<Utc>) -> bool {
        if !search_matches(&self.search, &[&person.name, &person.email, &person.phone]) {
            return false;
        }
        if !self.kind.admits(&person.kind)
            || !self.status.admits(&person.status)
            || !self.tier.admits(&person.tier)
        {
            return false;
        }
        match self.last_active {
            Facet::All => true,
            Facet::Only(selected) => person.activity(now).bucket.satisfies(selected),
        }
    }

    /// Surviving records, in input order
    pub fn apply<'a, I>(&self, people: I, now: DateTime<Utc>) -> Vec<&'a Person>
    where
        I: IntoIterator<Item = &'a Person>,
    {
        people
            .into_iter()
            .filter(|p| self.matches(p, now))
            .collect()
    }
}

impl fmt::Display for PersonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn facet<T>(f: &Facet<T>, name: impl Fn(&T) -> &'static str) -> &'static str {
            match f {
                Facet::All => ALL,
                Facet::Only(v) => name(v),
            }
        }
        write!(
            f,
            "search='{}' type={} status={} tier={} last_active={}",
            self.search,
            facet(&self.kind, PersonKind::as_str),
            facet(&self.status, Status::as_str),
            facet(&self.tier, Tier::as_str),
            facet(&self.last_active, ActivityBucket::as_str),
        )
    }
}

/// Filter state for the withdrawals table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalFilter {
    pub status: Facet<WithdrawalStatus>,
}

impl WithdrawalFilter {
    pub fn set(&mut self, facet: &str, value: &str) -> Result<()> {
        match facet.trim().to_lowercase().as_str() {
            "status" => self.status = Facet::parse("status", value, WithdrawalStatus::from_str)?,
            other => return Err(anyhow!("Unknown withdrawal facet: '{}'", other)),
        }
        Ok(())
    }

    pub fn apply<'a>(&self, items: &'a [Withdrawal]) -> Vec<&'a Withdrawal> {
        items
            .iter()
            .filter(|w| self.status.admits(&w.status))
            .collect()
    }
}

/// Filter state for the support tickets table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub search: String,
    pub status: Facet<TicketStatus>,
    pub priority: Facet<Priority>,
}

impl TicketFilter {
    pub fn set(&mut self, facet: &str, value: &str) -> Result<()> {
        match facet.trim().to_lowercase().as_str() {
            "search" | "q" => self.search = value.trim().to_string(),
            "status" => self.status = Facet::parse("status", value, TicketStatus::from_str)?,
            "priority" => self.priority = Facet::parse("priority", value, Priority::from_str)?,
            other => return Err(anyhow!("Unknown ticket facet: '{}'", other)),
        }
        Ok(())
    }

    pub fn apply<'a>(&self, items: &'a [Ticket]) -> Vec<&'a Ticket> {
        items
            .iter()
            .filter(|t| {
                search_matches(&self.search, &[&t.subject])
                    && self.status.admits(&t.status)
                    && self.priority.admits(&t.priority)
            })
            .collect()
    }
}
