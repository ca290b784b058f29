//! Console view state: current section, the open dialog and per-section filters.
//!
//! All transitions go through [`ViewState::apply`]. Only one dialog can be open
//! at a time; opening another replaces it and navigating closes it.

use crate::audit::AuditEvent;
use crate::filter::{PersonFilter, TicketFilter, WithdrawalFilter};
use crate::fixtures::Dataset;
use crate::records::{PersonKind, WithdrawalStatus};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Dashboard,
    Users,
    Creators,
    Sellers,
    Advertisers,
    Games,
    Calls,
    Wallet,
    Support,
    Settings,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Dashboard,
        Section::Users,
        Section::Creators,
        Section::Sellers,
        Section::Advertisers,
        Section::Games,
        Section::Calls,
        Section::Wallet,
        Section::Support,
        Section::Settings,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" | "home" => Some(Self::Dashboard),
            "users" | "consumers" => Some(Self::Users),
            "creators" => Some(Self::Creators),
            "sellers" => Some(Self::Sellers),
            "advertisers" => Some(Self::Advertisers),
            "games" => Some(Self::Games),
            "calls" => Some(Self::Calls),
            "wallet" | "withdrawals" => Some(Self::Wallet),
            "support" | "tickets" => Some(Self::Support),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Creators => "creators",
            Self::Sellers => "sellers",
            Self::Advertisers => "advertisers",
            Self::Games => "games",
            Self::Calls => "calls",
            Self::Wallet => "wallet",
            Self::Support => "support",
            Self::Settings => "settings",
        }
    }

    /// Sections that list people, and which kind (None = everyone)
    pub fn people(&self) -> Option<Option<PersonKind>> {
        match self {
            Self::Dashboard | Self::Games => Some(None),
            Self::Users => Some(Some(PersonKind::User)),
            Self::Creators => Some(Some(PersonKind::Creator)),
            Self::Sellers => Some(Some(PersonKind::Seller)),
            Self::Advertisers => Some(Some(PersonKind::Advertiser)),
            Self::Calls | Self::Wallet | Self::Support | Self::Settings => None,
        }
    }
}

// ============================================================================
// Dialogs and actions
// ============================================================================

/// The single dialog slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Profile(u32),
    ActiveUsers,
    EditPerson(u32),
    ConfirmDelete(u32),
    ReviewWithdrawal(u32),
    TicketDetail(u32),
}

impl Dialog {
    pub fn describe(&self) -> String {
        match self {
            Self::Profile(id) => format!("profile #{}", id),
            Self::ActiveUsers => "active users".to_string(),
            Self::EditPerson(id) => format!("edit #{}", id),
            Self::ConfirmDelete(id) => format!("confirm delete #{}", id),
            Self::ReviewWithdrawal(id) => format!("review withdrawal #{}", id),
            Self::TicketDetail(id) => format!("ticket #{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Section),
    Open(Dialog),
    Close,
    SetFilter { facet: String, value: String },
    /// Several `(facet, value)` pairs; either all apply or none do
    SetFilters(Vec<(String, String)>),
    UsePreset(PersonFilter),
    ClearFilters,
    ConfirmDelete,
    SaveEdit,
    ApproveWithdrawal,
    RejectWithdrawal,
    ResolveTicket,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated,
    Audit(AuditEvent),
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone)]
pub struct ViewState {
    section: Section,
    dialog: Option<Dialog>,
    person_filters: HashMap<Section, PersonFilter>,
    withdrawal_filter: WithdrawalFilter,
    ticket_filter: TicketFilter,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        let person_filters = Section::ALL
            .iter()
            .filter(|s| s.people().is_some())
            .map(|s| (*s, PersonFilter::new()))
            .collect();
        Self {
            section: Section::Dashboard,
            dialog: None,
            person_filters,
            withdrawal_filter: WithdrawalFilter::default(),
            ticket_filter: TicketFilter::default(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    /// Filter for the current section, if it lists people
    pub fn person_filter(&self) -> Option<&PersonFilter> {
        self.person_filters.get(&self.section)
    }

    pub fn withdrawal_filter(&self) -> &WithdrawalFilter {
        &self.withdrawal_filter
    }

    pub fn ticket_filter(&self) -> &TicketFilter {
        &self.ticket_filter
    }

    pub fn apply(&mut self, action: Action, data: &Dataset) -> Result<Outcome> {
        match action {
            Action::Navigate(section) => {
                self.section = section;
                self.dialog = None;
                Ok(Outcome::Updated)
            }
            Action::Open(dialog) => {
                check_target(&dialog, data)?;
                self.dialog = Some(dialog);
                Ok(Outcome::Updated)
            }
            Action::Close => {
                self.dialog = None;
                Ok(Outcome::Updated)
            }
            Action::SetFilter { facet, value } => {
                self.set_filter(&facet, &value)?;
                Ok(Outcome::Updated)
            }
            Action::SetFilters(pairs) => {
                let mut staged = self.clone();
                for (facet, value) in &pairs {
                    staged.set_filter(facet, value)?;
                }
                *self = staged;
                Ok(Outcome::Updated)
            }
            Action::UsePreset(filter) => {
                let slot = self.person_filter_mut()?;
                *slot = filter;
                Ok(Outcome::Updated)
            }
            Action::ClearFilters => {
                match self.section {
                    Section::Wallet => self.withdrawal_filter = WithdrawalFilter::default(),
                    Section::Support => self.ticket_filter = TicketFilter::default(),
                    _ => *self.person_filter_mut()? = PersonFilter::new(),
                }
                Ok(Outcome::Updated)
            }
            Action::ConfirmDelete => match self.dialog {
                Some(Dialog::ConfirmDelete(person_id)) => {
                    self.dialog = None;
                    Ok(Outcome::Audit(AuditEvent::PersonDeleted { person_id }))
                }
                _ => Err(self.wrong_dialog("confirm a delete")),
            },
            Action::SaveEdit => match self.dialog {
                Some(Dialog::EditPerson(person_id)) => {
                    self.dialog = None;
                    Ok(Outcome::Audit(AuditEvent::PersonSaved { person_id }))
                }
                _ => Err(self.wrong_dialog("save an edit")),
            },
            Action::ApproveWithdrawal => self.review_withdrawal(data, true),
            Action::RejectWithdrawal => self.review_withdrawal(data, false),
            Action::ResolveTicket => match self.dialog {
                Some(Dialog::TicketDetail(ticket_id)) => {
                    self.dialog = None;
                    Ok(Outcome::Audit(AuditEvent::TicketResolved { ticket_id }))
                }
                _ => Err(self.wrong_dialog("resolve a ticket")),
            },
        }
    }

    fn review_withdrawal(&mut self, data: &Dataset, approve: bool) -> Result<Outcome> {
        let Some(Dialog::ReviewWithdrawal(withdrawal_id)) = self.dialog else {
            return Err(self.wrong_dialog("review a withdrawal"));
        };
        let withdrawal = data
            .withdrawal(withdrawal_id)
            .ok_or_else(|| anyhow!("Unknown withdrawal #{}", withdrawal_id))?;
        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(anyhow!(
                "Withdrawal #{} is already {}",
                withdrawal_id,
                withdrawal.status.as_str().to_lowercase()
            ));
        }
        self.dialog = None;
        let amount = withdrawal.amount;
        Ok(Outcome::Audit(if approve {
            AuditEvent::WithdrawalApproved {
                withdrawal_id,
                amount,
            }
        } else {
            AuditEvent::WithdrawalRejected {
                withdrawal_id,
                amount,
            }
        }))
    }

    fn set_filter(&mut self, facet: &str, value: &str) -> Result<()> {
        match self.section {
            Section::Wallet => self.withdrawal_filter.set(facet, value),
            Section::Support => self.ticket_filter.set(facet, value),
            _ => self.person_filter_mut()?.set(facet, value),
        }
    }

    fn person_filter_mut(&mut self) -> Result<&mut PersonFilter> {
        let section = self.section;
        self.person_filters
            .get_mut(&section)
            .ok_or_else(|| anyhow!("The {} section has no filters", section.as_str()))
    }

    fn wrong_dialog(&self, what: &str) -> anyhow::Error {
        match self.dialog {
            Some(open) => anyhow!("Cannot {} from the {} dialog", what, open.describe()),
            None => anyhow!("Cannot {}: no dialog is open", what),
        }
    }
}

/// Reject dialogs that point at records that do not exist
fn check_target(dialog: &Dialog, data: &Dataset) -> Result<()> {
    match *dialog {
        Dialog::Profile(id) | Dialog::EditPerson(id) | Dialog::ConfirmDelete(id) => {
            data.person(id)
                .ok_or_else(|| anyhow!("Unknown person #{}", id))?;
        }
        Dialog::ReviewWithdrawal(id) => {
            data.withdrawal(id)
                .ok_or_else(|| anyhow!("Unknown withdrawal #{}", id))?;
        }
        Dialog::TicketDetail(id) => {
            data.ticket(id)
                .ok_or_else(|| anyhow!("Unknown ticket #{}", id))?;
        }
        Dialog::ActiveUsers => {}
    }
    Ok(())
}
