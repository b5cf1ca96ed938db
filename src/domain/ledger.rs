use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{apply_rate, Amount, BasisPoints, Member, MemberId, Tier};

/// Maximum number of simultaneous members.
pub const CAPACITY: usize = 12;

/// Minimum length of a member name, after trimming.
pub const MIN_NAME_LEN: usize = 2;

/// Projected return of the group's collective investment on total principal.
pub const POOL_RETURN_BPS: BasisPoints = 2_000;

/// Roster of members plus the elapsed week counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavingsLedger {
    members: Vec<Member>,
    weeks_passed: u32,
}

/// Aggregate figures over the current roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub member_count: usize,
    pub weeks_passed: u32,
    pub total_principal: Amount,
    pub total_interest: Amount,
    pub total_withdrawal: Amount,
    pub available_slots: usize,
    /// `total_interest / total_principal * 100`, 0 for an empty roster.
    pub average_return_pct: f64,
    pub pool_return: Amount,
}

/// Persisted form of the ledger, stored as a single JSON blob:
/// `{ "members": [...], "weeksPassed": n }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub members: Vec<Member>,
    pub weeks_passed: u32,
}

impl SavingsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn weeks_passed(&self) -> u32 {
        self.weeks_passed
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= CAPACITY
    }

    pub fn available_slots(&self) -> usize {
        CAPACITY.saturating_sub(self.members.len())
    }

    /// Register a new member joining now.
    pub fn register(&mut self, name: &str, tier: Tier) -> Result<Member, LedgerError> {
        self.register_at(name, tier, Utc::now())
    }

    /// Register a new member with an explicit join timestamp.
    /// Input is validated first, then capacity; the roster is untouched on failure.
    pub fn register_at(
        &mut self,
        name: &str,
        tier: Tier,
        joined_at: DateTime<Utc>,
    ) -> Result<Member, LedgerError> {
        let name = validate_name(name)?;

        if self.is_full() {
            return Err(LedgerError::CapacityExceeded { capacity: CAPACITY });
        }

        let member = Member::new(name, tier, joined_at);
        self.members.push(member.clone());
        Ok(member)
    }

    /// Remove a member. Returns `None` if no member has this id.
    pub fn withdraw(&mut self, id: MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// Advance one week, accruing simple interest on principal to every
    /// member. Returns the interest accrued across the roster this week.
    pub fn advance_week(&mut self) -> Amount {
        self.weeks_passed = self.weeks_passed.saturating_add(1);
        self.members.iter_mut().map(Member::accrue_week).sum()
    }

    pub fn aggregates(&self) -> Aggregates {
        let total = |field: fn(&Member) -> Amount| {
            self.members
                .iter()
                .map(field)
                .fold(0, Amount::saturating_add)
        };
        let total_principal = total(|m| m.amount);
        let total_interest = total(|m| m.interest);
        let total_withdrawal = total(|m| m.total_withdrawal);

        let average_return_pct = if total_principal == 0 {
            0.0
        } else {
            total_interest as f64 / total_principal as f64 * 100.0
        };

        Aggregates {
            member_count: self.members.len(),
            weeks_passed: self.weeks_passed,
            total_principal,
            total_interest,
            total_withdrawal,
            available_slots: self.available_slots(),
            average_return_pct,
            pool_return: apply_rate(total_principal, POOL_RETURN_BPS),
        }
    }

    pub fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            members: self.members.clone(),
            weeks_passed: self.weeks_passed,
        }
    }

    /// Rebuild a ledger from its persisted form, rejecting blobs that break
    /// the roster invariants.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        if snapshot.members.len() > CAPACITY {
            return Err(LedgerError::CorruptSnapshot(format!(
                "{} members exceed capacity of {}",
                snapshot.members.len(),
                CAPACITY
            )));
        }

        let mut seen = HashSet::new();
        for member in &snapshot.members {
            if !seen.insert(member.id) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "duplicate member id {}",
                    member.id
                )));
            }
            member
                .check_consistency()
                .map_err(LedgerError::CorruptSnapshot)?;
        }

        Ok(Self {
            members: snapshot.members,
            weeks_passed: snapshot.weeks_passed,
        })
    }
}

fn validate_name(name: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "Name must be at least {} characters.",
            MIN_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Registration attempted with the roster full.
    #[error("No available slots (all {capacity} are taken). Please wait for a member to withdraw.")]
    CapacityExceeded { capacity: usize },

    /// Malformed registration input.
    #[error("{0}")]
    Validation(String),

    /// Persisted state that violates the roster invariants.
    #[error("Corrupt savings data: {0}")]
    CorruptSnapshot(String),
}
