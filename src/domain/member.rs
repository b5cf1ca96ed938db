use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Tier};

pub type MemberId = Uuid;

/// A club member. Field names follow the persisted blob format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub tier: Tier,
    /// Principal, fixed by tier.
    pub amount: Amount,
    pub interest: Amount,
    pub total_withdrawal: Amount,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: String, tier: Tier, joined_at: DateTime<Utc>) -> Self {
        let amount = tier.principal();
        Self {
            id: Uuid::new_v4(),
            name,
            tier,
            amount,
            interest: 0,
            total_withdrawal: amount,
            joined_at,
        }
    }

    /// Add one week of simple interest on the principal. Returns the increment.
    /// Interest stops growing once `amount + interest` would leave `Amount`.
    pub fn accrue_week(&mut self) -> Amount {
        let ceiling = Amount::MAX - self.amount;
        let interest = self
            .interest
            .saturating_add(self.tier.weekly_interest())
            .min(ceiling);
        let earned = interest - self.interest;
        self.interest = interest;
        self.total_withdrawal = self.amount + self.interest;
        earned
    }

    /// Check the invariants that must hold for a member loaded from storage.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if self.amount != self.tier.principal() {
            return Err(format!(
                "member {} has amount {} but {} requires {}",
                self.id,
                self.amount,
                self.tier,
                self.tier.principal()
            ));
        }
        if self.interest < 0 {
            return Err(format!(
                "member {} has negative interest {}",
                self.id, self.interest
            ));
        }
        let Some(expected) = self.amount.checked_add(self.interest) else {
            return Err(format!(
                "member {} has interest {} out of range",
                self.id, self.interest
            ));
        };
        if self.total_withdrawal != expected {
            return Err(format!(
                "member {} has total withdrawal {} but amount + interest is {}",
                self.id, self.total_withdrawal, expected
            ));
        }
        Ok(())
    }
}
