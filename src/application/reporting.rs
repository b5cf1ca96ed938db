use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Aggregates, Amount, BasisPoints, MemberId, SavingsLedger, Tier, CAPACITY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub capacity: usize,
    pub member_count: usize,
    pub available_slots: usize,
    pub weeks_passed: u32,
    pub total_principal: Amount,
    pub total_interest: Amount,
    pub total_withdrawal: Amount,
    pub average_return_pct: f64,
    pub pool_return: Amount,
    pub members: Vec<MemberRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: MemberId,
    pub name: String,
    pub tier: Tier,
    pub rate_bps: BasisPoints,
    pub amount: Amount,
    pub interest: Amount,
    pub total_withdrawal: Amount,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week: u32,
    pub member_count: usize,
    pub total_interest: Amount,
    pub average_return_pct: f64,
}

impl Dashboard {
    pub fn from_ledger(ledger: &SavingsLedger) -> Self {
        let Aggregates {
            member_count,
            weeks_passed,
            total_principal,
            total_interest,
            total_withdrawal,
            available_slots,
            average_return_pct,
            pool_return,
        } = ledger.aggregates();

        let members = ledger
            .members()
            .iter()
            .map(|m| MemberRow {
                id: m.id,
                name: m.name.clone(),
                tier: m.tier,
                rate_bps: m.tier.rate_bps(),
                amount: m.amount,
                interest: m.interest,
                total_withdrawal: m.total_withdrawal,
                joined_at: m.joined_at,
            })
            .collect();

        Self {
            capacity: CAPACITY,
            member_count,
            available_slots,
            weeks_passed,
            total_principal,
            total_interest,
            total_withdrawal,
            average_return_pct,
            pool_return,
            members,
        }
    }
}

impl WeeklySummary {
    pub fn from_ledger(ledger: &SavingsLedger) -> Self {
        let agg = ledger.aggregates();
        Self {
            week: agg.weeks_passed,
            member_count: agg.member_count,
            total_interest: agg.total_interest,
            average_return_pct: agg.average_return_pct,
        }
    }
}
