use serde::{Deserialize, Serialize};

use super::{apply_rate, Amount, BasisPoints, LedgerError};

/// Savings tier chosen at registration. Serialized as the integers 1, 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

/// Entry of the fixed tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDetails {
    pub principal: Amount,
    pub rate_bps: BasisPoints,
}

/// What a prospective member would commit and earn on a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierQuote {
    pub tier: Tier,
    pub principal: Amount,
    pub rate_bps: BasisPoints,
    pub weekly_interest: Amount,
    pub first_week_withdrawal: Amount,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    pub fn as_u8(&self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }

    pub fn details(&self) -> TierDetails {
        match self {
            Tier::One => TierDetails {
                principal: 10_000,
                rate_bps: 500,
            },
            Tier::Two => TierDetails {
                principal: 20_000,
                rate_bps: 1_000,
            },
            Tier::Three => TierDetails {
                principal: 30_000,
                rate_bps: 2_000,
            },
        }
    }

    pub fn principal(&self) -> Amount {
        self.details().principal
    }

    pub fn rate_bps(&self) -> BasisPoints {
        self.details().rate_bps
    }

    /// Interest added to a member of this tier on every week advance.
    pub fn weekly_interest(&self) -> Amount {
        apply_rate(self.principal(), self.rate_bps())
    }

    pub fn quote(&self) -> TierQuote {
        let principal = self.principal();
        let weekly_interest = self.weekly_interest();
        TierQuote {
            tier: *self,
            principal,
            rate_bps: self.rate_bps(),
            weekly_interest,
            first_week_withdrawal: principal + weekly_interest,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(LedgerError::Validation(format!(
                "Invalid tier {}. Valid tiers: 1, 2, 3",
                other
            ))),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.as_u8()
    }
}

impl std::str::FromStr for Tier {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| LedgerError::Validation("Please select a savings tier.".to_string()))?;
        Tier::try_from(value)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tier {}", self.as_u8())
    }
}
