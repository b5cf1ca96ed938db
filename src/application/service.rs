use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    Aggregates, Amount, LedgerSnapshot, Member, MemberId, SavingsLedger, Tier,
};
use crate::storage::Repository;

use super::{AppError, Dashboard, WeeklySummary};

/// Blob store key holding the persisted ledger.
pub const STORAGE_KEY: &str = "savingsData";

/// Application service owning the savings ledger and its persistence.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct SavingsService {
    repo: Repository,
    ledger: SavingsLedger,
}

impl SavingsService {
    /// Create a service from a repository and an already loaded ledger.
    pub fn new(repo: Repository, ledger: SavingsLedger) -> Self {
        Self { repo, ledger }
    }

    /// Initialize a new database at the given path.
    /// An existing ledger in the database is kept as is.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;

        let ledger = match Self::load(&repo).await? {
            Some(ledger) => ledger,
            None => {
                let ledger = SavingsLedger::new();
                Self::store(&repo, &ledger).await?;
                info!(database = database_path, "initialized empty savings ledger");
                ledger
            }
        };

        Ok(Self::new(repo, ledger))
    }

    /// Connect to an existing database and load the ledger.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        let ledger = Self::load(&repo).await?.unwrap_or_default();
        debug!(
            members = ledger.len(),
            weeks = ledger.weeks_passed(),
            "loaded savings ledger"
        );
        Ok(Self::new(repo, ledger))
    }

    async fn load(repo: &Repository) -> Result<Option<SavingsLedger>, AppError> {
        let Some(blob) = repo.get_blob(STORAGE_KEY).await? else {
            return Ok(None);
        };
        let snapshot: LedgerSnapshot = serde_json::from_str(&blob.value)?;
        Ok(Some(SavingsLedger::from_snapshot(snapshot)?))
    }

    async fn store(repo: &Repository, ledger: &SavingsLedger) -> Result<(), AppError> {
        let json = serde_json::to_string(&ledger.to_snapshot())?;
        repo.put_blob(STORAGE_KEY, &json).await?;
        Ok(())
    }

    /// Write the ledger to the blob store. Failures are logged and dropped;
    /// the in-memory ledger stays authoritative.
    async fn persist(&self) {
        if let Err(e) = Self::store(&self.repo, &self.ledger).await {
            warn!(error = %e, "failed to persist savings ledger");
        }
    }

    // ========================
    // Ledger operations
    // ========================

    /// Register a new member joining now.
    pub async fn register(&mut self, name: &str, tier: Tier) -> Result<Member, AppError> {
        self.register_at(name, tier, Utc::now()).await
    }

    /// Register a new member with an explicit join timestamp.
    pub async fn register_at(
        &mut self,
        name: &str,
        tier: Tier,
        joined_at: DateTime<Utc>,
    ) -> Result<Member, AppError> {
        let member = self.ledger.register_at(name, tier, joined_at)?;
        debug!(id = %member.id, name = %member.name, tier = member.tier.as_u8(), "registered member");
        self.persist().await;
        Ok(member)
    }

    /// Withdraw a member. Unknown ids are a no-op and return `None`.
    pub async fn withdraw(&mut self, id: MemberId) -> Option<Member> {
        let removed = self.ledger.withdraw(id);
        match &removed {
            Some(member) => {
                debug!(id = %member.id, payout = member.total_withdrawal, "withdrew member");
                self.persist().await;
            }
            None => debug!(id = %id, "withdraw of unknown member ignored"),
        }
        removed
    }

    /// Advance one week. Returns the interest accrued this week.
    pub async fn advance_week(&mut self) -> Amount {
        let accrued = self.ledger.advance_week();
        debug!(week = self.ledger.weeks_passed(), accrued, "advanced week");
        self.persist().await;
        accrued
    }

    /// Advance several weeks, persisting once. Returns the total interest accrued.
    pub async fn advance_weeks(&mut self, weeks: u32) -> Amount {
        let accrued: Amount = (0..weeks).map(|_| self.ledger.advance_week()).sum();
        debug!(week = self.ledger.weeks_passed(), weeks, accrued, "advanced weeks");
        if weeks > 0 {
            self.persist().await;
        }
        accrued
    }

    /// Replace the whole ledger, e.g. from an imported snapshot.
    pub async fn replace_ledger(&mut self, ledger: SavingsLedger) {
        info!(
            members = ledger.len(),
            weeks = ledger.weeks_passed(),
            "replacing savings ledger"
        );
        self.ledger = ledger;
        self.persist().await;
    }

    // ========================
    // Queries
    // ========================

    pub fn ledger(&self) -> &SavingsLedger {
        &self.ledger
    }

    pub fn members(&self) -> &[Member] {
        self.ledger.members()
    }

    /// Get a member by id.
    pub fn get_member(&self, id: MemberId) -> Result<&Member, AppError> {
        self.ledger
            .member(id)
            .ok_or_else(|| AppError::MemberNotFound(id.to_string()))
    }

    /// Find members whose id starts with the given prefix.
    pub fn find_members_by_id_prefix(&self, prefix: &str) -> Vec<&Member> {
        let prefix = prefix.trim().to_lowercase();
        self.ledger
            .members()
            .iter()
            .filter(|m| m.id.to_string().starts_with(&prefix))
            .collect()
    }

    pub fn weeks_passed(&self) -> u32 {
        self.ledger.weeks_passed()
    }

    pub fn aggregates(&self) -> Aggregates {
        self.ledger.aggregates()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_ledger(&self.ledger)
    }

    pub fn weekly_summary(&self) -> WeeklySummary {
        WeeklySummary::from_ledger(&self.ledger)
    }
}
