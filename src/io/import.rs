use std::io::Read;

use crate::application::{AppError, SavingsService};
use crate::domain::{LedgerSnapshot, SavingsLedger};

/// Result of an import operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub members: usize,
    pub weeks_passed: u32,
    pub applied: bool,
}

/// Importer for loading a snapshot into the ledger
pub struct Importer<'a> {
    service: &'a mut SavingsService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut SavingsService) -> Self {
        Self { service }
    }

    /// Import a snapshot in the persisted blob format, replacing the current
    /// ledger. With `dry_run` the snapshot is only validated.
    pub async fn import_snapshot_json<R: Read>(
        &mut self,
        mut reader: R,
        dry_run: bool,
    ) -> Result<ImportResult, AppError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;

        let snapshot: LedgerSnapshot = serde_json::from_str(&json)?;
        let ledger = SavingsLedger::from_snapshot(snapshot)?;

        let result = ImportResult {
            members: ledger.len(),
            weeks_passed: ledger.weeks_passed(),
            applied: !dry_run,
        };

        if !dry_run {
            self.service.replace_ledger(ledger).await;
        }

        Ok(result)
    }
}
