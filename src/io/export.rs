use anyhow::Result;
use std::io::Write;

use crate::application::SavingsService;
use crate::domain::LedgerSnapshot;

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a SavingsService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a SavingsService) -> Self {
        Self { service }
    }

    /// Export the roster to CSV format
    pub fn export_members_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "name",
            "tier",
            "amount",
            "interest",
            "total_withdrawal",
            "joined_at",
        ])?;

        let mut count = 0;
        for member in self.service.members() {
            csv_writer.write_record([
                member.id.to_string(),
                member.name.clone(),
                member.tier.as_u8().to_string(),
                member.amount.to_string(),
                member.interest.to_string(),
                member.total_withdrawal.to_string(),
                member.joined_at.to_rfc3339(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the roster to JSON as an array of members
    pub fn export_members_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let members = self.service.members();
        let json = serde_json::to_string_pretty(members)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(members.len())
    }

    /// Export the ledger in its persisted blob format
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = self.service.ledger().to_snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(snapshot)
    }
}
