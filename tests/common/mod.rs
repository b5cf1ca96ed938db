// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use arca::application::SavingsService;
use arca::domain::{Member, Tier};
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(SavingsService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = SavingsService::init(&db_path(&temp_dir)).await?;
    Ok((service, temp_dir))
}

/// Path of the test database inside a temp dir
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_str().unwrap().to_string()
}

/// Reconnect to the database backing a test service
pub async fn reopen(temp_dir: &TempDir) -> Result<SavingsService> {
    Ok(SavingsService::connect(&db_path(temp_dir)).await?)
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Register `count` members cycling through the tiers
pub async fn register_members(service: &mut SavingsService, count: usize) -> Result<Vec<Member>> {
    let mut members = Vec::with_capacity(count);
    for i in 0..count {
        let tier = Tier::ALL[i % Tier::ALL.len()];
        members.push(service.register(&format!("Member {}", i + 1), tier).await?);
    }
    Ok(members)
}
