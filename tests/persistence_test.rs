mod common;

use anyhow::Result;
use arca::application::{AppError, SavingsService, STORAGE_KEY};
use arca::domain::{LedgerError, LedgerSnapshot, SavingsLedger, Tier};
use arca::storage::Repository;
use chrono::{TimeZone, Utc};
use common::{db_path, parse_date, reopen, test_service};
use tempfile::TempDir;

#[tokio::test]
async fn test_state_survives_reconnect() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    let ada = service
        .register_at("Ada", Tier::Two, parse_date("2024-01-15"))
        .await?;
    let bola = service.register("Bola", Tier::Three).await?;
    service.advance_week().await;
    service.withdraw(bola.id).await;
    let before = service.ledger().clone();
    drop(service);

    let service = reopen(&temp).await?;

    assert_eq!(service.ledger(), &before);
    assert_eq!(service.weeks_passed(), 1);
    let restored = service.get_member(ada.id)?;
    assert_eq!(restored.joined_at, parse_date("2024-01-15"));
    assert_eq!(restored.total_withdrawal, 22_000);

    Ok(())
}

#[tokio::test]
async fn test_roundtrip_preserves_subsecond_timestamps() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    let joined_at = Utc
        .with_ymd_and_hms(2024, 6, 30, 23, 59, 59)
        .unwrap()
        .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
        .unwrap();
    let member = service.register_at("Ada", Tier::One, joined_at).await?;
    drop(service);

    let service = reopen(&temp).await?;

    assert_eq!(service.get_member(member.id)?.joined_at, joined_at);

    Ok(())
}

#[tokio::test]
async fn test_init_keeps_existing_ledger() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    service.register("Ada", Tier::One).await?;
    service.advance_week().await;
    drop(service);

    let service = SavingsService::init(&db_path(&temp)).await?;

    assert_eq!(service.members().len(), 1);
    assert_eq!(service.weeks_passed(), 1);

    Ok(())
}

#[tokio::test]
async fn test_blob_uses_persisted_field_names() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    service.register("Ada", Tier::Three).await?;
    service.advance_week().await;
    drop(service);

    let repo = Repository::connect(&format!("sqlite:{}", db_path(&temp))).await?;
    let blob = repo.get_blob(STORAGE_KEY).await?.expect("ledger blob");
    let value: serde_json::Value = serde_json::from_str(&blob.value)?;

    assert_eq!(value["weeksPassed"], 1);
    let member = &value["members"][0];
    assert_eq!(member["name"], "Ada");
    assert_eq!(member["tier"], 3);
    assert_eq!(member["amount"], 30_000);
    assert_eq!(member["interest"], 6_000);
    assert_eq!(member["totalWithdrawal"], 36_000);
    assert!(member["joinedAt"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_loads_blob_written_elsewhere() -> Result<()> {
    let temp = TempDir::new()?;
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path(&temp))).await?;
    repo.put_blob(
        STORAGE_KEY,
        r#"{"members":[{"id":"0b7c2f0e-3c1d-4f5e-9a8b-1c2d3e4f5a6b","name":"Chi","tier":1,
            "amount":10000,"interest":1500,"totalWithdrawal":11500,
            "joinedAt":"2024-02-10T08:15:30.250Z"}],"weeksPassed":3}"#,
    )
    .await?;

    let service = reopen(&temp).await?;

    assert_eq!(service.weeks_passed(), 3);
    assert_eq!(service.members()[0].name, "Chi");
    assert_eq!(service.members()[0].interest, 1_500);

    Ok(())
}

#[tokio::test]
async fn test_rejects_corrupt_blob() -> Result<()> {
    let temp = TempDir::new()?;
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path(&temp))).await?;

    let mut ledger = SavingsLedger::new();
    ledger.register("Chi", Tier::One)?;
    let mut snapshot: LedgerSnapshot = ledger.to_snapshot();
    snapshot.members[0].amount = 30_000;
    repo.put_blob(STORAGE_KEY, &serde_json::to_string(&snapshot)?)
        .await?;

    let result = reopen(&temp).await;
    assert!(result.is_err());

    let result = SavingsService::connect(&db_path(&temp)).await;
    assert!(matches!(
        result,
        Err(AppError::Ledger(LedgerError::CorruptSnapshot(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_missing_blob_loads_empty_ledger() -> Result<()> {
    let temp = TempDir::new()?;
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path(&temp))).await?;
    assert!(repo.get_blob(STORAGE_KEY).await?.is_none());

    let service = reopen(&temp).await?;

    assert!(service.members().is_empty());
    assert_eq!(service.weeks_passed(), 0);

    Ok(())
}

#[tokio::test]
async fn test_repository_blob_operations() -> Result<()> {
    let temp = TempDir::new()?;
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path(&temp))).await?;

    repo.put_blob("k", "one").await?;
    repo.put_blob("k", "two").await?;
    assert_eq!(repo.get_blob("k").await?.map(|b| b.value), Some("two".into()));

    assert!(repo.delete_blob("k").await?);
    assert!(!repo.delete_blob("k").await?);
    assert!(repo.get_blob("k").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_failed_write_keeps_in_memory_state() -> Result<()> {
    let (mut service, temp) = test_service().await?;
    service.register("Ada", Tier::Two).await?;

    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", db_path(&temp))).await?;
    sqlx::query("DROP TABLE kv_store").execute(&pool).await?;
    pool.close().await;

    let bola = service.register("Bola", Tier::One).await?;
    assert_eq!(service.members().len(), 2);
    assert_eq!(service.members()[1].id, bola.id);

    assert_eq!(service.advance_week().await, 2_000 + 500);
    assert_eq!(service.weeks_passed(), 1);
    assert!(service.withdraw(bola.id).await.is_some());
    assert_eq!(service.members().len(), 1);

    Ok(())
}
