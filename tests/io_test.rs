mod common;

use anyhow::Result;
use arca::application::AppError;
use arca::domain::{LedgerSnapshot, Tier};
use arca::io::{Exporter, Importer};
use common::{parse_date, reopen, test_service};

#[tokio::test]
async fn test_export_members_csv() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    service
        .register_at("Ada", Tier::Two, parse_date("2024-01-15"))
        .await?;
    service.advance_week().await;

    let mut out = Vec::new();
    let count = Exporter::new(&service).export_members_csv(&mut out)?;
    let csv = String::from_utf8(out)?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(count, 1);
    assert_eq!(
        lines[0],
        "id,name,tier,amount,interest,total_withdrawal,joined_at"
    );
    assert!(lines[1].contains(",Ada,2,20000,2000,22000,2024-01-15T00:00:00+00:00"));

    Ok(())
}

#[tokio::test]
async fn test_snapshot_export_import_roundtrip() -> Result<()> {
    let (mut source, _source_temp) = test_service().await?;
    source.register("Ada", Tier::One).await?;
    source.register("Bola", Tier::Three).await?;
    source.advance_weeks(2).await;

    let mut out = Vec::new();
    let exported = Exporter::new(&source).export_snapshot_json(&mut out)?;
    let parsed: LedgerSnapshot = serde_json::from_slice(&out)?;
    assert_eq!(parsed, exported);

    let (mut target, target_temp) = test_service().await?;
    let result = Importer::new(&mut target)
        .import_snapshot_json(out.as_slice(), false)
        .await?;

    assert!(result.applied);
    assert_eq!(result.members, 2);
    assert_eq!(result.weeks_passed, 2);
    assert_eq!(target.ledger(), source.ledger());

    drop(target);
    let reopened = reopen(&target_temp).await?;
    assert_eq!(reopened.ledger(), source.ledger());

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_leaves_ledger_untouched() -> Result<()> {
    let (mut source, _source_temp) = test_service().await?;
    source.register("Ada", Tier::One).await?;
    let json = serde_json::to_string(&source.ledger().to_snapshot())?;

    let (mut target, _target_temp) = test_service().await?;
    let result = Importer::new(&mut target)
        .import_snapshot_json(json.as_bytes(), true)
        .await?;

    assert!(!result.applied);
    assert_eq!(result.members, 1);
    assert!(target.members().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_rejects_malformed_json() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = Importer::new(&mut service)
        .import_snapshot_json(&b"{\"members\": 42}"[..], false)
        .await;

    assert!(matches!(result, Err(AppError::Serialization(_))));

    Ok(())
}
