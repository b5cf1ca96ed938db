use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::SavingsService;
use crate::domain::{format_amount, format_rate, Member, Tier, CAPACITY};

/// Arca - Pooled Savings Club Tracker
#[derive(Parser)]
#[command(name = "arca")]
#[command(about = "A local-first tracker for a pooled-savings club with weekly interest")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "ARCA_DATABASE", default_value = "arca.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Show the tier table
    Tiers,

    /// Register a new member
    Register {
        /// Member name (at least 2 characters)
        name: String,

        /// Savings tier: 1, 2 or 3
        #[arg(short, long)]
        tier: String,
    },

    /// Show aggregate savings and the member table
    Dashboard,

    /// List members with their withdrawal values
    Members,

    /// Withdraw a member from the club
    Withdraw {
        /// Member ID (or a unique prefix of it)
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Advance the club by one or more weeks, accruing interest
    AdvanceWeek {
        /// Number of weeks to advance
        #[arg(short, long, default_value = "1")]
        weeks: u32,
    },

    /// Show the weekly progress summary
    Summary,

    /// Export data to CSV or JSON
    Export {
        /// What to export: members, snapshot
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format for members: csv, json (default: csv)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Import a JSON snapshot, replacing the current ledger
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Default log filter when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let service = SavingsService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
                println!(
                    "Members: {}/{}  Week: {}",
                    service.members().len(),
                    CAPACITY,
                    service.weeks_passed()
                );
            }

            Commands::Tiers => run_tiers_command(),

            Commands::Register { name, tier } => {
                let mut service = SavingsService::connect(&self.database).await?;
                let tier: Tier = tier.parse()?;
                let member = service.register(&name, tier).await?;

                println!(
                    "Registered {} on {} ({} at {} weekly) ({})",
                    member.name,
                    member.tier,
                    format_amount(member.amount),
                    format_rate(member.tier.rate_bps()),
                    member.id
                );
                println!(
                    "Slots remaining: {}/{}",
                    service.ledger().available_slots(),
                    CAPACITY
                );
            }

            Commands::Dashboard => {
                let service = SavingsService::connect(&self.database).await?;
                run_dashboard_command(&service);
            }

            Commands::Members => {
                let service = SavingsService::connect(&self.database).await?;
                run_members_command(&service);
            }

            Commands::Withdraw { id, yes } => {
                let mut service = SavingsService::connect(&self.database).await?;
                run_withdraw_command(&mut service, &id, yes).await?;
            }

            Commands::AdvanceWeek { weeks } => {
                let mut service = SavingsService::connect(&self.database).await?;
                let accrued = service.advance_weeks(weeks).await;
                println!(
                    "Advanced {} {}: now week {}, interest accrued {}",
                    weeks,
                    if weeks == 1 { "week" } else { "weeks" },
                    service.weeks_passed(),
                    format_amount(accrued)
                );
            }

            Commands::Summary => {
                let service = SavingsService::connect(&self.database).await?;
                run_summary_command(&service);
            }

            Commands::Export {
                export_type,
                output,
                format,
            } => {
                let service = SavingsService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref(), format.as_deref())?;
            }

            Commands::Import { input, dry_run } => {
                let mut service = SavingsService::connect(&self.database).await?;
                run_import_command(&mut service, input.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

fn run_tiers_command() {
    println!(
        "{:<8} {:>12} {:>8} {:>14} {:>16}",
        "TIER", "PRINCIPAL", "RATE", "WEEKLY", "AFTER 1 WEEK"
    );
    println!("{}", "-".repeat(62));
    for tier in Tier::ALL {
        let quote = tier.quote();
        println!(
            "{:<8} {:>12} {:>8} {:>14} {:>16}",
            tier.to_string(),
            format_amount(quote.principal),
            format_rate(quote.rate_bps),
            format_amount(quote.weekly_interest),
            format_amount(quote.first_week_withdrawal)
        );
    }
}

fn run_dashboard_command(service: &SavingsService) {
    let dashboard = service.dashboard();

    println!("{:<25} {:>15}", "Total Savings", format_amount(dashboard.total_principal));
    println!(
        "{:<25} {:>15}",
        "Members",
        format!("{}/{}", dashboard.member_count, dashboard.capacity)
    );
    println!(
        "{:<25} {:>15}",
        format!(
            "Interest ({} {})",
            dashboard.weeks_passed,
            if dashboard.weeks_passed == 1 { "week" } else { "weeks" }
        ),
        format_amount(dashboard.total_interest)
    );
    println!("{:<25} {:>15}", "Pool Return (20%)", format_amount(dashboard.pool_return));
    println!();

    if dashboard.members.is_empty() {
        println!("No members yet. {} slots available.", dashboard.available_slots);
        return;
    }

    println!(
        "{:<20} {:<8} {:>12} {:>12} {:>14}",
        "NAME", "TIER", "AMOUNT", "INTEREST", "WITHDRAWAL"
    );
    println!("{}", "-".repeat(70));
    for row in &dashboard.members {
        println!(
            "{:<20} {:<8} {:>12} {:>12} {:>14}",
            truncate(&row.name, 20),
            row.tier.to_string(),
            format_amount(row.amount),
            format_amount(row.interest),
            format_amount(row.total_withdrawal)
        );
    }
    println!("{}", "-".repeat(70));
    println!(
        "{:<20} {:<8} {:>12} {:>12} {:>14}",
        "TOTAL",
        "",
        format_amount(dashboard.total_principal),
        format_amount(dashboard.total_interest),
        format_amount(dashboard.total_withdrawal)
    );
}

fn run_members_command(service: &SavingsService) {
    let members = service.members();
    if members.is_empty() {
        println!("No members found.");
        return;
    }

    for member in members {
        print_member(member);
        println!();
    }
}

fn print_member(member: &Member) {
    println!("{} ({})", member.name, member.id);
    println!(
        "  Tier:        {} ({} weekly)",
        member.tier,
        format_rate(member.tier.rate_bps())
    );
    println!("  Amount:      {}", format_amount(member.amount));
    println!("  Interest:    {}", format_amount(member.interest));
    println!("  Withdrawal:  {}", format_amount(member.total_withdrawal));
    println!("  Joined on:   {}", member.joined_at.format("%b %-d, %Y"));
}

async fn run_withdraw_command(service: &mut SavingsService, id: &str, yes: bool) -> Result<()> {
    let member_id = resolve_member_id(service, id)?;
    let member = service.get_member(member_id)?.clone();

    if !yes {
        print_member(&member);
        println!();
        if !confirm(&format!(
            "Withdraw {} and pay out {}?",
            member.name,
            format_amount(member.total_withdrawal)
        ))? {
            println!("Withdrawal cancelled.");
            return Ok(());
        }
    }

    if let Some(removed) = service.withdraw(member_id).await {
        println!(
            "Withdrew {}: payout {} ({} principal + {} interest)",
            removed.name,
            format_amount(removed.total_withdrawal),
            format_amount(removed.amount),
            format_amount(removed.interest)
        );
    }
    Ok(())
}

fn run_summary_command(service: &SavingsService) {
    let summary = service.weekly_summary();
    println!("Week {}", summary.week);
    println!("  Members:              {}", summary.member_count);
    println!("  Total Interest Earned: {}", format_amount(summary.total_interest));
    if summary.member_count > 0 {
        println!("  Average Return:       {:.2}%", summary.average_return_pct);
    } else {
        println!("  Average Return:       0%");
    }
}

fn run_export_command(
    service: &SavingsService,
    export_type: &str,
    output: Option<&str>,
    format: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match (export_type, format.unwrap_or("csv")) {
        ("members", "csv") => {
            let count = exporter.export_members_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} members", count);
            }
        }
        ("members", "json") => {
            let count = exporter.export_members_json(writer)?;
            if output.is_some() {
                eprintln!("Exported {} members", count);
            }
        }
        ("members", other) => {
            anyhow::bail!("Invalid format '{}'. Valid formats: csv, json", other);
        }
        ("snapshot", _) => {
            let snapshot = exporter.export_snapshot_json(writer)?;
            if output.is_some() {
                eprintln!(
                    "Exported snapshot: {} members, week {}",
                    snapshot.members.len(),
                    snapshot.weeks_passed
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: members, snapshot",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &mut SavingsService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::Importer;
    use std::fs::File;
    use std::io::{stdin, Read};

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = Importer::new(service)
        .import_snapshot_json(reader, dry_run)
        .await?;

    if result.applied {
        println!("Import complete");
    } else {
        println!("Validation successful");
    }
    println!("  Members: {}", result.members);
    println!("  Week:    {}", result.weeks_passed);

    Ok(())
}

/// Resolve a full member id or a unique prefix of one.
fn resolve_member_id(service: &SavingsService, id: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches = service.find_members_by_id_prefix(id);
    match matches.as_slice() {
        [member] => Ok(member.id),
        [] => anyhow::bail!("Member not found: {}", id),
        _ => anyhow::bail!(
            "Ambiguous member ID '{}' matches {} members",
            id,
            matches.len()
        ),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{stdin, stdout, Write};

    print!("{} [y/N] ", prompt);
    stdout().flush()?;

    let mut answer = String::new();
    stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
