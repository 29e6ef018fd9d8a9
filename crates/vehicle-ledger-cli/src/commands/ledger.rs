use anyhow::{Result, bail};
use std::path::Path;

use vehicle_ledger_types::{Identity, MaintenanceRecord};

use crate::config::LedgerConfig;
use crate::session::LedgerSession;

pub struct AppendRequest {
    pub caller: String,
    pub vin: String,
    pub mileage: u64,
    pub content_ref: String,
    pub category: String,
}

pub async fn init(state_dir: &Path, config: &LedgerConfig, admin: String) -> Result<()> {
    let mut session = LedgerSession::create(state_dir, config, Identity::new(&admin)).await?;
    println!("Initialized ledger in {}", state_dir.display());
    println!("  Admin:     {admin}");
    println!("  Recorders: {admin}");
    print_events(&mut session)
}

pub async fn authorize(
    state_dir: &Path,
    config: &LedgerConfig,
    caller: String,
    target: String,
) -> Result<()> {
    let mut session = LedgerSession::open(state_dir, config)?;
    session
        .ledger()
        .authorize(&Identity::new(caller), Identity::new(&target))
        .await?;
    session.persist().await?;
    println!("Authorized recorder: {target}");
    print_events(&mut session)
}

pub async fn revoke(
    state_dir: &Path,
    config: &LedgerConfig,
    caller: String,
    target: String,
) -> Result<()> {
    let mut session = LedgerSession::open(state_dir, config)?;
    session
        .ledger()
        .revoke(&Identity::new(caller), Identity::new(&target))
        .await?;
    session.persist().await?;
    println!("Revoked recorder: {target}");
    print_events(&mut session)
}

pub async fn is_authorized(state_dir: &Path, config: &LedgerConfig, id: String) -> Result<()> {
    let session = LedgerSession::open(state_dir, config)?;
    let authorized = session.ledger().is_authorized(&Identity::new(id)).await;
    println!("{authorized}");
    Ok(())
}

pub async fn append(state_dir: &Path, config: &LedgerConfig, request: AppendRequest) -> Result<()> {
    let mut session = LedgerSession::open(state_dir, config)?;
    let handle = session
        .ledger()
        .append_record(
            &Identity::new(request.caller),
            &request.vin,
            request.mileage,
            request.content_ref,
            request.category,
        )
        .await?;
    session.persist().await?;
    println!("Appended record #{} for {}", handle.index, handle.vin);
    println!("  ID:   {}", handle.id);
    println!("  Hash: {}", handle.hash);
    print_events(&mut session)
}

pub async fn history(state_dir: &Path, config: &LedgerConfig, vin: String, json: bool) -> Result<()> {
    let session = LedgerSession::open(state_dir, config)?;
    let records = session.ledger().history(&vin).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No records for {vin}.");
        return Ok(());
    }
    for (index, record) in records.iter().enumerate() {
        print_record(index, record);
    }
    Ok(())
}

pub async fn verify(state_dir: &Path, config: &LedgerConfig, vin: Option<String>) -> Result<()> {
    let session = LedgerSession::open(state_dir, config)?;
    let vins: Vec<String> = match vin {
        Some(vin) => vec![vin],
        None => session
            .ledger()
            .vins()
            .await?
            .into_iter()
            .map(String::from)
            .collect(),
    };

    for vin in &vins {
        session.ledger().verify_history(vin).await?;
        println!("  {vin}: ok");
    }
    println!("Verified {} vehicle histories.", vins.len());
    Ok(())
}

pub async fn root(state_dir: &Path, config: &LedgerConfig, vin: String) -> Result<()> {
    let session = LedgerSession::open(state_dir, config)?;
    match session.ledger().history_root(&vin).await? {
        Some(root) => println!("{root}"),
        None => bail!("No records for {vin}"),
    }
    Ok(())
}

fn print_record(index: usize, r: &MaintenanceRecord) {
    println!(
        "  #{index:<4} {}  {:>10} mi  {:<12} by {}",
        r.timestamp.format("%Y-%m-%d %H:%M:%S"),
        r.mileage,
        r.category,
        r.recorder
    );
    println!("        ref: {}", r.content_ref);
}

fn print_events(session: &mut LedgerSession) -> Result<()> {
    for event in session.drain_events() {
        println!("event: {}", serde_json::to_string(&event)?);
    }
    Ok(())
}
