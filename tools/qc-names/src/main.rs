//! qc-names: Quantum Name Service CLI
//!
//! Runs the registry in-process: a scripted deploy/register/modify/transfer
//! session, price lookups, and decoding of token URIs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use qc_18_name_registry::prelude::*;
use qns_telemetry::TelemetryConfig;

const DEMO_DEPLOYER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const DEMO_RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
const DEMO_DOMAIN: &str = "ttttt";
const DEMO_DATA: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// qc-names: Quantum Name Service CLI
#[derive(Parser, Debug)]
#[command(name = "qc-names")]
#[command(about = "In-process tools for the Quantum Name Service registry")]
struct Args {
    /// Registry config file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy a fresh registry and run the scripted session
    Demo,
    /// Show the registration and renewal price of a name
    Price { name: String },
    /// Decode a `data:application/json;base64,` token URI
    Decode { uri: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    qns_telemetry::init_telemetry(&TelemetryConfig::from_env())
        .context("failed to initialize telemetry")?;

    let config = match &args.config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => RegistryConfig::default(),
    };

    match args.command {
        Command::Demo => run_demo(config).await?,
        Command::Price { name } => print_price(config, &name)?,
        Command::Decode { uri } => decode(&uri)?,
    }

    if args.metrics {
        println!("{}", qns_telemetry::gather_metrics()?);
    }
    Ok(())
}

async fn run_demo(mut config: RegistryConfig) -> Result<()> {
    let deployer: Address = DEMO_DEPLOYER.parse()?;
    let recipient: Address = DEMO_RECIPIENT.parse()?;
    if config.controller.is_zero() {
        config.controller = deployer;
    }

    let payouts = Arc::new(LedgerPayoutSink::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let service = NameRegistryService::new(
        ServiceConfig { registry: config },
        Arc::new(SystemTimeSource),
        payouts.clone(),
        bus.clone(),
    )?;
    println!("Registry deployed by: {}", deployer.to_hex());

    // Pays 0.006 for a 0.005 name; the excess is kept.
    let payment = units_to_amount(6, 3);
    let receipt = service
        .register(deployer, DEMO_DOMAIN, &deployer.to_hex(), payment)
        .await?;
    info!(id = receipt.id, "Demo domain registered");
    print_record(&service, DEMO_DOMAIN).await?;

    service.modify_data(deployer, DEMO_DOMAIN, DEMO_DATA).await?;
    print_record(&service, DEMO_DOMAIN).await?;

    println!("Treasury balance: {}", service.treasury_balance().await);
    println!("{}", service.token_uri(receipt.id).await?);

    println!("\n{}", service.owner_of(receipt.id).await?.to_hex());
    service
        .transfer_token(deployer, receipt.id, deployer, recipient)
        .await?;
    println!("{}", service.owner_of(receipt.id).await?.to_hex());
    print_record(&service, DEMO_DOMAIN).await?;

    let withdrawn = service.withdraw(deployer).await?;
    println!(
        "Withdrew {withdrawn} to controller (ledger balance {})",
        payouts.balance_of(&deployer)
    );
    println!("Events published: {}", bus.events_published());
    Ok(())
}

async fn print_record<T, P, E>(service: &NameRegistryService<T, P, E>, name: &str) -> Result<()>
where
    T: TimeSource + 'static,
    P: PayoutSink + 'static,
    E: EventPublisher + 'static,
{
    let record = service.get_record(name).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn print_price(config: RegistryConfig, name: &str) -> Result<()> {
    let engine = RegistryEngine::new(config)?;
    let price = engine.price(name)?;
    let renewal = engine.renew_cost(name)?;
    println!("{name}: register {price}, renew {renewal}");
    Ok(())
}

fn decode(uri: &str) -> Result<()> {
    let document = decode_document(uri).context("token URI did not decode")?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    println!("{}", decode_image(&document.image)?);
    Ok(())
}
