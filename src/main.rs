use anyhow::Context;
use ausf_operator::config::{CliArgs, Command};
use ausf_operator::domain::ports::RelationSubstrate;
use ausf_operator::utils::error::ErrorSeverity;
use ausf_operator::utils::{logger, validation::Validate};
use ausf_operator::{
    DirWorkload, DispatchReport, EngineState, JsonRelationStore, OperatorConfig, OperatorEngine,
    OperatorError, PlaceholderRenderer,
};
use clap::Parser;
use std::path::Path;

const RELATIONS_FILE: &str = "relations.json";
const ENGINE_STATE_FILE: &str = "engine.json";

type Engine = OperatorEngine<DirWorkload, JsonRelationStore, PlaceholderRenderer, bool>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting ausf-operator");
    tracing::debug!("CLI args: {:?}", args);

    let config = load_config(&args.config)?;

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    std::fs::create_dir_all(&args.state_dir)
        .with_context(|| format!("creating state directory {}", args.state_dir.display()))?;

    let relations = JsonRelationStore::open(
        args.state_dir.join(RELATIONS_FILE),
        &config.unit.app_name,
    )?;
    let workload = DirWorkload::new(args.workload_root());
    let renderer = match &config.templates_dir {
        Some(dir) => PlaceholderRenderer::with_overrides(dir)?,
        None => PlaceholderRenderer::builtin()?,
    };
    let state_path = args.state_dir.join(ENGINE_STATE_FILE);
    let state = load_state(&state_path)?;
    let leader = config.unit.leader;

    let mut engine =
        OperatorEngine::new(config.clone(), workload, relations, renderer, leader).with_state(state);

    if args.dry_run {
        tracing::info!("DRY RUN MODE - nothing will be written");
        display_config_summary(&config);
        display_status(&engine, &config).await?;
        return Ok(());
    }

    let result = match &args.command {
        Command::Status => {
            display_status(&engine, &config).await?;
            return Ok(());
        }
        Command::Advertise => match engine.advertiser().advertise_all().await {
            Ok(Some(written)) => {
                println!("✅ Advertised endpoint ({} relation(s) updated)", written);
                Ok(DispatchReport::default())
            }
            Ok(None) => {
                println!("⏸  Not advertising: not leader or service not running");
                Ok(DispatchReport::default())
            }
            Err(e) => Err(e),
        },
        Command::Redeliver => engine.redeliver().await,
        command => match command.trigger() {
            Some(trigger) => engine.deliver(trigger).await,
            None => Ok(DispatchReport::default()),
        },
    };

    // deferred triggers must survive a failed pass too
    save_state(&state_path, engine.state())?;

    match result {
        Ok(report) => {
            for trigger in &report.completed {
                println!("✅ handled {}", trigger);
            }
            for trigger in &report.deferred {
                println!("⏸  deferred {}", trigger);
            }
            for trigger in &report.ignored {
                println!("·  ignored {}", trigger);
            }
            println!("Unit status: {}", engine.status());
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Operator pass failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(error: &OperatorError) -> i32 {
    match error.severity() {
        ErrorSeverity::Medium => 2, // retryable
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn load_config(path: &Path) -> anyhow::Result<OperatorConfig> {
    if !path.exists() {
        tracing::warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(OperatorConfig::default());
    }
    tracing::info!("Loading configuration from: {}", path.display());
    OperatorConfig::from_file(path)
        .with_context(|| format!("loading config file {}", path.display()))
}

fn load_state(path: &Path) -> anyhow::Result<EngineState> {
    if !path.exists() {
        return Ok(EngineState::default());
    }
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn save_state(path: &Path, state: &EngineState) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(state)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn display_config_summary(config: &OperatorConfig) {
    println!("📋 Configuration Summary:");
    println!("   Application: {} (model {})", config.unit.app_name, config.unit.model_name);
    println!("   Leader: {}", config.unit.leader);
    println!(
        "   Workload: container {} service {}",
        config.workload.container, config.workload.service
    );
    println!("   Service FQDN: {}", config.service_fqdn());
    println!("   Config path: {}", config.config_path());
    println!(
        "   SBI: {} port {} api {}",
        config.sbi.interface_name, config.sbi.port, config.sbi.api_version
    );
    println!(
        "   Relations: nrf={} udm={} ausf={}",
        config.relations.nrf, config.relations.udm, config.relations.ausf
    );
    for port in config.service_ports() {
        println!(
            "   Service port {}: {}/{} -> {}",
            port.name, port.port, port.protocol, port.target_port
        );
    }
}

async fn display_status(engine: &Engine, config: &OperatorConfig) -> anyhow::Result<()> {
    let observation = engine.reconciler().observe().await?;
    let signal = observation.signal;

    println!("Unit status: {}", engine.status());
    println!("Readiness:");
    println!("   workload reachable:  {}", signal.workload_reachable);
    println!("   NRF relation:        {}", signal.nrf_relation_exists);
    println!("   UDM relation:        {}", signal.udm_relation_exists);
    println!("   NRF data complete:   {}", signal.nrf_fact_complete);
    println!("   UDM data complete:   {}", signal.udm_fact_complete);

    if signal.workload_reachable {
        println!(
            "   config pushed:       {}",
            engine.reconciler().config_file_is_pushed().await?
        );
        println!(
            "   service started:     {}",
            engine.advertiser().service_started().await?
        );
    }

    let consumers = engine
        .relations()
        .list_relations(&config.relations.ausf)
        .await?;
    println!("Consumers: {}", consumers.len());

    if engine.deferred().is_empty() {
        println!("Deferred triggers: none");
    } else {
        println!("Deferred triggers:");
        for queued in engine.deferred() {
            println!(
                "   {} (attempts {}, first deferred {})",
                queued.trigger,
                queued.attempts,
                queued
                    .first_deferred_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }
    Ok(())
}
