use clap::ArgMatches;
use docqc_runtime::api::{HttpApiConfig, HttpApiServer};
use docqc_runtime::metrics::create_exporter;
use docqc_runtime::{MaintenanceLoop, QualityEngine};
use std::sync::Arc;

pub async fn run(matches: &ArgMatches) {
    let mut config = match super::load_config(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(port) = matches.get_one::<u16>("port") {
        config.api.port = *port;
    }
    if let Some(host) = matches.get_one::<String>("host") {
        config.api.host = host.clone();
    }
    if let Err(e) = config.validate() {
        eprintln!("✗ Invalid configuration: {}", e);
        std::process::exit(2);
    }

    super::init_tracing(&config.logging);

    let engine = Arc::new(QualityEngine::new(&config));

    let exporter = if config.maintenance.snapshot.enabled {
        match create_exporter(&config.maintenance.snapshot) {
            Ok(exporter) => Some(exporter),
            Err(e) => {
                eprintln!("✗ Snapshot export misconfigured: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        None
    };

    let maintenance = MaintenanceLoop::new(
        engine.clone(),
        exporter,
        config.maintenance.sweep_interval,
    );
    maintenance.start();

    println!("✓ Starting docqc quality engine...");
    println!(
        "✓ Query API on http://{}:{}/api/v1/confidence",
        config.api.host, config.api.port
    );
    println!(
        "→ TTLs: high {}s, medium {}s, low {}s",
        config.routing.ttl.high_seconds,
        config.routing.ttl.medium_seconds,
        config.routing.ttl.low_seconds
    );
    println!(
        "→ Safety-critical floor {:.2}, trend window {}",
        config.routing.safety_critical_floor, config.trend.window_size
    );
    if let Some(file) = config
        .maintenance
        .snapshot
        .file
        .as_ref()
        .filter(|_| config.maintenance.snapshot.enabled)
    {
        println!("→ Dashboard snapshots written to {}", file.path.display());
    }
    println!("\nPress Ctrl+C to stop");

    let server = HttpApiServer::new(HttpApiConfig::from(&config.api), engine.clone());
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutdown signal received");
    };

    let result = server.start_with_shutdown(shutdown_signal).await;
    maintenance.shutdown().await;

    match result {
        Ok(()) => println!("✓ docqc stopped"),
        Err(e) => {
            eprintln!("✗ API server error: {}", e);
            std::process::exit(1);
        }
    }
}
