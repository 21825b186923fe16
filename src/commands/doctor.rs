use clap::ArgMatches;
use docqc_runtime::config::Config;
use std::path::Path;

pub async fn run(matches: &ArgMatches) {
    println!("🔍 Checking docqc setup...\n");

    let mut all_ok = true;

    print!("• Checking configuration... ");
    let config = match super::load_config(matches) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            config
        }
        Err(e) => {
            println!("✗ {}", e);
            println!("\n⚠️  Fix the configuration before running: docqc up");
            std::process::exit(1);
        }
    };

    print!("• Checking API port... ");
    if is_port_in_use(&config.api.host, config.api.port) {
        println!("✗ {}:{} is in use", config.api.host, config.api.port);
        all_ok = false;
    } else {
        println!("✓ {}:{} available", config.api.host, config.api.port);
    }

    print!("• Checking snapshot export... ");
    match snapshot_dir(&config) {
        None => println!("○ Disabled (set DOCQC_SNAPSHOT_PATH to enable)"),
        Some(dir) if is_writable_dir(dir) => println!("✓ {} is writable", dir.display()),
        Some(dir) => {
            println!("✗ {} is not a writable directory", dir.display());
            all_ok = false;
        }
    }

    println!("• Routing thresholds:");
    println!(
        "    TTL high/medium/low: {}s / {}s / {}s",
        config.routing.ttl.high_seconds,
        config.routing.ttl.medium_seconds,
        config.routing.ttl.low_seconds
    );
    println!(
        "    Safety-critical floor: {:.2}",
        config.routing.safety_critical_floor
    );
    println!(
        "    Trend window: {} (noise band ±{:.3})",
        config.trend.window_size, config.trend.noise_band
    );
    println!(
        "    Review volume alert above {} items",
        config.alerts.high_review_volume_threshold
    );

    println!();
    if all_ok {
        println!("✅ All checks passed! You're ready to run: docqc up");
    } else {
        println!("⚠️  Some checks failed. Fix the issues above before running docqc up");
        std::process::exit(1);
    }
}

fn is_port_in_use(host: &str, port: u16) -> bool {
    std::net::TcpListener::bind((host, port)).is_err()
}

fn snapshot_dir(config: &Config) -> Option<&Path> {
    let snapshot = &config.maintenance.snapshot;
    if !snapshot.enabled {
        return None;
    }
    snapshot.file.as_ref().map(|file| {
        file.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    })
}

fn is_writable_dir(dir: &Path) -> bool {
    if !dir.exists() {
        // The exporter creates missing directories; check the nearest ancestor.
        return dir.parent().map(is_writable_dir).unwrap_or(false);
    }
    std::fs::metadata(dir)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false)
}
