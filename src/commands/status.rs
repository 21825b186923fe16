use clap::ArgMatches;
use serde_json::Value;
use std::time::Duration;

pub async fn run(matches: &ArgMatches) {
    let base = matches
        .get_one::<String>("url")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());

    println!("📊 docqc status ({})\n", base);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("✗ Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let health = match fetch(&client, &format!("{}/api/v1/health", base)).await {
        Ok(health) => health,
        Err(e) => {
            println!("✗ Not running ({})", e);
            println!("  Start with: docqc up");
            std::process::exit(1);
        }
    };
    println!(
        "Server       ✓ {} (v{}, up {}s)",
        health["status"].as_str().unwrap_or("unknown"),
        health["version"].as_str().unwrap_or("?"),
        health["uptime_seconds"].as_u64().unwrap_or(0)
    );

    if let Ok(quality) = fetch(&client, &format!("{}/api/v1/confidence/health", base)).await {
        println!(
            "Quality      {}",
            quality["status"].as_str().unwrap_or("unknown")
        );
        if let Some(issues) = quality["issues"].as_array() {
            for issue in issues.iter().filter_map(Value::as_str) {
                println!("  ⚠️  {}", issue);
            }
        }
    }

    println!("\n📈 Metrics:");
    match fetch(&client, &format!("{}/api/v1/confidence/metrics/summary", base)).await {
        Ok(m) => {
            println!("  • Documents:        {}", m["total_documents"]);
            println!("  • Avg confidence:   {}", m["average_confidence"]);
            println!("  • High confidence:  {}%", m["high_confidence_percentage"]);
            println!(
                "  • Needing review:   {} ({}%)",
                m["documents_requiring_review"], m["review_percentage"]
            );
            println!(
                "  • Safety-critical low confidence: {}",
                m["safety_critical_low_confidence"]
            );
            println!(
                "  • Trend:            {} (recent avg {})",
                m["confidence_trend"].as_str().unwrap_or("unknown"),
                m["recent_avg_confidence"]
            );
        }
        Err(e) => println!("  ✗ {}", e),
    }

    println!("\n📝 Review queue:");
    match fetch(&client, &format!("{}/api/v1/confidence/review-queue?limit=5", base)).await {
        Ok(q) => {
            println!(
                "  • Pending: {} (urgent {}, high {})",
                q["total_count"], q["pending_urgent"], q["pending_high"]
            );
            for item in q["items"].as_array().into_iter().flatten() {
                println!(
                    "    - [{}] {} score {}",
                    item["priority"].as_str().unwrap_or("?"),
                    item["document_id"].as_str().unwrap_or("?"),
                    item["confidence_score"]
                );
            }
        }
        Err(e) => println!("  ✗ {}", e),
    }

    println!("\n🚨 Alerts:");
    match fetch(&client, &format!("{}/api/v1/confidence/alerts", base)).await {
        Ok(a) => {
            let alerts = a["alerts"].as_array().cloned().unwrap_or_default();
            if alerts.is_empty() {
                println!("  (none)");
            }
            for alert in alerts {
                println!(
                    "  • [{}] {}",
                    alert["severity"].as_str().unwrap_or("?"),
                    alert["message"].as_str().unwrap_or("")
                );
            }
        }
        Err(e) => println!("  ✗ {}", e),
    }

    println!();
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Value, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await
}
