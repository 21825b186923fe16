use clap::ArgMatches;
use docqc_runtime::routing::{RoutingDecision, ScoreClassifier};
use docqc_runtime::DocumentId;

pub async fn run(matches: &ArgMatches) {
    let config = match super::load_config(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let Some(score) = matches.get_one::<f64>("score").copied() else {
        eprintln!("✗ A score is required");
        std::process::exit(2);
    };
    let safety_critical = matches.get_flag("safety-critical");

    let classifier = ScoreClassifier::new(&config.routing);
    let classification = match classifier.classify(score, safety_critical) {
        Ok(classification) => classification,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    if matches.get_flag("json") {
        let decision = RoutingDecision::from_classification(
            DocumentId::new("cli"),
            score,
            classification,
            chrono::Utc::now(),
        );
        match serde_json::to_string_pretty(&decision) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ Failed to serialize decision: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let path = classification.path;
    println!("Score        {:.3}", score);
    println!("Band         {}", classification.band.as_str());
    println!("Path         {}", path);
    println!("Next action  {:?}", path.next_action());
    println!("Cache TTL    {}s", classification.cache_ttl_seconds);
    match path.review_priority() {
        Some(priority) => println!(
            "Review       {} ({})",
            priority.as_str(),
            path.review_reason().unwrap_or_default()
        ),
        None => println!("Review       not required"),
    }
}
