//! Test Request Producer
//!
//! Generates and publishes sample salary prediction requests to NATS for
//! pipeline testing. Field values stay within the input surface's domain
//! bounds (age 18-80, experience 0-40).

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// Request structure matching the pipeline's expected format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PredictionRequest {
    request_id: String,
    fields: serde_json::Map<String, serde_json::Value>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
        }
    }

    /// Generate a request with category values from the reference fitted
    /// sets. These must match the bundle's encoder classes exactly;
    /// near-misses like "Bachelor" for "Bachelor's" are rejected by the
    /// pipeline.
    fn generate(&mut self) -> PredictionRequest {
        self.request_counter += 1;

        let age = self.rng.gen_range(18..=80);
        // Experience cannot exceed working years
        let max_experience = (age - 18).min(40);
        let experience = self.rng.gen_range(0..=max_experience);

        let mut fields = serde_json::Map::new();
        fields.insert("Age".to_string(), json!(age));
        fields.insert(
            "Gender".to_string(),
            json!(self.random_choice(&["Female", "Male"])),
        );
        fields.insert(
            "Education Level".to_string(),
            json!(self.random_choice(&["Bachelor's", "Master's", "PhD"])),
        );
        fields.insert(
            "Job Title".to_string(),
            json!(self.random_choice(&["Analyst", "Developer", "Director", "Manager"])),
        );
        fields.insert("Years of Experience".to_string(), json!(experience));

        PredictionRequest {
            request_id: format!("req_{:012}", self.request_counter),
            fields,
            timestamp: chrono::Utc::now(),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("request_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("salary.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, delay_ms).await;
        }
    };

    // Generate and publish requests
    let mut generator = RequestGenerator::new();

    info!("Starting to publish {} requests...", count);

    for i in 0..count {
        let request = generator.generate();
        let payload = serde_json::to_vec(&request)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!("Published {}/{} requests", i + 1, count);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!("Completed! Published {} requests", count);

    Ok(())
}

async fn run_dry_mode(count: u64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new();

    for i in 0..count {
        let request = generator.generate();
        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
