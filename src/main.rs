//! Salary Prediction Service - Main Entry Point
//!
//! Consumes prediction requests from NATS, runs the inference pipeline
//! against the loaded model bundle, and replies with estimates or typed
//! failures. Supports parallel request processing.

use anyhow::{Context, Result};
use futures::StreamExt;
use salary_prediction_pipeline::{
    bundle,
    config::AppConfig,
    consumer::RequestConsumer,
    history::PredictionLog,
    metrics::{MetricsReporter, ServiceMetrics},
    pipeline::InferencePipeline,
    producer::ReplyProducer,
    types::{PredictionFailure, PredictionReply, PredictionRequest, SalaryEstimate},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("salary_prediction_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Salary Prediction Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        bundle_dir = %config.bundle.dir,
        multiplier = config.display.multiplier,
        "Display multiplier: model output × {:.0}",
        config.display.multiplier
    );

    // Load the model bundle once for the process lifetime. A load failure
    // is fatal: the service must refuse to serve predictions rather than
    // fall back to a null model.
    let model_bundle = bundle::load_cached(&config.bundle.dir, config.bundle.onnx_threads)
        .map_err(|e| {
            error!(error = %e, "Model bundle unavailable, refusing to serve predictions");
            e
        })
        .context("Failed to load model bundle")?;

    info!(
        columns = ?model_bundle.feature_columns(),
        model = model_bundle.model().name(),
        scaler = model_bundle.scaler().is_some(),
        "Model bundle ready"
    );

    let pipeline = Arc::new(InferencePipeline::new(model_bundle));

    // Initialize metrics and the session prediction log
    let metrics = Arc::new(ServiceMetrics::new());
    let prediction_log = Arc::new(PredictionLog::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = RequestConsumer::new(client.clone(), &config.nats.request_subject);
    let producer = Arc::new(ReplyProducer::new(
        client.clone(),
        &config.nats.estimate_subject,
    ));

    let num_workers = config.service.workers;
    info!(
        "Starting request processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.request_subject);
    info!("Publishing estimates to: {}", config.nats.estimate_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Wrap config in Arc for sharing
    let config = Arc::new(config);

    // Start metrics reporter
    let metrics_clone = metrics.clone();
    let report_interval = config.service.report_interval_secs;
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, report_interval);
        reporter.start().await;
    });

    // Process requests in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await?;

        // Clone shared resources for the spawned task
        let pipeline = pipeline.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let prediction_log = prediction_log.clone();
        let config = config.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this request
        tokio::spawn(async move {
            let start_time = Instant::now();
            let reply_to = message.reply.clone();

            match serde_json::from_slice::<PredictionRequest>(&message.payload) {
                Ok(request) => {
                    let request_id = request.request_id.clone();

                    let reply = match pipeline.predict(&request) {
                        Ok(prediction) => {
                            let processing_time = start_time.elapsed();
                            metrics.record_estimate(processing_time);

                            let estimate = SalaryEstimate::new(
                                &request_id,
                                prediction.model_output,
                                config.display.multiplier,
                            );
                            prediction_log.append(request, estimate.clone());

                            info!(
                                request_id = %request_id,
                                display_value = format!(
                                    "{} {:.2}",
                                    config.display.currency, estimate.display_value
                                ),
                                processing_time_us = processing_time.as_micros(),
                                "Estimate produced"
                            );

                            PredictionReply::Ok(estimate)
                        }
                        Err(e) => {
                            metrics.record_failure(e.kind());
                            warn!(
                                request_id = %request_id,
                                kind = e.kind(),
                                error = %e,
                                "Prediction failed"
                            );
                            PredictionReply::Error(PredictionFailure::from_error(&request_id, &e))
                        }
                    };

                    if let Err(e) = producer.publish(&reply, reply_to).await {
                        error!(
                            request_id = %request_id,
                            error = %e,
                            "Failed to publish reply"
                        );
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                    // Log progress every 100 requests
                    if count % 100 == 0 {
                        let throughput = metrics.get_throughput();
                        let processing_stats = metrics.get_processing_stats();
                        info!(
                            processed = count,
                            throughput = format!("{:.1} req/s", throughput),
                            avg_latency_us = processing_stats.mean_us,
                            "Processing milestone"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize prediction request");
                }
            }

            debug!(elapsed_us = start_time.elapsed().as_micros(), "Request handled");

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Service shutting down...");
    metrics.print_summary();
    prediction_log.clear();

    Ok(())
}
