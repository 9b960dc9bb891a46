mod bluetooth;
mod config;
mod models;
mod pipeline;
mod utils;

use log::{error, info, warn};
use time::OffsetDateTime;

use bluetooth::scan_for_advertisements;
use config::PipelineConfig;
use pipeline::AdvertisementProcessor;
use utils::{format_datetime, summarize_results};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match PipelineConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let processor = AdvertisementProcessor::new(&config);

    // Ctrl+C becomes an explicit stop signal for the scan loop
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                // tx stays alive here; dropping it would end the scan
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let start_time = OffsetDateTime::now_utc();
    info!(
        "Starting BLE scan at {} for {} s (service {}, {:?} payload, threshold {:.2} m/s², scale {})",
        format_datetime(&start_time),
        config.scan_duration_secs,
        config.service_uuid,
        config.payload_layout,
        config.movement_threshold,
        config.scale_factor
    );

    let results = match scan_for_advertisements(&config, &processor, &mut rx).await {
        Ok(results) => results,
        Err(e) => {
            error!("Scan failed: {}", e);
            return Err(e);
        }
    };

    info!(
        "Scan completed at: {}",
        format_datetime(&OffsetDateTime::now_utc())
    );

    let summaries = summarize_results(&results, &config);

    // Print summary
    for (device_id, summary) in summaries.iter() {
        info!("Summary for {} ({}):", device_id, summary.name);
        info!(
            "  Moving: {}, Stationary: {}, Invalid: {}",
            summary.moving, summary.stationary, summary.invalid
        );
        info!("  Average acceleration X: {:.3} m/s²", summary.acceleration_x);
        info!("  Average acceleration Y: {:.3} m/s²", summary.acceleration_y);
        info!("  Average acceleration Z: {:.3} m/s²", summary.acceleration_z);
        info!(
            "  Magnitude mean/peak: {:.3} / {:.3} m/s²",
            summary.mean_magnitude, summary.peak_magnitude
        );
        info!("  Last RSSI: {} dBm", summary.last_rssi);
        info!(
            "  Based on {} samples, summarized at {}",
            summary.samples,
            format_datetime(&summary.time)
        );
    }

    // Warning if no data collected
    if summaries.is_empty() {
        warn!("No accelerometer advertisements received during this scan!");
    }

    Ok(())
}
