/// Bluetooth Low Energy scanning and hand-off to the classification pipeline
use bluer::{Adapter, AdapterEvent, Address};
use futures_util::{pin_mut, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};

use crate::config::PipelineConfig;
use crate::models::{AdvertisementEvent, ClassificationResult};
use crate::pipeline::AdvertisementProcessor;
use crate::utils::{format_result, to_hex};

/// Results collected during a scan, keyed by device address
pub type ScanResults = HashMap<String, Vec<ClassificationResult>>;

/// Scan for beacon advertisements and classify each one as it arrives
///
/// Discovery runs until `config.scan_duration_secs` elapses or `shutdown`
/// fires. Every advertisement that carries service data goes through the
/// processor; the results are logged and collected per device.
///
/// # Arguments
/// * `config` - Scan duration and optional device allow-list
/// * `processor` - Pipeline applied to every advertisement
/// * `shutdown` - Resolves when the scan should stop early
///
/// # Returns
/// Result containing the collected results, or error if the adapter could not scan
pub async fn scan_for_advertisements(
    config: &PipelineConfig,
    processor: &AdvertisementProcessor,
    shutdown: &mut oneshot::Receiver<()>,
) -> Result<ScanResults, Box<dyn std::error::Error>> {
    let mut collected = ScanResults::new();

    // Initialize Bluetooth session
    let session = match bluer::Session::new().await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to create Bluetooth session: {}", e);
            return Err(e.into());
        }
    };

    // Get the default Bluetooth adapter
    let adapter = match session.default_adapter().await {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Failed to get default Bluetooth adapter: {}", e);
            return Err(e.into());
        }
    };

    // Ensure Bluetooth adapter is powered on
    if let Err(e) = adapter.set_powered(true).await {
        error!("Failed to power on adapter: {}", e);
        return Err(e.into());
    }

    // Low Energy only; keep duplicates so every advertisement is reported
    let filter = bluer::DiscoveryFilter {
        transport: bluer::DiscoveryTransport::Le,
        duplicate_data: true,
        ..Default::default()
    };

    // Apply the discovery filter (warn if it fails, but continue)
    if let Err(e) = adapter.set_discovery_filter(filter).await {
        warn!("Failed to set discovery filter: {}", e);
    }

    // Property changes of known devices are reported as DeviceAdded too
    let events = match adapter.discover_devices_with_changes().await {
        Ok(events) => events,
        Err(e) => {
            error!("Failed to start device discovery: {}", e);
            return Err(e.into());
        }
    };
    pin_mut!(events);

    let deadline = sleep(Duration::from_secs(config.scan_duration_secs));
    tokio::pin!(deadline);

    info!("Scanning on adapter {}", adapter.name());

    loop {
        tokio::select! {
            _ = &mut deadline => {
                debug!("Scan duration of {} s elapsed", config.scan_duration_secs);
                break;
            }
            _ = &mut *shutdown => {
                info!("Stop requested, ending scan early");
                break;
            }
            event = events.next() => match event {
                Some(AdapterEvent::DeviceAdded(addr)) => {
                    if let Some(advertisement) = read_advertisement(&adapter, addr, config).await {
                        handle_advertisement(processor, config, &advertisement, &mut collected);
                    }
                }
                Some(other) => debug!("Discovery event: {:?}", other),
                None => {
                    warn!("Discovery stream ended unexpectedly");
                    break;
                }
            }
        }
    }

    Ok(collected)
}

/// Snapshot a discovered device's current advertisement
///
/// Returns None for devices outside the allow-list, without a live RSSI
/// (cached by BlueZ but not currently advertising) or without service data.
async fn read_advertisement(
    adapter: &Adapter,
    addr: Address,
    config: &PipelineConfig,
) -> Option<AdvertisementEvent> {
    let device = match adapter.device(addr) {
        Ok(device) => device,
        Err(_) => return None,
    };

    let addr_str = device.address().to_string().to_uppercase();

    if !config.is_tracked(&addr_str) {
        return None;
    }

    let signal_strength = match device.rssi().await {
        Ok(Some(rssi)) => rssi,
        Ok(None) => {
            debug!("No RSSI for {}, not currently advertising", addr_str);
            return None;
        }
        Err(e) => {
            debug!("Failed to get RSSI for {}: {}", addr_str, e);
            return None;
        }
    };

    match device.service_data().await {
        Ok(Some(service_data)) if !service_data.is_empty() => Some(AdvertisementEvent::new(
            addr_str,
            signal_strength,
            service_data,
        )),
        Ok(_) => {
            debug!("No service data for {}", addr_str);
            None
        }
        Err(e) => {
            debug!("Failed to get service data for {}: {}", addr_str, e);
            None
        }
    }
}

/// Run one advertisement through the pipeline and record the outcome
pub fn handle_advertisement(
    processor: &AdvertisementProcessor,
    config: &PipelineConfig,
    advertisement: &AdvertisementEvent,
    collected: &mut ScanResults,
) {
    for (service_id, payload) in &advertisement.service_data {
        debug!(
            "{} service {} data (hex): {}",
            advertisement.device_id,
            service_id,
            to_hex(payload)
        );
    }

    for service_id in processor.skipped_services(advertisement) {
        debug!(
            "Skipping service {} from {}: not the accelerometer service",
            service_id, advertisement.device_id
        );
    }

    let name = config.device_name(&advertisement.device_id);
    for result in processor.process(advertisement) {
        info!("{}", format_result(&result, name));
        collected
            .entry(result.device_id.clone())
            .or_default()
            .push(result);
    }
}
