use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dslr_gallery_uploader::status::{write_status, StatusSnapshot};
use dslr_gallery_uploader::watcher::PhotoWatcher;
use dslr_gallery_uploader::{
    image_encoder, Config, GalleryClient, RetryPolicy, SetActiveEventRequest,
};

/// Wait after a new file appears before reading it, so a photo still being
/// copied from the camera is not uploaded half-written.
const FILE_SETTLE: Duration = Duration::from_secs(2);

fn main() -> anyhow::Result<()> {
    // The logger comes up before the config is read so load-time warnings
    // are not lost. The env_logger filter is left wide open and the
    // effective level gated through the log facade, which lets the
    // configured level be applied once the file has been parsed.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .init();
    log::set_max_level(log::LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let event_override = args.next();

    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    log::set_max_level(config.log_level_filter());

    log::info!("Starting DSLR gallery uploader");

    let mut client = GalleryClient::new(&config).context("creating gallery client")?;

    if !client.test_connection() {
        bail!("Gallery at {} is unreachable", config.base_url);
    }

    if let Some(event_id) = event_override {
        if !client.set_active_event(SetActiveEventRequest::new(event_id)) {
            bail!("Server refused the requested event; see log for alternatives");
        }
    }

    if client.active_event().is_none() {
        let events = client.all_events();
        if events.is_empty() {
            log::warn!("No events retrieved from the gallery");
        } else {
            for event in &events {
                log::info!("Available event: {} ({})", event.name, event.id);
            }
        }
        bail!(
            "No active event configured. Pass an event id as the second argument \
             or point CONFIG_FILE at a saved selection."
        );
    }

    let watch_directory = match &config.watch_directory {
        Some(dir) if dir.exists() => dir.clone(),
        Some(dir) => bail!("Watch directory not found: {}", dir.display()),
        None => bail!("No watch_directory configured"),
    };

    run_pipeline(&config, &client, &watch_directory)?;

    client.close();
    log::info!("✅ DSLR gallery uploader stopped");
    Ok(())
}

fn run_pipeline(config: &Config, client: &GalleryClient, watch_directory: &Path) -> anyhow::Result<()> {
    let watcher = PhotoWatcher::start(watch_directory, &config.file_extensions, FILE_SETTLE)
        .context("starting photo watcher")?;
    let policy = RetryPolicy::from_config(config);

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, stopping...");
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .context("registering shutdown handler")?;

    let mut snapshot = StatusSnapshot::new("running", &config.base_url);
    snapshot.watch_directory = Some(watch_directory.to_path_buf());
    snapshot.active_event_id = client.active_event().map(|e| e.event_id.clone());
    write_status(&mut snapshot, &config.status_file)?;

    log::info!("⏳ Monitoring for new photos, Ctrl-C to stop");

    while running.load(Ordering::SeqCst) {
        let Some(photo_path) = watcher.next_photo(Duration::from_millis(500)) else {
            continue;
        };

        process_photo(client, &policy, &photo_path, &mut snapshot);
        if let Err(e) = write_status(&mut snapshot, &config.status_file) {
            log::warn!("Failed to update status file: {}", e);
        }
    }

    snapshot.system_status = "stopped".to_string();
    if let Err(e) = write_status(&mut snapshot, &config.status_file) {
        log::warn!("Failed to write final status file: {}", e);
    }

    log::info!(
        "📊 Final statistics: {} processed, {} uploaded, {} errors",
        snapshot.stats.photos_processed,
        snapshot.stats.photos_uploaded,
        snapshot.stats.errors
    );
    Ok(())
}

fn process_photo(
    client: &GalleryClient,
    policy: &RetryPolicy,
    photo_path: &Path,
    snapshot: &mut StatusSnapshot,
) {
    let file_name = photo_path.file_name().unwrap_or_default().to_string_lossy();
    snapshot.stats.photos_processed += 1;

    // Preset and watermark processing happen upstream of this pipeline;
    // here the file is loaded as-is and re-encoded for transport.
    let image = match image_encoder::load_image(photo_path) {
        Ok(image) => image,
        Err(e) => {
            log::error!("❌ Could not read {}: {}", file_name, e);
            snapshot.stats.errors += 1;
            return;
        }
    };

    match client.upload_with_retry(&image, photo_path, None, policy) {
        result if result.is_success() => {
            log::info!("✅ Uploaded {}", file_name);
            snapshot.stats.photos_uploaded += 1;
        }
        result => {
            log::error!(
                "❌ Upload failed for {}: {}",
                file_name,
                result.error().unwrap_or("unknown error")
            );
            snapshot.stats.errors += 1;
        }
    }
}
