use image::DynamicImage;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::image_encoder;

use super::active_event::{
    load_persisted_event, ActiveEventContext, Event, SetActiveEventError, SetActiveEventResponse,
};
use super::retry::RetryPolicy;
use super::upload::{UploadErrorBody, UploadPayload, UploadResponse, UploadResult};

const USER_AGENT: &str = concat!("dslr-gallery-uploader/", env!("CARGO_PKG_VERSION"));

/// How much of an unparseable error body to keep for diagnostics.
const RAW_BODY_PREVIEW_CHARS: usize = 200;

/// Parameters for selecting the active event. Validity of the event id is
/// decided server-side; the client only fills in defaults.
#[derive(Debug, Clone)]
pub struct SetActiveEventRequest {
    pub event_id: String,
    pub album_name: String,
    pub preset_name: Option<String>,
    pub auto_upload: bool,
    pub watermark_enabled: bool,
}

impl SetActiveEventRequest {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            album_name: "Official".to_string(),
            preset_name: None,
            auto_upload: true,
            watermark_enabled: true,
        }
    }
}

/// Synchronous client for the gallery's DSLR API. Owns one blocking HTTP
/// session and the active event context. Not internally synchronized:
/// callers wanting concurrent uploads create one client per thread.
pub struct GalleryClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
    uploader_name: String,
    default_preset: String,
    jpeg_quality: u8,
    active_event: Option<ActiveEventContext>,
}

impl GalleryClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        let active_event = load_persisted_event(&config.active_event_file);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout(),
            uploader_name: config.uploader_name.clone(),
            default_preset: config.default_preset.clone(),
            jpeg_quality: config.jpeg_quality,
            active_event,
        })
    }

    pub fn active_event(&self) -> Option<&ActiveEventContext> {
        self.active_event.as_ref()
    }

    /// Pure reachability probe. True only on HTTP 200; every transport
    /// error is swallowed into false.
    pub fn test_connection(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send() {
            Ok(response) if response.status() == StatusCode::OK => {
                log::info!("✅ Connection to {} successful", self.base_url);
                true
            }
            Ok(response) => {
                log::error!("❌ Connection failed: HTTP {}", response.status().as_u16());
                false
            }
            Err(e) => {
                log::error!("❌ Connection error: {}", e);
                false
            }
        }
    }

    /// Snapshot of the gallery's events, in server order. Fail soft: any
    /// failure logs and returns empty, so empty means "none retrieved",
    /// not necessarily "zero events exist".
    pub fn all_events(&self) -> Vec<Event> {
        let url = format!("{}/api/admin/events", self.base_url);
        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error fetching events: {}", e);
                return Vec::new();
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Event list unavailable: HTTP {}", status.as_u16());
            return Vec::new();
        }

        match response.json::<Vec<Event>>() {
            Ok(events) => {
                log::info!("Fetched {} event(s)", events.len());
                events
            }
            Err(e) => {
                log::error!("Failed to decode event list: {}", e);
                Vec::new()
            }
        }
    }

    /// Select the event uploads are attributed to. On success the context
    /// is replaced with the configuration the server confirmed, not the
    /// request parameters.
    pub fn set_active_event(&mut self, request: SetActiveEventRequest) -> bool {
        let preset = request
            .preset_name
            .clone()
            .unwrap_or_else(|| self.default_preset.clone());

        let body = serde_json::json!({
            "eventId": request.event_id,
            "albumName": request.album_name,
            "presetName": preset,
            "autoUpload": request.auto_upload,
            "watermarkEnabled": request.watermark_enabled,
        });

        let url = format!("{}/api/admin/dslr/set-active-event", self.base_url);
        let response = match self.client.post(&url).json(&body).send() {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error setting active event: {}", e);
                return false;
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            match response.json::<SetActiveEventResponse>() {
                Ok(confirmed) => {
                    let event = confirmed.config.active_event;
                    log::info!("🎯 Active event set: {} ({})", event.event_id, event.album_name);
                    self.active_event = Some(event);
                    true
                }
                Err(e) => {
                    log::error!("Set-active-event response was unreadable: {}", e);
                    false
                }
            }
        } else {
            match response.json::<SetActiveEventError>() {
                Ok(detail) => {
                    let reason = detail
                        .error
                        .map(|e| format!(" - {}", e))
                        .unwrap_or_default();
                    log::error!(
                        "Failed to set active event: HTTP {}{}",
                        status.as_u16(),
                        reason
                    );
                    if !detail.available_events.is_empty() {
                        let names: Vec<&str> = detail
                            .available_events
                            .iter()
                            .map(|e| e.name.as_str())
                            .collect();
                        log::warn!("Available events: {}", names.join(", "));
                    }
                }
                Err(_) => {
                    log::error!("Failed to set active event: HTTP {}", status.as_u16());
                }
            }
            false
        }
    }

    /// Upload one processed photo. Fails fast with no network I/O when no
    /// active event is set.
    pub fn upload_photo(
        &self,
        image: &DynamicImage,
        original_path: &Path,
        metadata: Option<&HashMap<String, String>>,
    ) -> UploadResult {
        let context = match &self.active_event {
            Some(context) => context.clone(),
            None => return UploadResult::failure(AppError::NoActiveEvent.to_string()),
        };

        let jpeg_bytes = match image_encoder::encode_jpeg(image, self.jpeg_quality) {
            Ok(bytes) => bytes,
            Err(e) => return UploadResult::failure(format!("JPEG encoding failed: {}", e)),
        };

        let payload = UploadPayload::new(
            jpeg_bytes,
            original_path,
            &context,
            &self.uploader_name,
            metadata,
        );

        self.send_upload(&context, &payload)
    }

    fn send_upload(&self, context: &ActiveEventContext, payload: &UploadPayload) -> UploadResult {
        let form = match payload.build_form() {
            Ok(form) => form,
            Err(e) => return UploadResult::failure(format!("Upload failed: {}", e)),
        };

        let url = format!("{}/api/events/{}/photos", self.base_url, context.event_id);
        let response = match self
            .client
            .post(&url)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                log::error!("Upload error: {}", e);
                return UploadResult::failure(format!("Upload error: {}", e));
            }
        };

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            match response.json::<UploadResponse>() {
                Ok(body) => {
                    log::info!("✅ Upload successful: {}", body.id);
                    UploadResult::Success {
                        photo_id: body.id,
                        url: body.url,
                        event_id: context.event_id.clone(),
                        album_name: context.album_name.clone(),
                    }
                }
                Err(e) => {
                    UploadResult::failure(format!("Upload response was unreadable: {}", e))
                }
            }
        } else {
            let raw = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<UploadErrorBody>(&raw)
                .ok()
                .and_then(|body| body.message);

            let mut message = format!("Upload failed: HTTP {}", status.as_u16());
            match detail {
                Some(detail) => message.push_str(&format!(" - {}", detail)),
                None if !raw.is_empty() => {
                    let preview: String = raw.chars().take(RAW_BODY_PREVIEW_CHARS).collect();
                    message.push_str(&format!(" - {}", preview));
                }
                None => {}
            }

            log::error!("{}", message);
            UploadResult::Failure { error: message }
        }
    }

    /// `upload_photo` wrapped in a bounded fixed-delay retry loop. Returns
    /// on the first success; after exhausting the policy, the failure
    /// message names the attempt count.
    pub fn upload_with_retry(
        &self,
        image: &DynamicImage,
        original_path: &Path,
        metadata: Option<&HashMap<String, String>>,
        policy: &RetryPolicy,
    ) -> UploadResult {
        for attempt in 1..=policy.max_retries {
            let result = self.upload_photo(image, original_path, metadata);

            if result.is_success() {
                if attempt > 1 {
                    log::info!("Upload succeeded on attempt {}", attempt);
                }
                return result;
            }

            if attempt < policy.max_retries {
                log::warn!(
                    "Upload attempt {} failed, retrying in {:?}: {}",
                    attempt,
                    policy.retry_delay,
                    result.error().unwrap_or("unknown error")
                );
                thread::sleep(policy.retry_delay);
            }
        }

        UploadResult::failure(format!(
            "Upload failed after {} attempts",
            policy.max_retries
        ))
    }

    /// GET passthrough to the DSLR status endpoint. No retries.
    pub fn dslr_status(&self) -> AppResult<serde_json::Value> {
        let url = format!("{}/api/admin/dslr/status", self.base_url);
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(response.json()?)
        } else {
            Err(AppError::StatusCheck {
                status: status.as_u16(),
            })
        }
    }

    /// Releases the HTTP session. Consuming `self` makes a double close
    /// unrepresentable.
    pub fn close(self) {
        log::info!("Closing gallery client session");
    }
}
