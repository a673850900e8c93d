use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The gallery event that uploads are currently attributed to. Replaced
/// wholesale with the server-confirmed copy whenever `set_active_event`
/// succeeds; never mutated optimistically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEventContext {
    pub event_id: String,
    #[serde(default = "default_album")]
    pub album_name: String,
    #[serde(default)]
    pub preset_name: Option<String>,
    #[serde(default = "default_true")]
    pub auto_upload: bool,
    #[serde(default = "default_true")]
    pub watermark_enabled: bool,
}

fn default_album() -> String {
    "Official".to_string()
}

fn default_true() -> bool {
    true
}

/// One event as reported by the gallery's admin API. Extra fields in the
/// payload are ignored; the list is a snapshot, never cached.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
}

/// Shape of the persisted selection file written by the selection tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSelection {
    active_event: Option<ActiveEventContext>,
}

/// Response body of a successful set-active-event call. The server echoes
/// back the configuration it actually applied.
#[derive(Debug, Deserialize)]
pub(crate) struct SetActiveEventResponse {
    pub config: SetActiveEventConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetActiveEventConfig {
    pub active_event: ActiveEventContext,
}

/// Error body the server may return when set-active-event is rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetActiveEventError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub available_events: Vec<Event>,
}

/// Load the persisted active event, if any. A missing or unreadable file
/// is not an error; the client simply starts without an event.
pub fn load_persisted_event(path: &Path) -> Option<ActiveEventContext> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!(
                "No persisted active event at {} ({}), starting without one",
                path.display(),
                e
            );
            return None;
        }
    };

    match serde_json::from_str::<PersistedSelection>(&raw) {
        Ok(selection) => {
            if let Some(event) = &selection.active_event {
                log::info!("Loaded persisted active event: {}", event.event_id);
            }
            selection.active_event
        }
        Err(e) => {
            log::warn!("Failed to parse persisted event file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn context_defaults_fill_in() {
        let context: ActiveEventContext =
            serde_json::from_str(r#"{"eventId": "evt-1"}"#).unwrap();
        assert_eq!(context.album_name, "Official");
        assert!(context.auto_upload);
        assert!(context.watermark_enabled);
        assert!(context.preset_name.is_none());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        assert!(load_persisted_event(Path::new("no_such_selection.json")).is_none());
    }

    #[test]
    fn corrupt_file_is_not_an_error() {
        let path = std::env::temp_dir().join("corrupt_selection_test.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not json at all").unwrap();

        assert!(load_persisted_event(&path).is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn persisted_event_round_trips() {
        let path = std::env::temp_dir().join("selection_roundtrip_test.json");
        fs::write(
            &path,
            r#"{"activeEvent": {"eventId": "evt-9", "albumName": "Candid", "presetName": "wedding_warm", "autoUpload": false, "watermarkEnabled": true}}"#,
        )
        .unwrap();

        let context = load_persisted_event(&path).unwrap();
        assert_eq!(context.event_id, "evt-9");
        assert_eq!(context.album_name, "Candid");
        assert_eq!(context.preset_name.as_deref(), Some("wedding_warm"));
        assert!(!context.auto_upload);
        let _ = fs::remove_file(&path);
    }
}
