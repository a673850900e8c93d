// Upload client module - owns the HTTP session and the active event context
//
// Bridges locally processed photos to the gallery web service's REST API.

pub mod active_event;
pub mod client;
pub mod retry;
pub mod upload;

pub use active_event::{ActiveEventContext, Event};
pub use client::{GalleryClient, SetActiveEventRequest};
pub use retry::RetryPolicy;
pub use upload::{UploadPayload, UploadResult};
