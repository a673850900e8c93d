pub mod config;
pub mod errors;
pub mod image_encoder;
pub mod status;
pub mod uploader;
pub mod watcher;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use uploader::{
    ActiveEventContext, Event, GalleryClient, RetryPolicy, SetActiveEventRequest, UploadResult,
};
