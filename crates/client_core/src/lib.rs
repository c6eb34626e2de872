//! Asynchronous collaborators used by the field app: AI-assisted issue
//! descriptions, image encoding and the connectivity signal.

use std::sync::Arc;

pub mod connectivity;
pub mod description;
pub mod image;

pub use connectivity::ConnectivityProbe;
pub use description::{
    DescriptionGenerator, DescriptionRequest, FixedDescription, GeminiDescriptionService,
};
pub use image::{encode_all, DataUrlEncoder, ImageEncoder};

#[derive(Clone)]
pub struct Collaborators {
    pub descriptions: Arc<dyn DescriptionGenerator>,
    pub images: Arc<dyn ImageEncoder>,
    /// `None` disables the probe; the app then assumes it is online.
    pub connectivity: Option<ConnectivityProbe>,
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
