//! Backend commands queued from the controller to the backend worker.

use std::path::PathBuf;

use client_core::DescriptionRequest;

use crate::controller::events::PhotoField;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    GenerateDescription(DescriptionRequest),
    EncodeImages {
        field: PhotoField,
        paths: Vec<PathBuf>,
    },
    ProbeConnectivity,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::GenerateDescription(_) => "generate_description",
            BackendCommand::EncodeImages { .. } => "encode_images",
            BackendCommand::ProbeConnectivity => "probe_connectivity",
        }
    }

    /// Commands whose answer the operator is actively waiting for.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, BackendCommand::ProbeConnectivity)
    }
}
