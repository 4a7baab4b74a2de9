use std::path::PathBuf;

use super::types::ChatRequest;

/// Requests from the UI to the network worker.
#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Probe `GET /health` once.
    CheckHealth,
    /// Deliver one `POST /chat`; the UI guarantees only one is in flight.
    SendChat(ChatRequest),
    /// Read and encode an image file off the UI thread. `generation` is
    /// echoed back so the UI can drop results of superseded picks.
    StageImage { path: PathBuf, generation: u64 },
}
