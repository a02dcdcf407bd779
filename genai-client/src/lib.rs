//! Wire layer for the Gemini `generateContent` endpoint.
//!
//! Holds URL construction, the serde request/response models, the
//! [`Transport`] seam with its `reqwest` implementation, and error-body
//! parsing. Retry policy and audio decoding live in `genai-tts`.

pub mod common;
pub mod core;
pub mod error_helpers;
pub mod errors;
pub mod loud_wire;
pub mod models;
pub mod transport;

// generateContent request types
pub use models::request::GenerateContentRequest;
pub use models::request::GenerationConfig;
pub use models::request::Modality;
pub use models::request::SpeechConfig;

// generateContent response types
pub use models::response::Candidate;
pub use models::response::ContentResponse;
pub use models::response::GenerateContentResponse;
pub use models::response::InlineData;
pub use models::response::PartResponse;

pub use errors::ApiStatus;
pub use errors::InternalError;

pub use common::ApiVersion;
pub use common::construct_url;

pub use core::generate_content;
pub use error_helpers::truncate_for_context;
pub use transport::{HttpReply, HttpTransport, HttpTransportBuilder, Transport};
