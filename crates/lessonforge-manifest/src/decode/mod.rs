//! Pluggable manifest decoding.
//!
//! Callers use [`decode`] (or a [`ManifestDecoder`] from [`detect_decoder`])
//! and receive a generic value tree. Which implementation ran is decided once,
//! at compile time, by the `yaml` feature:
//!
//! - **Library**: `serde_yaml`, used whenever the feature is enabled.
//! - **Fallback**: the built-in [`FallbackDecoder`], used otherwise.
//!
//! Both produce identical trees for every document the fallback accepts.

pub mod fallback;
pub mod lexer;
#[cfg(feature = "yaml")]
pub mod library;

use lessonforge_common::error::Result;
use serde_json::Value;

pub use self::fallback::FallbackDecoder;
#[cfg(feature = "yaml")]
pub use self::library::LibraryDecoder;

/// Whether a general-purpose YAML library was compiled in.
pub const LIBRARY_DECODER_AVAILABLE: bool = cfg!(feature = "yaml");

/// Decodes structured text into a value tree.
pub trait ManifestDecoder: Send + Sync {
    /// Decodes `text` into mappings, sequences, and scalars.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::Decode` identifying the offending line.
    fn decode(&self, text: &str) -> Result<Value>;
}

/// Returns the richest decoder available in this build.
#[must_use]
pub fn detect_decoder() -> Box<dyn ManifestDecoder> {
    #[cfg(feature = "yaml")]
    {
        tracing::debug!("using serde_yaml manifest decoder");
        Box::new(LibraryDecoder)
    }
    #[cfg(not(feature = "yaml"))]
    {
        tracing::debug!("using built-in manifest decoder");
        Box::new(FallbackDecoder)
    }
}

/// Decodes text with the decoder selected by [`detect_decoder`].
///
/// # Errors
///
/// Returns `ForgeError::Decode` when the text is malformed.
pub fn decode(text: &str) -> Result<Value> {
    detect_decoder().decode(text)
}
