// Version information for the Re-ID Embedding Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-reid-embed-2026-08-23";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-23";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "onnx-inference",
    "cuda-fallback",
    "inline-upload",
    "remote-object-fetch",
    "l2-normalization",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Re-ID Embedding Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
