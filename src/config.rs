// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process configuration, read once from the environment at startup.
//!
//! Every value here is immutable for the process lifetime. Input geometry
//! in particular must not change between requests: the inference session is
//! built for a fixed `[1, 3, H, W]` input shape.

use std::env;

/// Default model input height (re-id models are portrait-oriented)
pub const DEFAULT_INPUT_H: u32 = 256;

/// Default model input width
pub const DEFAULT_INPUT_W: u32 = 128;

/// Default model path inside the container image
pub const DEFAULT_MODEL_PATH: &str = "/models/reid_swinb_1024.onnx";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 8080;

/// Node configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Model input height (INPUT_H)
    pub input_h: u32,

    /// Model input width (INPUT_W)
    pub input_w: u32,

    /// Path to the ONNX model file (MODEL_PATH)
    pub model_path: String,

    /// Whether CUDA acceleration was requested (CUDA_ENABLED)
    pub cuda_enabled: bool,

    /// HTTP listen port (API_PORT)
    pub api_port: u16,

    /// Base URL of the remote object portal (STORAGE_PORTAL_URL)
    pub storage_portal_url: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            input_h: DEFAULT_INPUT_H,
            input_w: DEFAULT_INPUT_W,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            cuda_enabled: false,
            api_port: DEFAULT_API_PORT,
            storage_portal_url: "http://127.0.0.1:5050".to_string(),
        }
    }
}

impl NodeConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            input_h: env_u32("INPUT_H", defaults.input_h),
            input_w: env_u32("INPUT_W", defaults.input_w),
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            cuda_enabled: env::var("CUDA_ENABLED")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.cuda_enabled),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.api_port),
            storage_portal_url: env::var("STORAGE_PORTAL_URL")
                .unwrap_or(defaults.storage_portal_url),
        }
    }

    /// Listen address for the HTTP server
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.api_port)
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

/// Accepts the usual case-insensitive truthy tokens for boolean env flags
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
