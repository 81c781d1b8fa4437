//! Server Configuration

use std::path::PathBuf;

use agent_core::DEFAULT_MAX_ITERATIONS;
use anyhow::{Context, bail};

/// Settings read from the environment at startup
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory served for any path no route claims
    pub static_dir: PathBuf,
    /// Tool rounds allowed per query
    pub max_tool_rounds: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            static_dir: PathBuf::from("static"),
            max_tool_rounds: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("MAX_TOOL_ROUNDS") {
            config.max_tool_rounds = raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_TOOL_ROUNDS must be a number, got '{raw}'"))?;
            if config.max_tool_rounds == 0 {
                bail!("MAX_TOOL_ROUNDS must be at least 1");
            }
        }
        Ok(config)
    }
}
