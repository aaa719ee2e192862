//! Server Configuration
//!
//! Everything is read from the environment (after `.env` is loaded). The
//! Groq API key is deliberately absent: it arrives with each request from
//! the page's sidebar.

use mathsolver_core::provider::DEFAULT_MODEL;
use mathsolver_runtime::GroqConfig;
use mathsolver_tools::encyclopedia::WikipediaConfig;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Directory holding the built page
    pub static_dir: String,

    /// Model identifier sent to the provider
    pub model: String,

    /// Decision loop step ceiling
    pub max_iterations: usize,

    /// Sessions untouched this long are discarded
    pub session_idle_secs: u64,

    pub groq: GroqConfig,

    pub wikipedia: WikipediaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            static_dir: "static".into(),
            model: DEFAULT_MODEL.into(),
            max_iterations: 15,
            session_idle_secs: 3600,
            groq: GroqConfig::default(),
            wikipedia: WikipediaConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: std::env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            model: std::env::var("GROQ_MODEL").unwrap_or(defaults.model),
            max_iterations: std::env::var("AGENT_MAX_ITERATIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_iterations),
            session_idle_secs: std::env::var("SESSION_IDLE_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.session_idle_secs),
            groq: GroqConfig::from_env(),
            wikipedia: WikipediaConfig::from_env(),
        }
    }
}
