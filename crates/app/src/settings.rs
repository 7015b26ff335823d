///! Handles settings for the application. Configuration is written in
///! `settings.toml`.
use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

/// Which document store backs the engine.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Store {
    /// Volatile in-process store for local runs.
    Memory,
    /// Hosted Firestore database.
    Firestore {
        project_id: String,
        /// Overridable for emulators; defaults to the production endpoint.
        base_url: Option<String>,
        token: Option<String>,
    },
}

/// One configured bearer session.
#[derive(Debug, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub store: Store,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
