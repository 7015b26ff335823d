use std::sync::Arc;

use engine::store::{DocumentStore, MemoryStore};
use firestore::FirestoreStore;
use server::StaticSessions;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spesa={level},server={level},engine={level},firestore={level}",
            level = settings.app.level
        ))
        .init();

    let store: Arc<dyn DocumentStore> = match settings.store {
        settings::Store::Memory => {
            tracing::warn!("using the in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
        settings::Store::Firestore {
            project_id,
            base_url,
            token,
        } => {
            let base_url = base_url
                .unwrap_or_else(|| "https://firestore.googleapis.com/v1".to_string());
            Arc::new(FirestoreStore::new(&base_url, &project_id, token)?)
        }
    };

    let engine = engine::Engine::new(store);
    let identity = Arc::new(StaticSessions::new(
        settings
            .sessions
            .into_iter()
            .map(|session| (session.token, session.user)),
    ));

    let bind = settings.server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(engine, identity, listener).await?;

    Ok(())
}
