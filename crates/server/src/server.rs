use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use engine::Engine;

use crate::{
    budgets, expenses,
    session::{CurrentUser, IdentityProvider},
    statistics,
};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Engine,
    pub identity: Arc<dyn IdentityProvider>,
}

async fn auth(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = auth_header.token();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user_id = state.identity.resolve(token).await.map_err(|err| {
        tracing::error!("identity provider failed: {err}");
        StatusCode::UNAUTHORIZED
    })?;
    let Some(user_id) = user_id else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{budget_id}",
            axum::routing::patch(budgets::update).delete(budgets::remove),
        )
        .route(
            "/budgets/{budget_id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/budgets/{budget_id}/expenses/{expense_id}",
            axum::routing::patch(expenses::update),
        )
        .route(
            "/budgets/{budget_id}/expenses/{expense_id}/removal",
            post(expenses::request_removal),
        )
        .route("/removals/confirm", post(expenses::confirm_removal))
        .route("/stats", get(statistics::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Builds the full service with auth applied; used by the runners below and
/// by tests driving the router directly.
pub fn app(engine: Engine, identity: Arc<dyn IdentityProvider>) -> Router {
    router(ServerState { engine, identity })
}

pub async fn run(engine: Engine, identity: Arc<dyn IdentityProvider>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, identity, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    identity: Arc<dyn IdentityProvider>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine, identity };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    identity: Arc<dyn IdentityProvider>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, identity, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
