//! HTTP front end for the [`Simulator`](super::Simulator).

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::contract::{ResetResponse, StatusResponse};

use super::Simulator;

/// Routes `GET /status` and `POST /reset` onto a shared simulator.
pub fn router(simulator: Arc<Simulator>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/reset", post(reset))
        .with_state(simulator)
}

/// Serve the simulator on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, simulator: Arc<Simulator>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "job simulator listening");
    }
    axum::serve(listener, router(simulator)).await
}

async fn status(State(simulator): State<Arc<Simulator>>) -> Json<StatusResponse> {
    let result = simulator.check_status();
    tracing::debug!(%result, "GET /status");
    Json(StatusResponse { result })
}

async fn reset(State(simulator): State<Arc<Simulator>>) -> Json<ResetResponse> {
    simulator.reset();
    Json(ResetResponse::ok())
}
