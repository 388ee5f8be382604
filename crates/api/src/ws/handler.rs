use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use kree_core::error::CoreError;
use kree_core::roles::{Caller, Role};
use kree_core::types::DbId;
use serde::Deserialize;

use crate::auth::jwt::caller_from_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::bearer_token;
use crate::state::AppState;
use crate::ws::protocol::{Inbound, Outbound, RegisteredPayload};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Identity for a socket upgrade, from the `Authorization` header or the
/// `?token=` query parameter.
pub struct WsCaller(pub Caller);

impl FromRequestParts<AppState> for WsCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers)? {
            Some(token) => token.to_string(),
            None => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.token)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Unauthorized("Missing access token".into()))
                })?,
        };

        Ok(WsCaller(caller_from_token(&token, &state.config.jwt)?))
    }
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The caller is authenticated before the upgrade; after it the connection
/// is registered with `WsManager` and served by a sender task plus the
/// receive loop.
pub async fn ws_handler(
    WsCaller(caller): WsCaller,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, caller))
}

/// Manage a single WebSocket connection after upgrade.
async fn handle_socket(socket: WebSocket, state: AppState, caller: Caller) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = caller.user_id, role = %caller.role, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), caller).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: dispatch inbound events.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Err(e) = dispatch(&state, &conn_id, caller, text.as_str()).await {
                    let (_, code, message) = e.classify();
                    tracing::warn!(conn_id = %conn_id, code, error = %message, "WebSocket event failed");
                    state
                        .ws_manager
                        .push_to_conn(&conn_id, &Outbound::error(code, message))
                        .await;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one inbound text frame.
async fn dispatch(state: &AppState, conn_id: &str, caller: Caller, text: &str) -> AppResult<()> {
    let event: Inbound = serde_json::from_str(text)
        .map_err(|e| CoreError::Validation(format!("Unrecognized event: {e}")))?;

    match event {
        Inbound::RegisterClient(user_id) => {
            register(state, conn_id, caller, user_id, Role::Client).await
        }
        Inbound::RegisterAgency(agency_id) => {
            register(state, conn_id, caller, agency_id, Role::Agency).await
        }
        Inbound::SendDeliveryUpdate(payload) => {
            state.deliveries.send_update(caller, payload).await?;
            Ok(())
        }
        Inbound::ConfirmDeliveryArrival(payload) => {
            state.deliveries.confirm_arrival(caller, payload).await?;
            Ok(())
        }
    }
}

async fn register(
    state: &AppState,
    conn_id: &str,
    caller: Caller,
    user_id: DbId,
    role: Role,
) -> AppResult<()> {
    if caller.role != role {
        return Err(CoreError::Forbidden(format!(
            "Registering as {role} requires the {role} role"
        ))
        .into());
    }
    if caller.user_id != user_id {
        return Err(CoreError::Forbidden("Cannot register as another user".into()).into());
    }

    let groups = match role {
        Role::Client => state.ws_manager.register_client(conn_id, user_id).await,
        Role::Agency => state.ws_manager.register_agency(conn_id, user_id).await,
    };
    tracing::info!(conn_id, user_id, role = %role, "Presence registered");

    let registered = Outbound::Registered(RegisteredPayload {
        user_id,
        groups: groups.iter().map(ToString::to_string).collect(),
    });
    state.ws_manager.push_to_conn(conn_id, &registered).await;
    Ok(())
}
