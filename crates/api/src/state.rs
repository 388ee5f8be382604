use std::sync::Arc;

use kree_db::store::MarketStore;

use crate::config::ServerConfig;
use crate::delivery::{DeliveryCoordinator, DeliveryTracker};
use crate::negotiation::NegotiationService;
use crate::notifications::NotificationDispatcher;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Entity store (PostgreSQL or in-memory).
    pub store: Arc<dyn MarketStore>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub negotiation: Arc<NegotiationService>,
    pub deliveries: Arc<DeliveryCoordinator>,
}

impl AppState {
    /// Wire the services around `store`.
    pub fn new(store: Arc<dyn MarketStore>, config: ServerConfig) -> Self {
        let ws_manager = Arc::new(WsManager::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&ws_manager),
        ));
        let tracker = Arc::new(DeliveryTracker::new());
        let negotiation = Arc::new(NegotiationService::new(
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            Arc::clone(&tracker),
            config.expiry,
        ));
        let deliveries = Arc::new(DeliveryCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            Arc::clone(&ws_manager),
            tracker,
        ));

        Self {
            store,
            config: Arc::new(config),
            ws_manager,
            dispatcher,
            negotiation,
            deliveries,
        }
    }
}
