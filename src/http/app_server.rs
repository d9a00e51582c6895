use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    chart_handler, clear_handler, dashboard_handler, delete_point_handler, health_handler,
    message_handler, points_handler,
};
use crate::bot::Bot;
use crate::chart::ChartRenderer;
use crate::store::{MeasurementStore, TokenRegistry};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MeasurementStore>,
    pub tokens: Arc<TokenRegistry>,
    pub renderer: Arc<dyn ChartRenderer>,
    pub bot: Arc<Bot>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        tokens: Arc<TokenRegistry>,
        renderer: Arc<dyn ChartRenderer>,
        base_url: &str,
    ) -> Self {
        let bot = Arc::new(Bot::new(store.clone(), tokens.clone(), base_url));
        Self {
            store,
            tokens,
            renderer,
            bot,
        }
    }
}

pub struct AppServer {
    pub router: Router,
    pub state: AppState,
}

pub const PATH_HEALTH: &str = "/health";
pub const PATH_MESSAGES: &str = "/messages";
pub const PATH_DASHBOARD: &str = "/u/{token}";
pub const PATH_POINTS: &str = "/u/{token}/points";
pub const PATH_CHART: &str = "/u/{token}/chart.png";

impl AppServer {
    pub fn new(state: AppState) -> Self {
        AppServer {
            router: Router::new()
                .route(PATH_HEALTH, get(health_handler))
                .route(PATH_MESSAGES, post(message_handler))
                .route(PATH_DASHBOARD, get(dashboard_handler).delete(clear_handler))
                .route(PATH_POINTS, get(points_handler).delete(delete_point_handler))
                .route(PATH_CHART, get(chart_handler))
                .with_state(state.clone()),
            state,
        }
    }
}
