//! HTTP Controller (Driver Adapter)
//!
//! Axum-based API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::{SinkExt, StreamExt};

use crate::application::dto::{CreateOrderDto, SubmitOrderResponseDto};
use crate::application::ports::ExecutionQueuePort;
use crate::application::use_cases::SubmitOrderUseCase;
use crate::domain::order_execution::repository::OrderRepository;
use crate::domain::shared::{ConnectionId, OrderId};
use crate::infrastructure::broadcast::{ChannelSink, SubscriberRegistry};
use crate::observability::metrics_handle;

use super::error::HttpError;
use super::request::{CreateOrderRequest, WsQuery};
use super::response::{DependencyStatus, HealthResponse};

/// Application state shared across handlers.
pub struct AppState<O, Q>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    /// Use case for accepting orders.
    pub submit_order: Arc<SubmitOrderUseCase<O, Q>>,
    /// Order repository for queries and health.
    pub order_repo: Arc<O>,
    /// Execution queue for health.
    pub queue: Arc<Q>,
    /// Live update subscribers.
    pub subscribers: Arc<SubscriberRegistry>,
    /// Application version.
    pub version: String,
}

impl<O, Q> Clone for AppState<O, Q>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    fn clone(&self) -> Self {
        Self {
            submit_order: Arc::clone(&self.submit_order),
            order_repo: Arc::clone(&self.order_repo),
            queue: Arc::clone(&self.queue),
            subscribers: Arc::clone(&self.subscribers),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<O, Q>(state: AppState<O, Q>) -> Router
where
    O: OrderRepository + 'static,
    Q: ExecutionQueuePort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/orders", post(submit_order))
        .route("/orders/{id}", get(get_order))
        .route("/ws", get(subscribe))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<O, Q>(State(state): State<AppState<O, Q>>) -> impl IntoResponse
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    let (store_ok, queue_ok, counts) = tokio::join!(
        state.order_repo.check_connection(),
        state.queue.is_reachable(),
        state.queue.counts(),
    );

    Json(HealthResponse {
        status: if store_ok && queue_ok { "ok" } else { "error" }.to_string(),
        store: DependencyStatus::from(store_ok),
        queue: DependencyStatus::from(queue_ok),
        counts,
        version: state.version.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus scrape endpoint.
async fn render_metrics() -> Result<Response, HttpError> {
    let handle = metrics_handle()
        .ok_or_else(|| HttpError::Internal("Metrics recorder not installed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

/// Accept a new order.
async fn submit_order<O, Q>(
    State(state): State<AppState<O, Q>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<SubmitOrderResponseDto>, HttpError>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    let Json(request) = payload.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let dto = CreateOrderDto::try_from(request)?;

    let response = state.submit_order.execute(dto).await?;
    Ok(Json(response))
}

/// Order lookup.
async fn get_order<O, Q>(
    State(state): State<AppState<O, Q>>,
    Path(id): Path<String>,
) -> Result<Response, HttpError>
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    let order_id = OrderId::new(id);
    match state.order_repo.get(&order_id).await? {
        Some(order) => Ok(Json(order).into_response()),
        None => Err(HttpError::NotFound(format!("Order not found: {order_id}"))),
    }
}

/// WebSocket upgrade for live order updates.
async fn subscribe<O, Q>(
    State(state): State<AppState<O, Q>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response
where
    O: OrderRepository,
    Q: ExecutionQueuePort,
{
    let connection_id = query
        .client_id
        .filter(|id| !id.is_empty())
        .map_or_else(ConnectionId::generate, ConnectionId::new);
    let registry = Arc::clone(&state.subscribers);

    ws.on_upgrade(move |socket| serve_connection(socket, connection_id, registry))
}

/// Pump registry messages to one socket until either side closes.
async fn serve_connection(
    socket: WebSocket,
    connection_id: ConnectionId,
    registry: Arc<SubscriberRegistry>,
) {
    let (mut outbound, mut inbound) = socket.split();
    let (sink, mut rx) = ChannelSink::channel(connection_id.clone(), registry.sink_capacity());
    registry.subscribe(connection_id.clone(), Arc::new(sink));

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if outbound.send(Message::Text(message.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound messages are ignored; the stream is read only to notice a close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = inbound.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.unsubscribe(&connection_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use crate::infrastructure::queue::InMemoryExecutionQueue;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_state() -> AppState<InMemoryOrderRepository, InMemoryExecutionQueue> {
        let order_repo = Arc::new(InMemoryOrderRepository::new());
        let queue = Arc::new(InMemoryExecutionQueue::default());
        let submit_order = Arc::new(SubmitOrderUseCase::new(
            Arc::clone(&order_repo),
            Arc::clone(&queue),
        ));

        AppState {
            submit_order,
            order_repo,
            queue,
            subscribers: Arc::new(SubscriberRegistry::new()),
            version: "1.0.0-test".to_string(),
        }
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "connected");
        assert_eq!(body["queue"], "connected");
        assert_eq!(body["version"], "1.0.0-test");
    }

    #[tokio::test]
    async fn submit_then_fetch_order() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                "/orders",
                &json!({"clientId": "c-1", "symbol": "ETH/USDT", "side": "buy", "amount": 10}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        assert_eq!(state.queue.counts().await.waiting, 1);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/orders/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let order = body_json(response).await;
        assert_eq!(order["id"], id);
        assert_eq!(order["clientId"], "c-1");
        assert_eq!(order["type"], "market");
        assert_eq!(order["status"], "pending");
        assert_eq!(order["filled"], json!(0.0));
    }

    #[tokio::test]
    async fn missing_fields_rejected() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(post_json("/orders", &json!({"clientId": "c-1", "symbol": "ETH/USDT"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "missing fields"}));
        assert!(state.order_repo.is_empty());
    }

    #[tokio::test]
    async fn limit_without_price_rejected() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/orders",
                &json!({
                    "clientId": "c-1",
                    "symbol": "ETH/USDT",
                    "side": "buy",
                    "amount": 5,
                    "type": "limit"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("Limit price required for limit orders")
        );
        assert_eq!(state.queue.counts().await.pending(), 0);
    }

    #[tokio::test]
    async fn malformed_body_rejected() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_order_is_404() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/orders/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());
    }
}
