use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use matchbook::{
    engine::{AddOrderError, Book, Snapshot},
    order::{Id, Order, Price, Quantity, Side, Timestamp},
    transaction::Log,
};

// API request/response types
#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    id: u64,
    side: Side,
    price: f64,
    quantity: u64,
    /// Optional entry timestamp; zero (the default) asks the book to stamp
    /// the order from its own clock.
    #[serde(default)]
    timestamp_ns: u64,
}

#[derive(Debug, Deserialize)]
struct AmendOrderRequest {
    price: f64,
    quantity: u64,
}

#[derive(Debug, Serialize)]
struct TopOfBook {
    best_bid: Option<Price>,
    best_ask: Option<Price>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// Application state
struct AppState {
    book: Mutex<Book>,
}

impl AppState {
    fn new() -> Self {
        Self {
            book: Mutex::new(Book::new()),
        }
    }
}

type ApiError = (StatusCode, ResponseJson<ErrorResponse>);

fn error_response(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        ResponseJson(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// API handlers
async fn health() -> &'static str {
    "matchbook is running"
}

async fn top_of_book(State(state): State<Arc<AppState>>) -> ResponseJson<TopOfBook> {
    let book = state.book.lock().unwrap();
    ResponseJson(TopOfBook {
        best_bid: book.best_price(&Side::Bid),
        best_ask: book.best_price(&Side::Ask),
    })
}

async fn depth_snapshot(
    State(state): State<Arc<AppState>>,
    Path(depth): Path<usize>,
) -> ResponseJson<Snapshot> {
    let book = state.book.lock().unwrap();
    ResponseJson(book.get_snapshot(depth))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<ResponseJson<Log>, ApiError> {
    let order = Order::with_timestamp(
        Id::new(request.id),
        request.side,
        Price::new(request.price),
        Quantity::new(request.quantity),
        Timestamp::new(request.timestamp_ns),
    );

    let mut log = Log::new();
    let mut book = state.book.lock().unwrap();
    match book.add_order(order, &mut log) {
        Ok(()) => {
            info!(id = request.id, "order accepted");
            Ok(ResponseJson(log))
        }
        Err(err @ AddOrderError::CapacityExhausted) => {
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, err))
        }
        Err(err @ AddOrderError::DuplicateId(_)) => {
            Err(error_response(StatusCode::CONFLICT, err))
        }
        Err(err @ AddOrderError::ZeroQuantity) => {
            Err(error_response(StatusCode::BAD_REQUEST, err))
        }
    }
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<ResponseJson<Log>, ApiError> {
    let mut log = Log::new();
    let mut book = state.book.lock().unwrap();
    if book.cancel_order(&Id::new(id), &mut log) {
        info!(id, "order cancelled");
        Ok(ResponseJson(log))
    } else {
        Err(error_response(StatusCode::NOT_FOUND, "order not found"))
    }
}

async fn amend_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<AmendOrderRequest>,
) -> Result<ResponseJson<Log>, ApiError> {
    let mut log = Log::new();
    let mut book = state.book.lock().unwrap();
    if book.amend_order(
        &Id::new(id),
        Price::new(request.price),
        Quantity::new(request.quantity),
        &mut log,
    ) {
        info!(id, "order amended");
        Ok(ResponseJson(log))
    } else {
        Err(error_response(
            StatusCode::NOT_FOUND,
            "order not found or quantity was zero",
        ))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/health", get(health))
        .route("/book", get(top_of_book))
        .route("/book/depth/:depth", get(depth_snapshot))
        .route("/orders", post(create_order))
        .route("/orders/:id", delete(cancel_order).patch(amend_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    info!("order book API listening on http://127.0.0.1:3000");
    axum::serve(listener, app).await.unwrap();
}
