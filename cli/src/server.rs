use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, Request, State, rejection::FormRejection},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info, warn};

use crate::view::WeekPage;
use foodfit_core::db::Database;
use foodfit_core::models::{
    DATE_FORMAT, MealType, NewMealItem, NewWeightEntry, Nutrients, parse_date,
    parse_optional_quantity, parse_required_number, validate_weight,
};
use foodfit_core::week::{self, resolve_week};

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; style-src 'unsafe-inline'; \
     form-action 'self'; frame-ancestors 'none'; base-uri 'none'";

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Database>>,
}

// --- Form / query types ---

#[derive(Deserialize)]
struct WeekQuery {
    week: Option<String>,
}

#[derive(Deserialize)]
struct WeightForm {
    entry_date: Option<String>,
    weight: Option<String>,
    week_start: Option<String>,
}

#[derive(Deserialize)]
struct TargetWeightForm {
    target_weight: Option<String>,
    week_start: Option<String>,
}

#[derive(Deserialize)]
struct MealItemForm {
    entry_date: Option<String>,
    meal_type: Option<String>,
    food_name: Option<String>,
    calories: Option<String>,
    protein: Option<String>,
    fat: Option<String>,
    sugars: Option<String>,
    carbs: Option<String>,
    week_start: Option<String>,
}

#[derive(Deserialize)]
struct WeekContextForm {
    week_start: Option<String>,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn bad_request(err: anyhow::Error) -> ApiError {
    ApiError::BadRequest(format!("{err:#}"))
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    response
}

// --- Helpers ---

/// A form field that is present and not blank, trimmed.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Back to the week view, keeping the week only when it is a real date.
fn redirect_to_week(week_start: Option<&str>) -> Redirect {
    match week_start.and_then(|s| parse_date(s).ok()) {
        Some(date) => Redirect::to(&format!("/?week={}", date.format(DATE_FORMAT))),
        None => Redirect::to("/"),
    }
}

// --- Handlers ---

async fn week_view(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Html<String>, ApiError> {
    let today = week::today();
    let window = resolve_week(query.week.as_deref(), today);

    let (summary, weights, target) = {
        let db = state.db.lock().unwrap_or_else(PoisonError::into_inner);
        let summary = db
            .build_week_summary(window)
            .context("failed to load week")?;
        let weights = db
            .get_weight_history()
            .context("failed to load weight history")?;
        let target = db
            .get_target_weight()
            .context("failed to load target weight")?;
        (summary, weights, target)
    };

    debug!(week_start = %window.start, "rendering week view");
    let body = WeekPage::new(&summary, &weights, target, today)
        .render()
        .context("failed to render week view")?;
    Ok(Html(body))
}

async fn upsert_weight(
    State(state): State<AppState>,
    Form(form): Form<WeightForm>,
) -> Result<Redirect, ApiError> {
    let redirect = redirect_to_week(form.week_start.as_deref());
    let (Some(date), Some(weight)) = (required(form.entry_date), required(form.weight)) else {
        return Ok(redirect);
    };

    let date = parse_date(&date).map_err(bad_request)?;
    let weight = parse_required_number("weight", &weight)
        .and_then(validate_weight)
        .map_err(bad_request)?;

    let entry = {
        let db = state.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.upsert_weight(&NewWeightEntry { date, weight })
            .context("failed to upsert weight")?
    };
    info!(date = %entry.date, weight = entry.weight, "weight logged");
    Ok(redirect)
}

async fn set_target_weight(
    State(state): State<AppState>,
    Form(form): Form<TargetWeightForm>,
) -> Result<Redirect, ApiError> {
    let redirect = redirect_to_week(form.week_start.as_deref());
    let Some(target) = required(form.target_weight) else {
        return Ok(redirect);
    };

    let target = parse_required_number("target weight", &target)
        .and_then(validate_weight)
        .map_err(bad_request)?;

    {
        let db = state.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.set_target_weight(target)
            .context("failed to set target weight")?;
    }
    info!(target_weight = target, "target weight set");
    Ok(redirect)
}

async fn add_meal_item(
    State(state): State<AppState>,
    Form(form): Form<MealItemForm>,
) -> Result<Redirect, ApiError> {
    let redirect = redirect_to_week(form.week_start.as_deref());
    // A slot outside the enumeration counts as not supplied.
    let meal_type = form
        .meal_type
        .as_deref()
        .and_then(|m| m.parse::<MealType>().ok());
    let (Some(date), Some(meal_type), Some(food_name)) =
        (required(form.entry_date), meal_type, required(form.food_name))
    else {
        return Ok(redirect);
    };

    let date = parse_date(&date).map_err(bad_request)?;
    let nutrients = Nutrients {
        calories: parse_optional_quantity(form.calories.as_deref()),
        protein: parse_optional_quantity(form.protein.as_deref()),
        fat: parse_optional_quantity(form.fat.as_deref()),
        sugars: parse_optional_quantity(form.sugars.as_deref()),
        carbs: parse_optional_quantity(form.carbs.as_deref()),
    };

    let item = {
        let db = state.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.insert_meal_item(&NewMealItem {
            date,
            meal_type,
            food_name,
            nutrients,
        })
        .context("failed to insert meal item")?
    };
    info!(id = item.id, date = %item.date, meal = %item.meal_type, "meal item added");
    Ok(redirect)
}

async fn delete_meal_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<WeekContextForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let week_start = form.ok().and_then(|Form(f)| f.week_start);
    let redirect = redirect_to_week(week_start.as_deref());
    // No row can have an id that is not an integer.
    let Ok(id) = id.trim().parse::<i64>() else {
        debug!(id = %id, "ignoring delete for non-numeric id");
        return Ok(redirect);
    };

    let removed = {
        let db = state.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.delete_meal_item(id)
            .context("failed to delete meal item")?
    };
    if removed {
        info!(id, "meal item deleted");
    } else {
        debug!(id, "meal item already absent");
    }
    Ok(redirect)
}

async fn health() -> &'static str {
    "ok"
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(week_view))
        .route("/weights", post(upsert_weight))
        .route("/target-weight", post(set_target_weight))
        .route("/meal-items", post(add_meal_item))
        .route("/meal-items/{id}/delete", post(delete_meal_item))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(db: Database, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        warn!(
            "Listening on {bind} with no authentication. Any device on your network can change your log."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    info!("Listening on http://{bind}:{port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
}
