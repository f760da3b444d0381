//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API. Each route builds a `GatewayRequest` and hands it
//! to the request router, so metrics and logging are uniform across routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::HeaderMap,
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::application::ports::{Caller, CredentialResolver, FallbackQuoteProvider, PrimaryProvider};
use crate::application::services::{
    GatewayRequest, GatewayResponse, RequestRouter, ResolveContractQuery, ResponseData,
};
use crate::domain::market::{BarsQuery, OptionsOrderRequest, OrderRequest};
use crate::domain::options::ChainQuery;
use crate::error::GatewayError;

use super::request::QuotesParams;
use super::response::HealthResponse;

/// Header carrying the caller identity. Absent means anonymous.
pub const CALLER_HEADER: &str = "x-gateway-user";

type HandlerResult = Result<Json<GatewayResponse<ResponseData>>, GatewayError>;

/// Application state shared across handlers.
pub struct AppState<P, F, C>
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    /// Request router.
    pub router: Arc<RequestRouter<P, F, C>>,
    /// Application version.
    pub version: String,
}

impl<P, F, C> Clone for AppState<P, F, C>
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<P, F, C>(state: AppState<P, F, C>) -> Router
where
    P: PrimaryProvider + 'static,
    F: FallbackQuoteProvider + 'static,
    C: CredentialResolver + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/gateway", post(gateway))
        .route("/api/v1/quotes", get(quotes))
        .route("/api/v1/bars", get(bars))
        .route("/api/v1/account", get(account))
        .route("/api/v1/positions", get(positions))
        .route("/api/v1/activities", get(activities))
        .route("/api/v1/orders", get(orders).post(submit_order))
        .route("/api/v1/orders/{order_id}", delete(cancel_order))
        .route("/api/v1/options/chain", get(options_chain))
        .route("/api/v1/options/orders", post(submit_options_order))
        .route("/api/v1/options/resolve", get(resolve_contract))
        .with_state(state)
}

fn caller_from(headers: &HeaderMap) -> Caller {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(Caller::anonymous, Caller::new)
}

async fn dispatch<P, F, C>(
    state: &AppState<P, F, C>,
    headers: &HeaderMap,
    request: GatewayRequest,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let caller = caller_from(headers);
    state.router.handle(&caller, request).await.map(Json)
}

fn query_error(rejection: &QueryRejection) -> GatewayError {
    GatewayError::InvalidRequest(rejection.body_text())
}

fn body_error(rejection: &JsonRejection) -> GatewayError {
    GatewayError::InvalidRequest(rejection.body_text())
}

/// Health check endpoint.
async fn health_check<P, F, C>(State(state): State<AppState<P, F, C>>) -> impl IntoResponse
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Tagged envelope: `{"action": "quotes", "symbols": [...]}`.
async fn gateway<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    body: Result<Json<GatewayRequest>, JsonRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Json(request) = body.map_err(|e| body_error(&e))?;
    dispatch(&state, &headers, request).await
}

async fn quotes<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    params: Result<Query<QuotesParams>, QueryRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Query(params) = params.map_err(|e| query_error(&e))?;
    let request = GatewayRequest::Quotes {
        symbols: params.symbols(),
    };
    dispatch(&state, &headers, request).await
}

async fn bars<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    query: Result<Query<BarsQuery>, QueryRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Query(query) = query.map_err(|e| query_error(&e))?;
    dispatch(&state, &headers, GatewayRequest::Bars(query)).await
}

async fn account<P, F, C>(State(state): State<AppState<P, F, C>>, headers: HeaderMap) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    dispatch(&state, &headers, GatewayRequest::Account).await
}

async fn positions<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    dispatch(&state, &headers, GatewayRequest::Positions).await
}

async fn activities<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    dispatch(&state, &headers, GatewayRequest::Activities).await
}

async fn orders<P, F, C>(State(state): State<AppState<P, F, C>>, headers: HeaderMap) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    dispatch(&state, &headers, GatewayRequest::Orders).await
}

async fn submit_order<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Json(order) = body.map_err(|e| body_error(&e))?;
    dispatch(&state, &headers, GatewayRequest::SubmitOrder(order)).await
}

async fn cancel_order<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    dispatch(&state, &headers, GatewayRequest::CancelOrder { order_id }).await
}

async fn options_chain<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    query: Result<Query<ChainQuery>, QueryRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Query(query) = query.map_err(|e| query_error(&e))?;
    dispatch(&state, &headers, GatewayRequest::OptionsChain(query)).await
}

async fn submit_options_order<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    body: Result<Json<OptionsOrderRequest>, JsonRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Json(order) = body.map_err(|e| body_error(&e))?;
    dispatch(&state, &headers, GatewayRequest::SubmitOptionsOrder(order)).await
}

async fn resolve_contract<P, F, C>(
    State(state): State<AppState<P, F, C>>,
    headers: HeaderMap,
    query: Result<Query<ResolveContractQuery>, QueryRejection>,
) -> HandlerResult
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    let Query(query) = query.map_err(|e| query_error(&e))?;
    dispatch(&state, &headers, GatewayRequest::ResolveContract(query)).await
}
