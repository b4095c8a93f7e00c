//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! HTTP request handlers
//!
//! Thin adapters between the JSON surface and the command gateway: extract
//! the bearer token and client address, delegate, and map the service error
//! taxonomy onto status codes. No business logic lives here.

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use matrixctl_service::{
    AccessControl, AuthError, CommandGateway, Permission, Role, ServiceError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// The command gateway all device operations go through
    pub gateway: Arc<CommandGateway>,
    /// The access control layer, for login/logout
    pub access: Arc<AccessControl>,
}

/// Service error wrapped for HTTP status mapping
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(ServiceError::Auth(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Auth(AuthError::InvalidFormat) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(AuthError::InvalidCredentials | AuthError::InvalidSession) => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::Auth(AuthError::Locked) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Auth(AuthError::AddressDenied | AuthError::Forbidden { .. }) => {
                StatusCode::FORBIDDEN
            }
            ServiceError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ServiceError::EmptyResponse | ServiceError::Link(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always true on the success path
    pub success: bool,
    /// Bearer token for subsequent requests
    pub session: String,
    /// Account role
    pub role: Role,
    /// Granted permissions
    pub permissions: Vec<Permission>,
}

/// Switch request body
#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    /// Input number, 0–8 (0 = off)
    pub input: i64,
    /// Output number, 1–8
    pub output: i64,
}

/// Successful switch response
#[derive(Debug, Serialize)]
pub struct SwitchResponse {
    /// Always true on the success path
    pub success: bool,
    /// The input that was routed
    pub input: u8,
    /// The output it was routed to
    pub output: u8,
    /// Raw device acknowledgment
    pub response: String,
}

/// Link status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether the device link is up
    pub connected: bool,
    /// The configured device address
    pub device_address: String,
}

/// Connect response
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Whether this call ended with a live connection
    pub success: bool,
    /// The connected flag after the attempt
    pub connected: bool,
}

/// Routing query response
#[derive(Debug, Serialize)]
pub struct RoutingResponse {
    /// Always true on the success path
    pub success: bool,
    /// Output number → input number
    pub routing: BTreeMap<u8, u8>,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let addr = client_addr(connect_info);
    let session = state
        .access
        .authenticate(addr, &request.username, &request.password)
        .map_err(ServiceError::from)?;

    let mut permissions: Vec<Permission> = session.permissions.iter().copied().collect();
    permissions.sort();
    Ok(Json(LoginResponse {
        success: true,
        session: session.token,
        role: session.role,
        permissions,
    }))
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    if let Some(token) = bearer_token(&headers) {
        state.access.logout(&token);
    }
    Json(json!({ "success": true }))
}

/// GET /api/status
pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    let token = bearer_token(&headers);
    let status = state.gateway.link_status(token.as_deref())?;
    Ok(Json(StatusResponse {
        connected: status.connected,
        device_address: status.device_address,
    }))
}

/// POST /api/connect
pub async fn connect(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConnectResponse>, ApiError> {
    let token = bearer_token(&headers);
    let outcome = state.gateway.connect(token.as_deref()).await?;
    Ok(Json(ConnectResponse {
        success: outcome.success,
        connected: outcome.connected,
    }))
}

/// POST /api/switch
pub async fn switch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SwitchRequest>,
) -> Result<Json<SwitchResponse>, ApiError> {
    let token = bearer_token(&headers);
    let outcome = state
        .gateway
        .switch_route(token.as_deref(), request.input, request.output)
        .await?;
    Ok(Json(SwitchResponse {
        success: true,
        input: outcome.input,
        output: outcome.output,
        response: outcome.response,
    }))
}

/// GET /api/query-status
pub async fn query_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RoutingResponse>, ApiError> {
    let token = bearer_token(&headers);
    let snapshot = state.gateway.query_routing(token.as_deref()).await?;
    Ok(Json(RoutingResponse {
        success: true,
        routing: snapshot.routes,
    }))
}

/// POST /api/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers);
    state.gateway.disconnect(token.as_deref()).await?;
    Ok(Json(json!({ "success": true, "connected": false })))
}

/// Pull the session token out of an `Authorization: Bearer` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Client address for allow-list and lockout keying.
///
/// Falls back to loopback when the listener provides no peer address, as
/// in-process router tests do.
fn client_addr(connect_info: Option<ConnectInfo<SocketAddr>>) -> IpAddr {
    connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
