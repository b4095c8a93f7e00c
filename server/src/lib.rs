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

//! # Matrixctl Server
//!
//! The HTTP surface over the matrix control service. Routes are thin: every
//! operation funnels through [`matrixctl_service::CommandGateway`], which
//! owns authorization, validation, caching, and the serialized device link.
//!
//! | Method | Path              | Auth    | Permission |
//! |--------|-------------------|---------|------------|
//! | POST   | /api/login        | none    | —          |
//! | POST   | /api/logout       | session | —          |
//! | GET    | /api/status       | session | —          |
//! | POST   | /api/connect      | session | switch     |
//! | POST   | /api/switch       | session | switch     |
//! | GET    | /api/query-status | session | query      |
//! | POST   | /api/disconnect   | session | —          |

mod config;
pub mod handlers;

pub use config::{AppConfig, MatrixSection, SecuritySection, ServerSection};
pub use handlers::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router over the shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/status", get(handlers::status))
        .route("/api/connect", post(handlers::connect))
        .route("/api/switch", post(handlers::switch))
        .route("/api/query-status", get(handlers::query_status))
        .route("/api/disconnect", post(handlers::disconnect))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
