//! HTTP server layer for gridcut.
//!
//! Stands in for a chat-bot transport: clients upload an image and fetch the
//! summary or individual tiles back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │            POST /cut            POST /cut/{index}               │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (decode → cut → encode)  │  │ (limits, CORS, tracing)     │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    cut_summary_handler, health_handler, tile_handler, AppState, CutQueryParams,
    CutSummaryResponse, ErrorResponse, HealthResponse, TilePathParams, TileSummary,
};
pub use routes::{create_default_router, create_router, RouterConfig};
