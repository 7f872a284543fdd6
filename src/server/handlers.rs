//! HTTP request handlers for the gridcut API.
//!
//! # Endpoints
//!
//! - `POST /cut` - Decode an upload and describe the grid it would be cut into
//! - `POST /cut/{index}` - Cut an upload and return one encoded tile
//! - `GET /health` - Health check endpoint

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{CodecError, CutError, GridError};
use crate::format::decode_raster;
use crate::grid::{GridSpec, Region, RemainderPolicy};
use crate::tile::{
    is_valid_quality, GridCutter, OutputFormat, TileEncoder, WatermarkSpec, WatermarkStatus,
};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Holds only request defaults; every request gets its own raster and tiles.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cutter used when a request does not override the remainder policy
    pub cutter: GridCutter,

    /// Grid used when a request omits `rows`/`cols`
    pub grid: GridSpec,

    /// Watermark used when a request omits `text`/`label`
    pub watermark: WatermarkSpec,

    /// Encoder used when a request omits `format`/`quality`
    pub encoder: TileEncoder,
}

impl AppState {
    /// Create state with the default 3x4 grid, watermark and PNG output.
    pub fn new() -> Self {
        Self {
            cutter: GridCutter::new(),
            grid: GridSpec::default(),
            watermark: WatermarkSpec::default(),
            encoder: TileEncoder::default(),
        }
    }

    pub fn with_cutter(mut self, cutter: GridCutter) -> Self {
        self.cutter = cutter;
        self
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_watermark(mut self, watermark: WatermarkSpec) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn with_encoder(mut self, encoder: TileEncoder) -> Self {
        self.encoder = encoder;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters accepted by both cut endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CutQueryParams {
    /// Grid rows (defaults to the server setting)
    #[serde(default)]
    pub rows: Option<u32>,

    /// Grid columns (defaults to the server setting)
    #[serde(default)]
    pub cols: Option<u32>,

    /// Primary watermark text
    #[serde(default)]
    pub text: Option<String>,

    /// Position label template
    #[serde(default)]
    pub label: Option<String>,

    /// Stretch the last row/column over the leftover pixels
    #[serde(default)]
    pub stretch: Option<bool>,

    /// Output format, `png` or `jpeg` (tile endpoint only)
    #[serde(default)]
    pub format: Option<String>,

    /// JPEG quality 1-100 (tile endpoint only)
    #[serde(default)]
    pub quality: Option<u8>,
}

/// Path parameters for the tile endpoint.
///
/// Extracted from `/cut/{filename}` where filename is `{index}`,
/// `{index}.png` or `{index}.jpg`.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub filename: String,
}

impl TilePathParams {
    /// Split the filename into a row-major index and an optional format hint.
    pub fn parse(&self) -> Result<(usize, Option<OutputFormat>), CutError> {
        let (stem, hint) = match self.filename.rsplit_once('.') {
            Some((stem, ext)) => {
                let format = ext
                    .parse::<OutputFormat>()
                    .map_err(|_| CutError::InvalidTileIndex(self.filename.clone()))?;
                (stem, Some(format))
            }
            None => (self.filename.as_str(), None),
        };

        let index = stem
            .parse::<usize>()
            .map_err(|_| CutError::InvalidTileIndex(self.filename.clone()))?;

        Ok((index, hint))
    }
}

/// A fully resolved cut request.
struct ResolvedRequest {
    cutter: GridCutter,
    grid: GridSpec,
    watermark: WatermarkSpec,
}

impl ResolvedRequest {
    fn new(state: &AppState, query: &CutQueryParams) -> Result<Self, CutError> {
        let grid = GridSpec::new(
            query.rows.unwrap_or(state.grid.rows),
            query.cols.unwrap_or(state.grid.cols),
        );
        grid.validate()?;

        if let Some(text) = &query.text {
            check_watermark_text("text", text, true)?;
        }
        if let Some(label) = &query.label {
            if label.is_empty() {
                return Err(CutError::InvalidWatermark {
                    field: "label",
                    reason: "must not be empty".to_string(),
                });
            }
            // Labels are echoed in the X-Tile-Label header
            check_watermark_text("label", label, false)?;
        }

        let watermark = WatermarkSpec::new(
            query
                .text
                .clone()
                .unwrap_or_else(|| state.watermark.primary_text.clone()),
            query
                .label
                .clone()
                .unwrap_or_else(|| state.watermark.position_label_format.clone()),
        );

        let cutter = match query.stretch {
            Some(true) => state.cutter.clone().with_remainder_policy(RemainderPolicy::Stretch),
            Some(false) => state.cutter.clone().with_remainder_policy(RemainderPolicy::Drop),
            None => state.cutter.clone(),
        };

        Ok(Self {
            cutter,
            grid,
            watermark,
        })
    }
}

/// Reject control characters; `allow_newline` keeps multi-line watermark text.
fn check_watermark_text(
    field: &'static str,
    value: &str,
    allow_newline: bool,
) -> Result<(), CutError> {
    match value
        .chars()
        .find(|&c| c.is_control() && !(allow_newline && c == '\n'))
    {
        Some(c) => Err(CutError::InvalidWatermark {
            field,
            reason: format!("control character {:?} is not allowed", c),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_grid", "decode_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// One tile in a cut summary.
#[derive(Debug, Serialize)]
pub struct TileSummary {
    /// Row-major position (0-indexed)
    pub index: usize,
    pub row: u32,
    pub col: u32,

    /// Position label as it is stamped on the tile
    pub label: String,

    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub width: u32,
    pub height: u32,
}

impl TileSummary {
    fn new(index: usize, region: &Region, label: String) -> Self {
        Self {
            index,
            row: region.row,
            col: region.col,
            label,
            left: region.left,
            top: region.top,
            right: region.right,
            bottom: region.bottom,
            width: region.width(),
            height: region.height(),
        }
    }
}

/// Response from the cut summary endpoint.
#[derive(Debug, Serialize)]
pub struct CutSummaryResponse {
    /// Width of the decoded upload in pixels
    pub width: u32,

    /// Height of the decoded upload in pixels
    pub height: u32,

    pub rows: u32,
    pub cols: u32,
    pub tile_count: usize,
    pub remainder_policy: RemainderPolicy,

    /// Tiles in row-major order
    pub tiles: Vec<TileSummary>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert CutError to HTTP response.
///
/// 4xx errors are logged at WARN level, 5xx at ERROR level.
impl IntoResponse for CutError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            CutError::Grid(GridError::InvalidGridSpec { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_grid")
            }
            CutError::Grid(GridError::InvalidRaster { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_raster")
            }
            CutError::Grid(GridError::TileIndexOutOfRange { .. }) => {
                (StatusCode::NOT_FOUND, "tile_out_of_range")
            }
            CutError::Grid(GridError::InvalidRegion { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid_region")
            }
            CutError::Codec(CodecError::UnsupportedFormat { .. }) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
            }
            CutError::Codec(CodecError::DecodeError { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "decode_error")
            }
            CutError::Codec(CodecError::EncodeError { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "encode_error")
            }
            CutError::InvalidQuality { .. } => (StatusCode::BAD_REQUEST, "invalid_quality"),
            CutError::InvalidWatermark { .. } => (StatusCode::BAD_REQUEST, "invalid_watermark"),
            CutError::InvalidTileIndex(_) => (StatusCode::BAD_REQUEST, "invalid_tile_index"),
            CutError::Worker(_) => (StatusCode::INTERNAL_SERVER_ERROR, "worker_error"),
        };

        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Describe how an upload would be cut.
///
/// # Endpoint
///
/// `POST /cut` with the image as the request body.
///
/// # Query Parameters
///
/// - `rows`, `cols`: grid shape
/// - `text`, `label`: watermark text and label template
/// - `stretch`: stretch the last row/column
///
/// # Response
///
/// `200 OK` with a [`CutSummaryResponse`] body.
pub async fn cut_summary_handler(
    State(state): State<AppState>,
    Query(query): Query<CutQueryParams>,
    body: Bytes,
) -> Result<Json<CutSummaryResponse>, CutError> {
    let request = ResolvedRequest::new(&state, &query)?;

    let summary = tokio::task::spawn_blocking(move || -> Result<_, CutError> {
        let raster = decode_raster(&body)?;
        let (width, height) = (raster.width(), raster.height());
        let regions = request.cutter.plan(width, height, request.grid)?;

        let tiles = regions
            .iter()
            .enumerate()
            .map(|(index, region)| {
                TileSummary::new(index, region, request.watermark.label_for(region, request.grid))
            })
            .collect();

        Ok(CutSummaryResponse {
            width,
            height,
            rows: request.grid.rows,
            cols: request.grid.cols,
            tile_count: request.grid.tile_count(),
            remainder_policy: request.cutter.remainder_policy(),
            tiles,
        })
    })
    .await
    .map_err(|e| CutError::Worker(e.to_string()))??;

    Ok(Json(summary))
}

/// Cut an upload and return a single encoded tile.
///
/// # Endpoint
///
/// `POST /cut/{index}` or `POST /cut/{index}.png` / `.jpg`, with the image as
/// the request body. `index` is the 0-based row-major tile position.
///
/// # Query Parameters
///
/// Same as [`cut_summary_handler`], plus `format` (`png`/`jpeg`) and `quality`.
/// An explicit `format` wins over the filename extension.
///
/// # Response
///
/// `200 OK` with the encoded tile and headers `X-Tile-Row`, `X-Tile-Col`,
/// `X-Tile-Label` and `X-Tile-Watermark` (`applied` or `skipped`).
pub async fn tile_handler(
    State(state): State<AppState>,
    Path(params): Path<TilePathParams>,
    Query(query): Query<CutQueryParams>,
    body: Bytes,
) -> Result<Response, CutError> {
    let (index, extension_format) = params.parse()?;
    let request = ResolvedRequest::new(&state, &query)?;

    let format = match query.format.as_deref() {
        Some(name) => name.parse::<OutputFormat>()?,
        None => extension_format.unwrap_or(state.encoder.format()),
    };
    let quality = query.quality.unwrap_or(state.encoder.quality());
    if !is_valid_quality(quality) {
        return Err(CutError::InvalidQuality { quality });
    }
    let encoder = TileEncoder::new(format, quality);

    let (tile, data) = tokio::task::spawn_blocking(move || -> Result<_, CutError> {
        let raster = decode_raster(&body)?;
        let tile = request
            .cutter
            .cut_tile(&raster, request.grid, &request.watermark, index)?;
        let data = encoder.encode(&tile.pixels)?;
        Ok((tile, data))
    })
    .await
    .map_err(|e| CutError::Worker(e.to_string()))??;

    let watermark = match tile.watermark {
        WatermarkStatus::Applied => "applied",
        WatermarkStatus::Skipped(_) => "skipped",
    };

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, encoder.format().content_type().to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        [
            ("X-Tile-Row", tile.region.row.to_string()),
            ("X-Tile-Col", tile.region.col.to_string()),
            ("X-Tile-Label", tile.label.clone()),
            ("X-Tile-Watermark", watermark.to_string()),
        ],
        data,
    );

    Ok(response.into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
