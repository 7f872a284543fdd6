//! Configuration management for gridcut.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `GRIDCUT_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use gridcut::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Cut(config) => println!("Cutting {}", config.input.display()),
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `GRIDCUT_ROWS` - Grid rows (default: 3)
//! - `GRIDCUT_COLS` - Grid columns (default: 4)
//! - `GRIDCUT_TEXT` - Primary watermark text
//! - `GRIDCUT_LABEL_FORMAT` - Position label template (default: `{row}-{col}`)
//! - `GRIDCUT_STRETCH_REMAINDER` - Extend the last row/column to the image edge
//! - `GRIDCUT_FORMAT` - Output format, `png` or `jpeg` (default: png)
//! - `GRIDCUT_QUALITY` - JPEG quality (default: 90)
//! - `GRIDCUT_OUTPUT` - Output directory for `cut` (default: tiles)
//! - `GRIDCUT_HOST` - Server bind address (default: 0.0.0.0)
//! - `GRIDCUT_PORT` - Server port (default: 3000)
//! - `GRIDCUT_MAX_UPLOAD_BYTES` - Upload size limit (default: 20 MiB)
//! - `GRIDCUT_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::grid::{GridSpec, RemainderPolicy, DEFAULT_COLS, DEFAULT_ROWS};
use crate::tile::{
    is_valid_quality, GridCutter, OutputFormat, TileEncoder, WatermarkSpec, DEFAULT_JPEG_QUALITY,
    DEFAULT_LABEL_FORMAT, DEFAULT_PRIMARY_TEXT,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default output directory for the `cut` command.
pub const DEFAULT_OUTPUT_DIR: &str = "tiles";

/// Default upload size limit (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// gridcut - cut an image into a grid of watermarked tiles.
#[derive(Parser, Debug, Clone)]
#[command(name = "gridcut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Cut an image file and write the tiles to a directory.
    Cut(CutConfig),

    /// Serve the grid cutter over HTTP.
    Serve(ServeConfig),
}

/// Grid and watermark options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Number of grid rows.
    #[arg(long, default_value_t = DEFAULT_ROWS, env = "GRIDCUT_ROWS")]
    pub rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = DEFAULT_COLS, env = "GRIDCUT_COLS")]
    pub cols: u32,

    /// Primary watermark text, drawn in the top-left corner of every tile.
    #[arg(long, default_value = DEFAULT_PRIMARY_TEXT, env = "GRIDCUT_TEXT")]
    pub text: String,

    /// Position label template, drawn in the bottom-right corner.
    ///
    /// Placeholders: {row}, {col}, {index} (1-indexed), {rows}, {cols}, {total}.
    #[arg(long, default_value = DEFAULT_LABEL_FORMAT, env = "GRIDCUT_LABEL_FORMAT")]
    pub label_format: String,

    /// Extend the last row and column to the image edge instead of dropping
    /// the pixels left over by floor division.
    #[arg(long, default_value_t = false, env = "GRIDCUT_STRETCH_REMAINDER")]
    pub stretch_remainder: bool,

    /// Compose tiles on a single thread.
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

impl GridArgs {
    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.rows, self.cols)
    }

    pub fn watermark(&self) -> WatermarkSpec {
        WatermarkSpec::new(self.text.clone(), self.label_format.clone())
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        if self.stretch_remainder {
            RemainderPolicy::Stretch
        } else {
            RemainderPolicy::Drop
        }
    }

    /// Build a cutter with the built-in renderer.
    pub fn cutter(&self) -> GridCutter {
        GridCutter::new()
            .with_remainder_policy(self.remainder_policy())
            .with_parallel(!self.sequential)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rows == 0 {
            return Err("rows must be greater than 0".to_string());
        }
        if self.cols == 0 {
            return Err("cols must be greater than 0".to_string());
        }
        if self.label_format.is_empty() {
            return Err("label_format must not be empty".to_string());
        }
        if self.label_format.chars().any(char::is_control) {
            return Err("label_format must not contain control characters".to_string());
        }
        Ok(())
    }
}

/// Tile encoding options.
#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Output image format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Png, env = "GRIDCUT_FORMAT")]
    pub format: OutputFormat,

    /// JPEG quality (1-100). Ignored for PNG.
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "GRIDCUT_QUALITY")]
    pub quality: u8,
}

impl EncodeArgs {
    pub fn encoder(&self) -> TileEncoder {
        TileEncoder::new(self.format, self.quality)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Cut Command
// =============================================================================

/// Options for `gridcut cut`.
#[derive(Args, Debug, Clone)]
pub struct CutConfig {
    /// Image file to cut (JPEG or PNG).
    pub input: PathBuf,

    /// Directory to write the tiles to. Created if missing.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "GRIDCUT_OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub encode: EncodeArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CutConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.grid.validate()?;
        self.encode.validate()?;
        if self.input.as_os_str().is_empty() {
            return Err("input path is required".to_string());
        }
        Ok(())
    }

    /// File stem used to name the output tiles.
    pub fn stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tile".to_string())
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Options for `gridcut serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GRIDCUT_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GRIDCUT_PORT")]
    pub port: u16,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "GRIDCUT_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GRIDCUT_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Defaults applied when a request does not override them.
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub encode: EncodeArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.grid.validate()?;
        self.encode.validate()?;
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
