//! gridcut - cut an image into a grid of watermarked tiles.
//!
//! This binary wires the library into two commands: `cut` writes tiles to a
//! directory and `serve` starts the HTTP service.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridcut::{
    config::{Cli, Command, CutConfig, ServeConfig},
    decode_raster,
    server::{create_router, AppState, RouterConfig},
    Tile, TileEncoder,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Cut(config) => run_cut(config),
        Command::Serve(config) => run_serve(config).await,
    }
}

// =============================================================================
// Cut Command
// =============================================================================

fn run_cut(config: CutConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let bytes = match std::fs::read(&config.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let raster = match decode_raster(&bytes) {
        Ok(raster) => raster,
        Err(e) => {
            error!("{}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let grid = config.grid.grid();
    let watermark = config.grid.watermark();
    let cutter = config.grid.cutter();

    info!(
        "Cutting {} ({}x{}) into a {} grid",
        config.input.display(),
        raster.width(),
        raster.height(),
        grid
    );

    let tiles = match cutter.cut_and_stamp(&raster, grid, &watermark) {
        Ok(tiles) => tiles,
        Err(e) => {
            error!("Cut rejected: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // The source raster is no longer needed once the tiles exist
    drop(raster);

    if let Err(e) = std::fs::create_dir_all(&config.output) {
        error!(
            "Failed to create output directory {}: {}",
            config.output.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let encoder = config.encode.encoder();
    let stem = config.stem();

    for (index, tile) in tiles.iter().enumerate() {
        match write_tile(&config, &encoder, &stem, index, tile) {
            Ok(path) => info!("  {} -> {}", tile.label, path.display()),
            Err(e) => {
                error!("Failed to write tile {}: {}", tile.label, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let skipped = tiles.iter().filter(|t| !t.watermark.is_applied()).count();

    info!("");
    info!("Grid layout: {}", grid);
    info!("Tiles written: {}", tiles.len());
    if skipped > 0 {
        warn!("Tiles without watermark: {}", skipped);
    }

    ExitCode::SUCCESS
}

/// Encode one tile and write it into the output directory.
fn write_tile(
    config: &CutConfig,
    encoder: &TileEncoder,
    stem: &str,
    index: usize,
    tile: &Tile,
) -> Result<PathBuf, String> {
    let data = encoder.encode(&tile.pixels).map_err(|e| e.to_string())?;

    let filename = format!(
        "{}_{:02}_{}.{}",
        stem,
        index + 1,
        sanitize(&tile.label),
        encoder.format().extension()
    );
    let path = config.output.join(filename);

    std::fs::write(&path, &data).map_err(|e| e.to_string())?;
    Ok(path)
}

/// Keep labels filesystem-safe.
fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("gridcut v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Grid: {}", config.grid.grid());
    info!("  Remainder: {}", config.grid.remainder_policy().name());
    info!(
        "  Output: {} (quality {})",
        config.encode.format, config.encode.quality
    );
    info!(
        "  Upload limit: {} MiB",
        config.max_upload_bytes / (1024 * 1024)
    );

    let state = AppState::new()
        .with_cutter(config.grid.cutter())
        .with_grid(config.grid.grid())
        .with_watermark(config.grid.watermark())
        .with_encoder(config.encode.encoder());

    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl --data-binary @photo.jpg http://{}/cut", addr);
    info!(
        "    curl --data-binary @photo.jpg http://{}/cut/0.png -o tile.png",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "gridcut=debug,tower_http=debug"
    } else {
        "gridcut=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
