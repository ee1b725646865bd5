/// image_tiles
///
/// Serves a folder of images (local disk or an S3-compatible bucket) as a
/// browser tile grid, with per-image channel rendering and normalization
/// for multispectral and satellite data.
/// Served by a synchronous tiny_http server; no JavaScript frameworks required.
///
/// Run with:
///   cargo run --release -- /path/to/folder
///   cargo run --release -- s3://bucket/prefix --s3-region eu-central-1
/// Then open http://127.0.0.1:8000
///
/// Routes:
///   GET /                 gallery page
///   GET /images/<path>    one rendered image
///   GET /api/images       gallery listing as JSON

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;

use image_tiles::{Location, Normalization, RenderMode, S3Config};
use state::{AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simple server that visualizes images in a folder")]
struct Args {
    /// Folder to serve: a local path or s3://bucket/prefix
    folder_path: String,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to bind on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Default channel rendering: rgb, bgr, bw or sentinel
    #[arg(long, default_value = "rgb")]
    render_method: RenderMode,

    /// Default normalization: standard, scaling, sigmoid or sentinel
    #[arg(long, default_value = "standard")]
    normalization: Normalization,

    /// Number of images shown per page
    #[arg(long, default_value_t = 100)]
    num_items: usize,

    /// Initial value of the items-per-row slider
    #[arg(long, default_value_t = 4)]
    items_per_row: usize,

    /// Wildcard applied to file names when listing (e.g. "*_TCI.tif")
    #[arg(long, default_value = "*")]
    pattern: String,

    /// Include images in sub-folders
    #[arg(long, default_value_t = false)]
    recursive: bool,

    /// Path-style S3 endpoint (MinIO, localstack); defaults to AWS
    #[arg(long)]
    s3_endpoint: Option<String>,

    /// AWS region used to build the default S3 endpoint
    #[arg(long, default_value = "us-east-1")]
    s3_region: String,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn resolve_root(folder_path: &str) -> image_tiles::Result<Location> {
    match Location::parse(folder_path)? {
        Location::Local(path) if path.is_relative() => {
            let cwd = std::env::current_dir()
                .map_err(|_| image_tiles::TilesError::not_found(path.display()))?;
            Ok(Location::Local(cwd.join(path)))
        }
        other => Ok(other),
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let root = match resolve_root(&args.folder_path) {
        Ok(root) => root,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let config = ServerConfig {
        root,
        defaults: image_tiles::RenderOptions {
            render_mode: args.render_method,
            normalization: args.normalization,
            ..Default::default()
        },
        num_items: args.num_items,
        items_per_row: args.items_per_row.max(1),
        pattern: args.pattern,
        recursive: args.recursive,
        s3: S3Config {
            endpoint: args.s3_endpoint,
            region: args.s3_region,
        },
    };

    let addr = format!("{}:{}", args.bind, args.port);
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind HTTP server on {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!("Serving {} on http://{}", config.root, addr);
    log::info!(
        "Defaults: render_mode={} normalization={}",
        config.defaults.render_mode,
        config.defaults.normalization
    );

    let shared_state = Arc::new(AppState::new(config));
    if !shared_state.storage.exists(&shared_state.config.root) {
        log::warn!("{} does not exist or is empty", shared_state.config.root);
    }

    // One thread per request; handlers share nothing mutable.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
