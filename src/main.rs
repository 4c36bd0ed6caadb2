use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

use vpn_detect::api;
use vpn_detect::cli::Args;
use vpn_detect::service::{GeoService, HttpFetcher};

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::load()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let resolver = args.resolver_config();
    info!("VPN detector starting");
    info!(
        "Config: bind={}:{}, geo_api={}, public_ip={}, timeout={:?}, substitute_local={}",
        args.host,
        args.port,
        resolver.geo_api_url,
        resolver.public_ip_url,
        resolver.timeout,
        resolver.substitute_local_with_public
    );

    let geo = web::Data::new(GeoService::new(resolver, Arc::new(HttpFetcher::new())));

    let static_dir = args.static_dir.clone();
    let serve_static = static_dir.is_dir();
    if !serve_static {
        warn!("Static directory {} not found, serving API only", static_dir.display());
    }

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header();

        let app = App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(geo.clone())
            .configure(api::init_routes);

        if serve_static {
            let index = static_dir.join("index.html");
            app.route("/", web::get().to(move || index_page(index.clone())))
                .service(Files::new("/static", &static_dir))
        } else {
            app
        }
    })
    .bind((args.host.as_str(), args.port))
    .with_context(|| format!("Failed to bind {}:{}", args.host, args.port))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("VPN detector stopped");
    Ok(())
}

async fn index_page(path: PathBuf) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open_async(path).await?)
}
