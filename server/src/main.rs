use std::io;

use actix_web::{web, App, HttpServer};

use server::config::ServerConfig;
use server::handlers;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = ServerConfig::load(std::env::args().skip(1))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let whiteboard = spawn_server(config.roster_policy);

    log::info!(
        "Whiteboard ready on {}:{} ({:?}, frames up to {} bytes)",
        config.host,
        config.port,
        config.roster_policy,
        config.max_frame_size
    );
    let addr = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(whiteboard.clone()))
            .app_data(config.clone())
            .configure(handlers::root)
    })
    .bind(addr)?
    .run()
    .await
}
