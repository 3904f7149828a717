use std::io;

use actix_web::{middleware, web, App, HttpServer};

use crate::handlers;
use crate::state::AppState;

/// Routes shared by the server and the HTTP tests.
///
/// `/plan` accepts every method so the handler can answer preflights and
/// refuse anything but POST with its own CORS headers.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health::handler))
        .route("/plan", web::route().to(handlers::http::handler))
        .route("/prod/plan", web::route().to(handlers::http::handler));
}

pub async fn run_server(host: &str, port: u16, state: AppState) -> io::Result<()> {
    let state = web::Data::new(state);

    log::info!("Listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .configure(app_config)
    })
    .bind((host, port))?
    .run()
    .await
}
