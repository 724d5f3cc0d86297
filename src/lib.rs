pub mod application;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};

pub use config::AppConfig;
pub use context::AppContext;

use errors::AppError;

/// Registers every route plus the extractor configs that turn malformed
/// input into 400 responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health))
    .service(
        web::scope("/checkout")
            .route("/orders", web::post().to(handlers::checkout::create_order))
            .route("/capture", web::post().to(handlers::checkout::capture_order)),
    )
    .service(
        web::scope("/cart")
            .route("", web::post().to(handlers::cart::add_item))
            .route("/user/{auth_id}", web::get().to(handlers::cart::get_cart))
            .route(
                "/user/{auth_id}/summary",
                web::get().to(handlers::cart::get_summary),
            )
            .route(
                "/user/{auth_id}/clear",
                web::delete().to(handlers::cart::clear_cart),
            )
            .route("/{id}", web::delete().to(handlers::cart::remove_line)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(handlers::orders::list_orders))
            .route("/invoices", web::get().to(handlers::orders::search_invoices))
            .route("/invoices/{id}", web::get().to(handlers::orders::get_invoice))
            .route("/{id}/status", web::patch().to(handlers::orders::update_status)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    context: AppContext,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let context = web::Data::new(context);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(context.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(openapi::swagger_ui())
    })
    .bind((host.to_string(), port))?
    .run())
}
