use std::io;

use checkout_service::{build_server, AppConfig, AppContext};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let context = AppContext::from_config(&config);

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!(
        "Payments via {} in {}",
        config.paypal.api_base,
        config.paypal.currency
    );

    build_server(context, &config.host, config.port)?.await
}
