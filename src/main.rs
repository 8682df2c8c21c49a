//Third-party-dependencies
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use study_service::config::AppConfig;
use study_service::routes;
use study_service::utils::auth_middleware::Authentication;

fn cors_for(config: &AppConfig) -> Cors {
    match &config.cors_allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header(),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let service = study_service::build_study_service(&config).map_err(|e| {
        error!("Failed to initialise study service: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let service = web::Data::new(service);

    info!("Server started at {}", config.bind_address);

    let bind_address = config.bind_address.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors_for(&config))
            .app_data(service.clone())
            .configure(routes::init_routes)
            .service(
                web::scope("/api")
                    .wrap(Authentication::new(config.jwt_secret.clone()))
                    .configure(routes::init_api_routes),
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
