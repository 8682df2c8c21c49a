// src/routes/mod.rs
use actix_web::{get, web, HttpResponse, Responder};

pub mod collaborator_routes;
pub mod study_routes;
pub mod user_routes;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Study service is running.\nAuthenticated endpoints live under /api.")
}

// Public routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index);
}

// Routes mounted under the authenticated /api scope
pub fn init_api_routes(cfg: &mut web::ServiceConfig) {
    study_routes::init_routes(cfg);
    collaborator_routes::init_routes(cfg);
    user_routes::init_routes(cfg);
}
