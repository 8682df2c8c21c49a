// study-service/src/routes/user_routes.rs
use crate::models::ServiceError;
use crate::services::StudyService;
use crate::utils::get_user_id_from_request;
use actix_web::{get, web, HttpRequest, HttpResponse};
use log::info;

// Invite candidates
#[get("/users/researchers")]
async fn get_researchers(
    req: HttpRequest,
    service: web::Data<StudyService>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let researchers = service.researchers();

    info!("👥 Listing {} researchers for user: {}", researchers.len(), user_id);

    Ok(HttpResponse::Ok().json(researchers))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_researchers);
}
