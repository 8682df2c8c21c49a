// study-service/src/routes/collaborator_routes.rs
use crate::models::{ChangeRoleRequest, InviteRequest, ServiceError};
use crate::services::StudyService;
use crate::utils::get_user_id_from_request;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use log::{error, info};

#[get("/studies/{study_id}/collaborators")]
async fn get_collaborators(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("📋 Fetching collaborators for study: {}", study_id);

    let collaborators = service.collaborators(&user_id, &study_id)?;

    info!("✅ Found {} collaborators", collaborators.len());

    Ok(HttpResponse::Ok().json(collaborators))
}

// Grant a role on the study to a researcher
#[post("/studies/{study_id}/collaborators")]
async fn invite_collaborator(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
    data: web::Json<InviteRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!(
        "📧 Inviting {:?} as {} to study: {} (by {})",
        data.user_id.as_ref().or(data.email.as_ref()),
        data.role,
        study_id,
        user_id
    );

    let change = service.invite(&user_id, &study_id, &data).map_err(|e| {
        error!("❌ Invite to study {} rejected: {}", study_id, e);
        e
    })?;

    info!("✅ Collaborator added: {}", change.collaborator.id);

    Ok(HttpResponse::Ok().json(change.collaborator))
}

#[patch("/studies/{study_id}/collaborators/{collaborator_id}")]
async fn change_collaborator_role(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<(String, String)>,
    data: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (study_id, collaborator_id) = path.into_inner();

    info!(
        "🔄 Changing role of collaborator: {} in study: {} to {}",
        collaborator_id, study_id, data.role
    );

    let change = service
        .change_role(&user_id, &study_id, &collaborator_id, data.role)
        .map_err(|e| {
            error!("❌ Role change in study {} rejected: {}", study_id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(change.collaborator))
}

#[delete("/studies/{study_id}/collaborators/{collaborator_id}")]
async fn remove_collaborator(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (study_id, collaborator_id) = path.into_inner();

    info!(
        "🗑️ Removing collaborator: {} from study: {}",
        collaborator_id, study_id
    );

    service
        .remove_collaborator(&user_id, &study_id, &collaborator_id)
        .map_err(|e| {
            error!("❌ Removal from study {} rejected: {}", study_id, e);
            e
        })?;

    Ok(HttpResponse::NoContent().finish())
}

// Register all collaborator routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_collaborators)
        .service(invite_collaborator)
        .service(change_collaborator_role)
        .service(remove_collaborator);
}
