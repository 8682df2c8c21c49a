// study-service/src/routes/study_routes.rs
use crate::models::{AssignQuizRequest, Researcher, ServiceError, StudyFields};
use crate::services::StudyService;
use crate::utils::{get_claims_from_request, get_user_id_from_request, get_username_from_email};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

// The authenticated caller as a researcher record
fn actor_from_request(req: &HttpRequest) -> Result<Researcher, ServiceError> {
    let claims = get_claims_from_request(req)?;
    let name = claims
        .name
        .clone()
        .unwrap_or_else(|| get_username_from_email(&claims.email));

    Ok(Researcher {
        id: claims.sub,
        name,
        email: claims.email,
    })
}

// List every study the caller collaborates on
#[get("/studies/my-studies")]
async fn my_studies(
    req: HttpRequest,
    service: web::Data<StudyService>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching studies for user: {}", user_id);

    let studies = service.my_studies(&user_id)?;

    info!("✅ Found {} studies for user: {}", studies.len(), user_id);

    Ok(HttpResponse::Ok().json(studies))
}

// Create a new draft study owned by the caller
#[post("/studies")]
async fn create_study(
    req: HttpRequest,
    service: web::Data<StudyService>,
    data: web::Json<StudyFields>,
) -> Result<HttpResponse, ServiceError> {
    let actor = actor_from_request(&req)?;

    info!("📝 Creating study: {} for user: {}", data.title, actor.id);

    let created = service.create_study(&actor, data.into_inner()).map_err(|e| {
        error!("❌ Failed to create study for user {}: {}", actor.id, e);
        e
    })?;

    info!("✅ Study created: {}", created.study.id);

    Ok(HttpResponse::Ok().json(created.study))
}

#[get("/studies/{study_id}")]
async fn get_study(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("🔍 Fetching study: {} for user: {}", study_id, user_id);

    let summary = service.get_study(&user_id, &study_id)?;
    Ok(HttpResponse::Ok().json(summary))
}

// Replace the study's metadata; marks the draft dirty
#[put("/studies/{study_id}")]
async fn update_study(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
    data: web::Json<StudyFields>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("🔄 Updating study: {} by user: {}", study_id, user_id);

    let updated = service
        .update_study(&user_id, &study_id, data.into_inner())
        .map_err(|e| {
            error!("❌ Update of study {} by {} rejected: {}", study_id, user_id, e);
            e
        })?;

    info!("✅ Study updated: {}", study_id);

    Ok(HttpResponse::Ok().json(updated.study))
}

#[post("/studies/{study_id}/publish")]
async fn publish_study(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("🚀 Publishing study: {} by user: {}", study_id, user_id);

    let published = service.publish(&user_id, &study_id).map_err(|e| {
        error!("❌ Publish of study {} rejected: {}", study_id, e);
        e
    })?;

    info!("✅ Study {} published as version {}", study_id, published.version);

    Ok(HttpResponse::Ok().json(json!({})))
}

#[post("/studies/{study_id}/assign-quiz")]
async fn assign_quiz(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
    data: web::Json<AssignQuizRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("🧩 Assigning quiz: {} to study: {}", data.quiz_id, study_id);

    service.assign_quiz(&user_id, &study_id, &data.quiz_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Quiz assigned successfully"
    })))
}

// Published version history, oldest first
#[get("/studies/{study_id}/versions")]
async fn get_study_versions(
    req: HttpRequest,
    service: web::Data<StudyService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let study_id = path.into_inner();

    info!("📋 Fetching versions for study: {}", study_id);

    let versions = service.versions(&user_id, &study_id)?;
    Ok(HttpResponse::Ok().json(versions))
}

// Register all study routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(my_studies)
        .service(create_study)
        .service(get_study)
        .service(update_study)
        .service(publish_study)
        .service(assign_quiz)
        .service(get_study_versions);
}
