// Shared fixtures for route and workspace tests
use crate::models::{Researcher, StudyFields};
use crate::services::StudyService;
use crate::utils::jwt;
use crate::utils::study_storage::StudyStore;
use crate::utils::user_directory::UserDirectory;

pub(crate) const TEST_SECRET: &str = "test-secret";

pub(crate) fn researcher(id: &str) -> Researcher {
    Researcher {
        id: id.to_string(),
        name: format!("{} Tester", id),
        email: format!("{}@lab.test", id),
    }
}

pub(crate) fn bearer(researcher: &Researcher) -> String {
    let token = jwt::generate_token(
        &researcher.id,
        &researcher.email,
        Some(&researcher.name),
        TEST_SECRET,
        1,
    )
    .unwrap();
    format!("Bearer {}", token)
}

// Service whose directory already knows the usual cast
pub(crate) fn service_with_cast() -> StudyService {
    StudyService::new(
        StudyStore::in_memory(),
        UserDirectory::with_researchers(
            ["owner", "editor", "reviewer", "viewer", "newcomer"]
                .iter()
                .map(|id| researcher(id)),
        ),
    )
}

pub(crate) fn fields(title: &str) -> StudyFields {
    StudyFields {
        title: title.to_string(),
        description: "Comparing two summaries of the same change".to_string(),
        ..Default::default()
    }
}

// Build an authenticated test app around a service
macro_rules! test_app {
    ($service:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($service))
                .configure(crate::routes::init_routes)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(crate::utils::auth_middleware::Authentication::new(
                            crate::tests::TEST_SECRET,
                        ))
                        .configure(crate::routes::init_api_routes),
                ),
        )
        .await
    };
}

mod collaborator_routes_tests;
