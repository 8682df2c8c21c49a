// study-service/src/lib.rs
pub mod client;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use config::AppConfig;
use models::ServiceError;
use services::StudyService;
use utils::study_storage::StudyStore;
use utils::user_directory::UserDirectory;

// Build the backing service from configuration
pub fn build_study_service(config: &AppConfig) -> Result<StudyService, ServiceError> {
    let store = match &config.storage_path {
        Some(dir) => StudyStore::open(dir)?,
        None => StudyStore::in_memory(),
    };

    let directory = match &config.researchers_file {
        Some(file) => UserDirectory::load_from_file(file)?,
        None => UserDirectory::new(),
    };

    Ok(StudyService::new(store, directory))
}
