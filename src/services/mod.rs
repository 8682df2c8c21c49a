// study-service/src/services/mod.rs
pub mod collaborator_registry;
pub mod permission_resolver;
pub mod publish_gate;
pub mod study_service;
pub mod version_state;
pub mod view_model;

pub use collaborator_registry::{RegistryChange, ResearcherLookup};
pub use permission_resolver::ResolvedAccess;
pub use publish_gate::{PublishGateState, PublishTracker};
pub use study_service::StudyService;
pub use version_state::VersionPhase;
pub use view_model::StudyViewModel;
