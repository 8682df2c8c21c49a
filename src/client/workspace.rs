// study-service/src/client/workspace.rs
//
// State store for one study-management screen. Presentation code reads
// immutable snapshots; the store changes only through the named commands.
use crate::client::StudyBackend;
use crate::models::{Collaborator, InviteRequest, Role, ServiceError, Study, StudyFields};
use crate::services::permission_resolver::{self, ResolvedAccess};
use crate::services::view_model::{self, StudyViewModel};
use crate::services::publish_gate::PublishTicket;
use crate::services::PublishTracker;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Permission,
    Conflict,
    NotFound,
    Network,
    Internal,
}

impl From<&ServiceError> for NoticeKind {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::ValidationFailed { .. } | ServiceError::InvalidInput(_) => {
                NoticeKind::Validation
            }
            ServiceError::Unauthenticated
            | ServiceError::Unauthorized
            | ServiceError::Forbidden => NoticeKind::Permission,
            ServiceError::Conflict(_) => NoticeKind::Conflict,
            ServiceError::NotFound => NoticeKind::NotFound,
            ServiceError::NetworkFailure(_) => NoticeKind::Network,
            ServiceError::InternalServerError => NoticeKind::Internal,
        }
    }
}

/// Transient, dismissible report of a failed command.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    /// Validation reasons exactly as the backend sent them.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkspaceSnapshot {
    /// Generation of the fetch that produced `view`; 0 before the first load.
    pub generation: u64,
    pub view: Option<StudyViewModel>,
    pub notices: Vec<Notice>,
}

struct WorkspaceState {
    issued: u64,
    applied: u64,
    closed: bool,
    next_notice_id: u64,
    current: Arc<WorkspaceSnapshot>,
}

// Holds the publish slot; leaving scope, even by cancellation, clears the busy flag.
struct PublishInFlight<'a, B: StudyBackend> {
    workspace: &'a StudyWorkspace<B>,
    _ticket: PublishTicket,
}

impl<B: StudyBackend> Drop for PublishInFlight<'_, B> {
    fn drop(&mut self) {
        self.workspace.set_publish_busy(false);
    }
}

pub struct StudyWorkspace<B: StudyBackend> {
    backend: B,
    study_id: String,
    user_id: String,
    publishes: PublishTracker,
    state: Mutex<WorkspaceState>,
    snapshots: watch::Sender<Arc<WorkspaceSnapshot>>,
}

impl<B: StudyBackend> StudyWorkspace<B> {
    pub fn new(backend: B, study_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::with_tracker(backend, study_id, user_id, PublishTracker::new())
    }

    /// Workspaces sharing a tracker never publish the same study concurrently.
    pub fn with_tracker(
        backend: B,
        study_id: impl Into<String>,
        user_id: impl Into<String>,
        publishes: PublishTracker,
    ) -> Self {
        let initial = Arc::new(WorkspaceSnapshot::default());
        let (snapshots, _) = watch::channel(Arc::clone(&initial));

        Self {
            backend,
            study_id: study_id.into(),
            user_id: user_id.into(),
            publishes,
            state: Mutex::new(WorkspaceState {
                issued: 0,
                applied: 0,
                closed: false,
                next_notice_id: 1,
                current: initial,
            }),
            snapshots,
        }
    }

    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    pub fn snapshot(&self) -> Arc<WorkspaceSnapshot> {
        Arc::clone(&self.state().current)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<WorkspaceSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Discards the workspace; responses still in flight are ignored when they land.
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        debug!("Workspace for study {} closed", self.study_id);
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn dismiss_notice(&self, notice_id: u64) {
        self.replace_snapshot(|snapshot| snapshot.notices.retain(|n| n.id != notice_id));
    }

    fn state(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace_snapshot(&self, change: impl FnOnce(&mut WorkspaceSnapshot)) -> Arc<WorkspaceSnapshot> {
        let mut state = self.state();
        if state.closed {
            return Arc::clone(&state.current);
        }

        let mut next = (*state.current).clone();
        change(&mut next);
        state.current = Arc::new(next);
        self.snapshots.send_replace(Arc::clone(&state.current));
        Arc::clone(&state.current)
    }

    fn report(&self, err: &ServiceError) {
        warn!("Command on study {} failed: {}", self.study_id, err);
        let mut state = self.state();
        if state.closed {
            return;
        }

        let notice = Notice {
            id: state.next_notice_id,
            kind: NoticeKind::from(err),
            message: err.body().message,
            errors: err.reasons(),
        };
        state.next_notice_id += 1;

        let mut next = (*state.current).clone();
        next.notices.push(notice);
        state.current = Arc::new(next);
        self.snapshots.send_replace(Arc::clone(&state.current));
    }

    /// Current access, resolved afresh from the last loaded collaborator list.
    fn access(&self) -> ResolvedAccess {
        match &self.state().current.view {
            Some(view) => permission_resolver::resolve(&self.user_id, &view.collaborators),
            None => ResolvedAccess::no_access(),
        }
    }

    fn require(&self, allowed: impl FnOnce(&ResolvedAccess) -> bool) -> Result<ResolvedAccess, ServiceError> {
        let access = self.access();
        if allowed(&access) {
            Ok(access)
        } else {
            warn!(
                "Blocked command on study {} for role {:?}",
                self.study_id, access.role
            );
            Err(ServiceError::Unauthorized)
        }
    }

    async fn load(&self) -> Result<(Study, Vec<Collaborator>), ServiceError> {
        let study = self
            .backend
            .my_studies()
            .await?
            .into_iter()
            .find(|summary| summary.study.id == self.study_id)
            .map(|summary| summary.study)
            .ok_or(ServiceError::NotFound)?;
        let collaborators = self.backend.collaborators(&self.study_id).await?;
        Ok((study, collaborators))
    }

    /// Re-fetches the study and its collaborators and rebuilds the view model.
    ///
    /// A result older than the one already applied, or arriving after
    /// `close`, is dropped.
    pub async fn refresh(&self) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        let generation = {
            let mut state = self.state();
            state.issued += 1;
            state.issued
        };

        let (study, collaborators) = match self.load().await {
            Ok(loaded) => loaded,
            Err(err) => {
                let superseded = generation <= self.state().applied;
                if superseded {
                    debug!(
                        "Ignoring failure of superseded refresh {} for study {}: {}",
                        generation, self.study_id, err
                    );
                } else {
                    self.report(&err);
                }
                return Err(err);
            }
        };

        let busy = self.publishes.is_busy(&self.study_id);
        let view = view_model::assemble(&self.user_id, study, collaborators, busy);

        let mut state = self.state();
        if state.closed || generation <= state.applied {
            debug!(
                "Dropping stale refresh {} for study {} (applied {}, closed {})",
                generation, self.study_id, state.applied, state.closed
            );
            return Ok(Arc::clone(&state.current));
        }

        state.applied = generation;
        let mut next = (*state.current).clone();
        next.generation = generation;
        next.view = Some(view);
        state.current = Arc::new(next);
        self.snapshots.send_replace(Arc::clone(&state.current));
        Ok(Arc::clone(&state.current))
    }

    async fn settle<T>(&self, outcome: Result<T, ServiceError>) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        match outcome {
            Ok(_) => self.refresh().await,
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    pub async fn edit(&self, fields: StudyFields) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        self.require(|a| a.capabilities.can_edit_draft)?;
        let outcome = self.backend.update_study(&self.study_id, &fields).await;
        self.settle(outcome).await
    }

    pub async fn assign_quiz(&self, quiz_id: &str) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        self.require(|a| a.capabilities.can_edit_draft)?;
        let outcome = self.backend.assign_quiz(&self.study_id, quiz_id).await;
        self.settle(outcome).await
    }

    /// Publishes the draft. The view reports busy until the request settles,
    /// and a second publish of the same study is refused meanwhile.
    pub async fn publish(&self) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        self.require(|a| a.capabilities.can_publish)?;
        let in_flight = PublishInFlight {
            workspace: self,
            _ticket: self.publishes.try_begin(&self.study_id)?,
        };

        self.set_publish_busy(true);
        info!("Publishing study {}", self.study_id);
        let outcome = self.backend.publish(&self.study_id).await;
        drop(in_flight);

        self.settle(outcome).await
    }

    fn set_publish_busy(&self, busy: bool) {
        self.replace_snapshot(|snapshot| {
            if let Some(view) = &snapshot.view {
                snapshot.view = Some(view.with_publish_busy(busy));
            }
        });
    }

    pub async fn invite(&self, request: InviteRequest) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        let access = self.require(|a| a.capabilities.can_invite)?;
        if !access.can_grant(request.role) {
            return Err(ServiceError::Forbidden);
        }
        request.target()?;

        let outcome = self.backend.invite(&self.study_id, &request).await;
        self.settle(outcome).await
    }

    pub async fn change_role(
        &self,
        collaborator_id: &str,
        role: Role,
    ) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        let access = self.require(|a| a.capabilities.can_invite)?;
        if !access.can_grant(role) {
            return Err(ServiceError::Forbidden);
        }

        let outcome = self
            .backend
            .change_role(&self.study_id, collaborator_id, role)
            .await;
        self.settle(outcome).await
    }

    /// Removes a collaborator. Removing yourself needs no invite capability.
    pub async fn remove(&self, collaborator_id: &str) -> Result<Arc<WorkspaceSnapshot>, ServiceError> {
        let is_self_removal = self
            .snapshot()
            .view
            .as_ref()
            .and_then(|view| view.collaborators.iter().find(|c| c.id == collaborator_id))
            .map(|c| c.user_id == self.user_id)
            .unwrap_or(false);

        if !is_self_removal {
            self.require(|a| a.capabilities.can_invite)?;
        }

        let outcome = self
            .backend
            .remove_collaborator(&self.study_id, collaborator_id)
            .await;

        // Leaving the study ends access; there is nothing left to refresh.
        if is_self_removal && outcome.is_ok() {
            info!("Left study {}", self.study_id);
            return Ok(self.replace_snapshot(|snapshot| snapshot.view = None));
        }
        self.settle(outcome).await
    }
}
