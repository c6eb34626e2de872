//! Explicit application state and the reducer that advances it.
//!
//! `reduce` consumes the current state and returns the next one together with
//! the backend commands the transition asks for. It never blocks and never
//! talks to the backend itself, so every rule here is testable in isolation.

use chrono::NaiveDateTime;
use client_core::DescriptionRequest;
use shared::{
    error::{DomainResult, ErrorCode},
    records::{Delivery, Issue, User},
};
use storage::Storage;
use tracing::{debug, info, warn};
use workflow::{
    drafts::{remove_photo, LoginDraft, NewDeliveryDraft, NewIssueDraft, ReceiveDraft, UserDraft},
    filters::{filter_deliveries, filter_issues, pending_approvals, DeliveryFilter, IssueFilter, IssueTab},
    session::{authenticate, ensure_can_open, landing_view, Session, View, RESTRICTED_ACCESS},
    users,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{Modal, PhotoField, UiEvent};

pub const LOGIN_REQUIRED: &str = "Por favor, faça login para criar novos itens.";

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Storage,
    pub session: Option<Session>,
    pub view: View,
    pub issue_tab: IssueTab,
    pub issue_filter: IssueFilter,
    pub delivery_filter: DeliveryFilter,
    pub search: String,
    pub modal: Option<Modal>,
    /// Set while a description request is in flight; blocks a second one.
    pub generating_description: bool,
    pub online: bool,
    /// Blocking message the operator has to dismiss.
    pub alert: Option<String>,
    /// Inline message under the login form.
    pub login_error: Option<String>,
    pub login: LoginDraft,
}

impl AppState {
    pub fn new(store: Storage) -> Self {
        Self {
            store,
            session: None,
            view: View::Issues,
            issue_tab: IssueTab::Active,
            issue_filter: IssueFilter::default(),
            delivery_filter: DeliveryFilter::default(),
            search: String::new(),
            modal: None,
            generating_description: false,
            online: true,
            alert: None,
            login_error: None,
            login: LoginDraft::default(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session
            .as_ref()
            .and_then(|session| self.store.user(&session.user_id))
    }

    pub fn visible_issues(&self) -> Vec<&Issue> {
        filter_issues(
            self.store.issues(),
            self.issue_tab,
            &self.issue_filter,
            Some(&self.search),
        )
    }

    pub fn visible_deliveries(&self) -> Vec<&Delivery> {
        filter_deliveries(self.store.deliveries(), &self.delivery_filter, Some(&self.search))
    }

    /// Count shown next to the engineering entry; only reviewers see it.
    pub fn pending_badge(&self) -> Option<usize> {
        if !self.current_user().is_some_and(|u| u.capabilities().can_approve) {
            return None;
        }
        let pending = pending_approvals(self.store.issues()).len();
        (pending > 0).then_some(pending)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Storage::empty())
    }
}

#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub commands: Vec<BackendCommand>,
}

pub fn reduce(mut state: AppState, event: UiEvent, now: NaiveDateTime) -> Transition {
    let mut commands = Vec::new();

    match event {
        UiEvent::SetLoginField { field, value } => {
            if let Err(err) = state.login.set_field(&field, &value) {
                state.alert = Some(err.message);
            }
        }
        UiEvent::SubmitLogin => submit_login(&mut state),
        UiEvent::Logout => {
            if let Some(user) = state.current_user() {
                info!(username = %user.username, "signed out");
            }
            state.session = None;
            state.modal = None;
            state.view = View::Profile;
        }
        UiEvent::Navigate(view) => match ensure_can_open(view, state.current_user()) {
            Ok(()) => state.view = view,
            Err(err) => {
                debug!(?view, "navigation blocked");
                state.alert = Some(err.message);
            }
        },
        UiEvent::DismissAlert => state.alert = None,

        UiEvent::SelectTab(tab) => {
            state.issue_tab = tab;
            if state.issue_filter.status.is_some_and(|status| !tab.includes(status)) {
                state.issue_filter.status = None;
            }
        }
        UiEvent::SetSearch(query) => state.search = query,
        UiEvent::SetIssueFilter(filter) => state.issue_filter = filter,
        UiEvent::SetDeliveryFilter(filter) => state.delivery_filter = filter,
        UiEvent::ClearFilters => match state.view {
            View::Issues => state.issue_filter = IssueFilter::default(),
            View::Logistics => state.delivery_filter = DeliveryFilter::default(),
            View::Engineering | View::Profile => {}
        },

        UiEvent::OpenNewIssue => {
            if require_session(&mut state) {
                state.modal = Some(Modal::NewIssue(NewIssueDraft::for_user(state.current_user())));
            }
        }
        UiEvent::OpenNewDelivery => {
            if require_session(&mut state) {
                state.modal = Some(Modal::NewDelivery(NewDeliveryDraft::default()));
            }
        }
        UiEvent::OpenReceive(delivery_id) => match state.store.delivery(&delivery_id) {
            Some(delivery) if !delivery.status.is_received() => {
                state.modal = Some(Modal::Receive {
                    delivery_id,
                    draft: ReceiveDraft::for_user(state.current_user()),
                });
            }
            Some(_) => debug!(%delivery_id, "delivery already received"),
            None => debug!(%delivery_id, "no such delivery"),
        },
        UiEvent::OpenResolve(issue_id) => {
            if state.store.issue(&issue_id).is_some() {
                state.modal = Some(Modal::Resolve {
                    issue_id,
                    draft: Default::default(),
                });
            } else {
                debug!(%issue_id, "resolve without a target issue");
            }
        }
        UiEvent::OpenReject(issue_id) => {
            if !state.current_user().is_some_and(|u| u.capabilities().can_approve) {
                state.alert = Some(RESTRICTED_ACCESS.to_string());
            } else if state.store.issue(&issue_id).is_some() {
                state.modal = Some(Modal::Reject {
                    issue_id,
                    draft: Default::default(),
                });
            } else {
                debug!(%issue_id, "reject without a target issue");
            }
        }
        UiEvent::OpenNewUser => {
            if can_manage_users(&state) {
                state.modal = Some(Modal::User {
                    editing: None,
                    draft: Default::default(),
                });
            } else {
                state.alert = Some(RESTRICTED_ACCESS.to_string());
            }
        }
        UiEvent::OpenEditUser(user_id) => {
            let target = state.store.user(&user_id).filter(|u| users::is_editable(u));
            match target {
                Some(user) if can_manage_users(&state) => {
                    state.modal = Some(Modal::User {
                        editing: Some(user_id.clone()),
                        draft: UserDraft::from_user(user),
                    });
                }
                _ => debug!(%user_id, "edit not offered for user"),
            }
        }
        UiEvent::RequestDeleteUser(user_id) => {
            let offered = can_manage_users(&state)
                && state.store.user(&user_id).is_some_and(users::is_editable);
            if offered {
                state.modal = Some(Modal::ConfirmDeleteUser { user_id });
            } else {
                debug!(%user_id, "delete not offered for user");
            }
        }
        UiEvent::SetDraftField { field, value } => {
            if let Err(err) = set_draft_field(&mut state, &field, &value) {
                state.alert = Some(err.message);
            }
        }
        UiEvent::AttachPhotos { field, paths } => {
            let owned = state.modal.as_ref().is_some_and(|modal| modal.owns(field));
            if owned && !paths.is_empty() {
                commands.push(BackendCommand::EncodeImages { field, paths });
            }
        }
        UiEvent::RemovePhoto { field, index } => match (&mut state.modal, field) {
            (Some(Modal::Receive { draft, .. }), PhotoField::Signature) => draft.signature = None,
            (Some(modal), field) => {
                if let Some(photos) = modal.photos_mut(field) {
                    remove_photo(photos, index);
                }
            }
            (None, _) => {}
        },
        UiEvent::GenerateDescription => {
            if let Some(Modal::NewIssue(draft)) = &state.modal {
                if draft.can_generate_description() && !state.generating_description {
                    state.generating_description = true;
                    commands.push(BackendCommand::GenerateDescription(DescriptionRequest {
                        title: draft.title.trim().to_string(),
                        location: draft.location.trim().to_string(),
                        priority: draft.priority,
                    }));
                }
            }
        }
        UiEvent::ConfirmModal => {
            if let Some(modal) = state.modal.take() {
                if !modal.can_confirm() {
                    state.modal = Some(modal);
                } else {
                    let retained = modal.clone();
                    if let Err(err) = confirm_modal(&mut state, modal, now) {
                        if err.code == ErrorCode::Validation {
                            state.modal = Some(retained);
                        }
                        state.alert = Some(err.message);
                    }
                }
            }
        }
        UiEvent::CloseModal => state.modal = None,

        UiEvent::StartIssue(issue_id) => {
            if let Err(err) = workflow::start_issue(&mut state.store, &issue_id) {
                state.alert = Some(err.message);
            }
        }
        UiEvent::ApproveIssue(issue_id) => {
            let reviewer = state.current_user().cloned();
            if let Err(err) = workflow::approve_issue(&mut state.store, reviewer.as_ref(), &issue_id) {
                state.alert = Some(err.message);
            }
        }

        UiEvent::DescriptionGenerated(text) => {
            state.generating_description = false;
            match &mut state.modal {
                Some(Modal::NewIssue(draft)) => draft.description = text,
                _ => debug!("issue form closed; dropping generated description"),
            }
        }
        UiEvent::PhotosEncoded { field, images } => match &mut state.modal {
            Some(Modal::Receive { draft, .. }) if field == PhotoField::Signature => {
                if let Some(signature) = images.into_iter().next() {
                    draft.signature = Some(signature);
                }
            }
            Some(modal) => match modal.photos_mut(field) {
                Some(photos) => photos.extend(images),
                None => debug!(?field, "owning form closed; dropping encoded photos"),
            },
            None => debug!(?field, "owning form closed; dropping encoded photos"),
        },
        UiEvent::ConnectivityChanged(online) => state.online = online,
        UiEvent::BackendUnavailable(message) => {
            warn!("{message}");
            state.generating_description = false;
            state.alert = Some(message);
        }
    }

    Transition { state, commands }
}

fn submit_login(state: &mut AppState) {
    let outcome = authenticate(state.store.users(), &state.login.username, &state.login.password)
        .map(|user| (user.id.clone(), landing_view(user), user.username.clone()));
    match outcome {
        Ok((user_id, view, username)) => {
            info!(%username, "signed in");
            state.session = Some(Session { user_id });
            state.view = view;
            state.login = LoginDraft::default();
            state.login_error = None;
        }
        Err(err) => {
            warn!(username = %state.login.username, "sign-in failed");
            state.login_error = Some(err.message);
        }
    }
}

/// Creation forms need a signed-in user; otherwise route to the login.
fn require_session(state: &mut AppState) -> bool {
    if state.current_user().is_some() {
        return true;
    }
    state.alert = Some(LOGIN_REQUIRED.to_string());
    state.view = View::Profile;
    false
}

fn can_manage_users(state: &AppState) -> bool {
    state
        .current_user()
        .is_some_and(|u| u.capabilities().can_manage_users)
}

fn set_draft_field(state: &mut AppState, field: &str, value: &str) -> DomainResult<()> {
    match &mut state.modal {
        Some(Modal::NewIssue(draft)) => draft.set_field(field, value),
        Some(Modal::NewDelivery(draft)) => draft.set_field(field, value),
        Some(Modal::Receive { draft, .. }) => draft.set_field(field, value),
        Some(Modal::Reject { draft, .. }) => draft.set_field(field, value),
        Some(Modal::User { draft, .. }) => draft.set_field(field, value),
        Some(Modal::Resolve { .. } | Modal::ConfirmDeleteUser { .. }) | None => {
            debug!(field, "no editable form open");
            Ok(())
        }
    }
}

fn confirm_modal(state: &mut AppState, modal: Modal, now: NaiveDateTime) -> DomainResult<()> {
    let actor = state.current_user().cloned();
    let store = &mut state.store;
    match modal {
        Modal::NewIssue(draft) => {
            workflow::open_issue(store, draft.validate()?, now);
        }
        Modal::NewDelivery(draft) => {
            workflow::schedule_delivery(store, draft.validate()?);
        }
        Modal::Receive { delivery_id, draft } => {
            let result =
                workflow::receive_delivery(store, actor.as_ref(), &delivery_id, draft.validate()?, now)?;
            if let Some(issue) = result.spawned_issue {
                debug!(issue_id = %issue.id, "problem receipt opened an issue");
            }
        }
        Modal::Resolve { issue_id, draft } => {
            workflow::resolve_issue(store, &issue_id, draft.completion_photos)?;
        }
        Modal::Reject { issue_id, draft } => {
            workflow::reject_issue(store, actor.as_ref(), &issue_id, &draft.reason)?;
        }
        Modal::User { editing: None, draft } => {
            users::create_user(store, actor.as_ref(), draft.validate()?)?;
        }
        Modal::User {
            editing: Some(user_id),
            draft,
        } => {
            users::update_user(store, actor.as_ref(), &user_id, draft.validate()?)?;
        }
        Modal::ConfirmDeleteUser { user_id } => {
            users::delete_user(store, actor.as_ref(), &user_id)?;
            if state.session.as_ref().is_some_and(|s| s.user_id == user_id) {
                state.session = None;
                state.view = View::Profile;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
