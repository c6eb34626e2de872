//! Lifecycle rules, list derivation and access control over the entity store.
//!
//! The per-record transitions in [`issues`] and [`deliveries`] are pure:
//! they take a record and return the next version of it. The functions in
//! this module load the record, apply the transition and write the result
//! back into the caller's [`Storage`].

use chrono::NaiveDateTime;
use shared::{
    domain::{DeliveryId, DeliveryStatus, IssueId},
    error::{DomainError, DomainResult},
    records::{Delivery, Issue, User},
};
use storage::Storage;
use tracing::{info, warn};

pub mod deliveries;
pub mod drafts;
pub mod filters;
pub mod issues;
pub mod session;
pub mod users;

use drafts::{DeliveryInput, IssueInput, ReceiptInput};

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptResult {
    pub delivery: Delivery,
    /// Present when the delivery was received with a problem.
    pub spawned_issue: Option<Issue>,
}

pub fn open_issue(store: &mut Storage, input: IssueInput, now: NaiveDateTime) -> Issue {
    let issue = issues::create_issue(input, now);
    store.insert_issue(issue.clone());
    info!(issue_id = %issue.id, priority = %issue.priority, "issue opened");
    issue
}

pub fn start_issue(store: &mut Storage, issue_id: &IssueId) -> DomainResult<Issue> {
    let next = issues::start_resolution(load_issue(store, issue_id)?)
        .inspect_err(|err| warn!(issue_id = %issue_id, "start rejected: {err}"))?;
    commit_issue(store, next)
}

pub fn resolve_issue(
    store: &mut Storage,
    issue_id: &IssueId,
    completion_photos: Vec<String>,
) -> DomainResult<Issue> {
    let next = issues::submit_for_approval(load_issue(store, issue_id)?, completion_photos)
        .inspect_err(|err| warn!(issue_id = %issue_id, "resolution rejected: {err}"))?;
    commit_issue(store, next)
}

pub fn approve_issue(
    store: &mut Storage,
    reviewer: Option<&User>,
    issue_id: &IssueId,
) -> DomainResult<Issue> {
    let next = issues::approve(load_issue(store, issue_id)?, reviewer)
        .inspect_err(|err| warn!(issue_id = %issue_id, "approval rejected: {err}"))?;
    commit_issue(store, next)
}

pub fn reject_issue(
    store: &mut Storage,
    reviewer: Option<&User>,
    issue_id: &IssueId,
    reason: &str,
) -> DomainResult<Issue> {
    let next = issues::reject(load_issue(store, issue_id)?, reviewer, reason)
        .inspect_err(|err| warn!(issue_id = %issue_id, "rejection refused: {err}"))?;
    commit_issue(store, next)
}

pub fn schedule_delivery(store: &mut Storage, input: DeliveryInput) -> Delivery {
    let delivery = deliveries::schedule_delivery(input);
    store.insert_delivery(delivery.clone());
    info!(delivery_id = %delivery.id, material = %delivery.material, "delivery scheduled");
    delivery
}

/// Receives a delivery; a `Problem` outcome also opens exactly one new issue.
pub fn receive_delivery(
    store: &mut Storage,
    actor: Option<&User>,
    delivery_id: &DeliveryId,
    input: ReceiptInput,
    now: NaiveDateTime,
) -> DomainResult<ReceiptResult> {
    let current = store
        .delivery(delivery_id)
        .ok_or_else(|| DomainError::not_found(format!("delivery {delivery_id} not found")))?;
    let delivery = deliveries::receive(current, input, now)
        .inspect_err(|err| warn!(delivery_id = %delivery_id, "receipt rejected: {err}"))?;
    store.replace_delivery(delivery.clone())?;
    info!(
        delivery_id = %delivery.id,
        status = %delivery.status,
        receiver = delivery.receiver_name.as_deref().unwrap_or_default(),
        "delivery received"
    );

    let spawned_issue = (delivery.status == DeliveryStatus::Problem).then(|| {
        let issue = issues::issue_for_delivery_problem(&delivery, actor, now);
        store.insert_issue(issue.clone());
        info!(issue_id = %issue.id, delivery_id = %delivery.id, "issue opened for delivery problem");
        issue
    });

    Ok(ReceiptResult {
        delivery,
        spawned_issue,
    })
}

fn load_issue<'a>(store: &'a Storage, issue_id: &IssueId) -> DomainResult<&'a Issue> {
    store
        .issue(issue_id)
        .ok_or_else(|| DomainError::not_found(format!("issue {issue_id} not found")))
}

fn commit_issue(store: &mut Storage, issue: Issue) -> DomainResult<Issue> {
    store.replace_issue(issue.clone())?;
    info!(issue_id = %issue.id, status = %issue.status, "issue status changed");
    Ok(issue)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
