//! Issue lifecycle: Open → InProgress → WaitingApproval → Done | Rejected,
//! with Rejected able to restart into InProgress.

use chrono::NaiveDateTime;
use shared::{
    domain::{IssueId, IssueStatus, Priority},
    error::{DomainError, DomainResult, ErrorCode},
    records::{Delivery, Issue, User},
};

use crate::drafts::IssueInput;

pub const DEFAULT_REJECTION_REASON: &str = "Motivo não informado";
pub const PROBLEM_ISSUE_LOCATION: &str = "Almoxarifado Central";
pub const PROBLEM_ISSUE_ASSIGNEE: &str = "A definir";
pub const FALLBACK_REQUESTER: &str = "Almoxarifado";

pub fn create_issue(input: IssueInput, now: NaiveDateTime) -> Issue {
    Issue {
        id: IssueId::generate(),
        title: input.title,
        description: input.description,
        priority: input.priority,
        assignee: input.assignee,
        requested_by: input.requested_by,
        deadline: input.deadline,
        location: input.location,
        photos: input.photos,
        status: IssueStatus::Open,
        created_at: now,
        completion_photos: None,
        rejection_reason: None,
    }
}

/// Open → InProgress, or Rejected → InProgress on restart. A restart drops
/// the previous rejection reason and completion evidence.
pub fn start_resolution(issue: &Issue) -> DomainResult<Issue> {
    match issue.status {
        IssueStatus::Open | IssueStatus::Rejected => Ok(Issue {
            status: IssueStatus::InProgress,
            completion_photos: None,
            rejection_reason: None,
            ..issue.clone()
        }),
        other => Err(transition_error(issue, other, IssueStatus::InProgress)),
    }
}

/// InProgress → WaitingApproval, carrying zero or more completion photos.
pub fn submit_for_approval(issue: &Issue, completion_photos: Vec<String>) -> DomainResult<Issue> {
    if issue.status != IssueStatus::InProgress {
        return Err(transition_error(
            issue,
            issue.status,
            IssueStatus::WaitingApproval,
        ));
    }
    Ok(Issue {
        status: IssueStatus::WaitingApproval,
        completion_photos: Some(completion_photos),
        ..issue.clone()
    })
}

pub fn approve(issue: &Issue, reviewer: Option<&User>) -> DomainResult<Issue> {
    ensure_reviewer(reviewer)?;
    if issue.status != IssueStatus::WaitingApproval {
        return Err(transition_error(issue, issue.status, IssueStatus::Done));
    }
    Ok(Issue {
        status: IssueStatus::Done,
        ..issue.clone()
    })
}

/// WaitingApproval → Rejected. A blank reason falls back to
/// [`DEFAULT_REJECTION_REASON`].
pub fn reject(issue: &Issue, reviewer: Option<&User>, reason: &str) -> DomainResult<Issue> {
    ensure_reviewer(reviewer)?;
    if issue.status != IssueStatus::WaitingApproval {
        return Err(transition_error(issue, issue.status, IssueStatus::Rejected));
    }
    let reason = match reason.trim() {
        "" => DEFAULT_REJECTION_REASON.to_string(),
        given => given.to_string(),
    };
    Ok(Issue {
        status: IssueStatus::Rejected,
        completion_photos: None,
        rejection_reason: Some(reason),
        ..issue.clone()
    })
}

/// Issue opened automatically when a delivery is received with a problem.
pub fn issue_for_delivery_problem(
    delivery: &Delivery,
    actor: Option<&User>,
    now: NaiveDateTime,
) -> Issue {
    let invoice = delivery
        .invoice_number
        .as_deref()
        .unwrap_or("não informada");
    Issue {
        id: IssueId::generate(),
        title: format!("Problema no recebimento: {}", delivery.material),
        description: format!(
            "Recebimento com não conformidade.\nFornecedor: {}\nNota: {invoice}\nMotivo: ",
            delivery.supplier
        ),
        priority: Priority::High,
        assignee: PROBLEM_ISSUE_ASSIGNEE.to_string(),
        requested_by: actor
            .map(|user| user.name.clone())
            .unwrap_or_else(|| FALLBACK_REQUESTER.to_string()),
        deadline: now.date(),
        location: PROBLEM_ISSUE_LOCATION.to_string(),
        photos: delivery.receipt_photos.clone(),
        status: IssueStatus::Open,
        created_at: now,
        completion_photos: None,
        rejection_reason: None,
    }
}

fn ensure_reviewer(reviewer: Option<&User>) -> DomainResult<&User> {
    let Some(reviewer) = reviewer else {
        return Err(DomainError::new(
            ErrorCode::Unauthorized,
            "sign in to review issues",
        ));
    };
    if !reviewer.capabilities().can_approve {
        return Err(DomainError::forbidden(format!(
            "{} ({}) cannot approve or reject issues",
            reviewer.name, reviewer.role
        )));
    }
    Ok(reviewer)
}

fn transition_error(issue: &Issue, from: IssueStatus, to: IssueStatus) -> DomainError {
    DomainError::invalid_transition(format!(
        "issue {} cannot move from {from} to {to}",
        issue.id
    ))
}

#[cfg(test)]
#[path = "tests/issues_tests.rs"]
mod tests;
