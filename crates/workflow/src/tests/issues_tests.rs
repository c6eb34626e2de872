use super::*;
use chrono::NaiveDate;
use shared::domain::{DeliveryStatus, Role};
use storage::Storage;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 10, 26)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

fn engineer() -> User {
    Storage::seeded()
        .user_by_username("engenharia")
        .cloned()
        .expect("seed admin")
}

fn foreman() -> User {
    Storage::seeded()
        .user_by_username("ailton")
        .cloned()
        .expect("seed foreman")
}

fn issue_with(status: IssueStatus) -> Issue {
    Issue {
        status,
        ..Storage::seeded().issues()[0].clone()
    }
}

#[test]
fn full_happy_path_reaches_done() {
    let open = issue_with(IssueStatus::Open);
    let started = start_resolution(&open).expect("start");
    assert_eq!(started.status, IssueStatus::InProgress);

    let waiting =
        submit_for_approval(&started, vec!["data:image/png;base64,AAAA".into()]).expect("submit");
    assert_eq!(waiting.status, IssueStatus::WaitingApproval);
    assert_eq!(waiting.completion_photos.as_ref().map(Vec::len), Some(1));

    let done = approve(&waiting, Some(&engineer())).expect("approve");
    assert_eq!(done.status, IssueStatus::Done);
    assert!(done.completion_photos.is_some());
}

#[test]
fn submission_accepts_zero_photos() {
    let started = issue_with(IssueStatus::InProgress);
    let waiting = submit_for_approval(&started, Vec::new()).expect("submit");
    assert_eq!(waiting.completion_photos, Some(Vec::new()));
}

#[test]
fn waiting_approval_only_reachable_from_in_progress() {
    for status in IssueStatus::ALL {
        let result = submit_for_approval(&issue_with(status), Vec::new());
        if status == IssueStatus::InProgress {
            assert!(result.is_ok());
        } else {
            let err = result.expect_err("should fail");
            assert_eq!(err.code, ErrorCode::InvalidTransition, "{status:?}");
        }
    }
}

#[test]
fn done_and_rejected_only_reachable_from_waiting_approval() {
    let reviewer = engineer();
    for status in IssueStatus::ALL {
        let approved = approve(&issue_with(status), Some(&reviewer));
        let rejected = reject(&issue_with(status), Some(&reviewer), "refazer");
        assert_eq!(approved.is_ok(), status == IssueStatus::WaitingApproval);
        assert_eq!(rejected.is_ok(), status == IssueStatus::WaitingApproval);
    }
}

#[test]
fn done_is_terminal_for_start() {
    let err = start_resolution(&issue_with(IssueStatus::Done)).expect_err("terminal");
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    assert!(start_resolution(&issue_with(IssueStatus::InProgress)).is_err());
}

#[test]
fn rejection_reason_falls_back_to_placeholder() {
    let waiting = issue_with(IssueStatus::WaitingApproval);
    let rejected = reject(&waiting, Some(&engineer()), "   ").expect("reject");
    assert_eq!(rejected.status, IssueStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );

    let rejected = reject(&waiting, Some(&engineer()), " rejunte manchado ").expect("reject");
    assert_eq!(rejected.rejection_reason.as_deref(), Some("rejunte manchado"));
}

#[test]
fn restart_clears_rejection_and_completion_evidence() {
    let waiting = Issue {
        completion_photos: Some(vec!["p".into()]),
        ..issue_with(IssueStatus::WaitingApproval)
    };
    let rejected = reject(&waiting, Some(&engineer()), "refazer").expect("reject");
    assert!(rejected.completion_photos.is_none());

    let restarted = start_resolution(&rejected).expect("restart");
    assert_eq!(restarted.status, IssueStatus::InProgress);
    assert!(restarted.rejection_reason.is_none());
    assert!(restarted.completion_photos.is_none());
}

#[test]
fn review_requires_elevated_role() {
    let waiting = issue_with(IssueStatus::WaitingApproval);
    let err = approve(&waiting, Some(&foreman())).expect_err("forbidden");
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = reject(&waiting, None, "x").expect_err("unauthenticated");
    assert_eq!(err.code, ErrorCode::Unauthorized);

    let custom_engineer = User {
        role: Role::from("ENGENHARIA"),
        ..foreman()
    };
    assert!(approve(&waiting, Some(&custom_engineer)).is_ok());
}

#[test]
fn created_issue_starts_open_with_fresh_id() {
    let input = IssueInput {
        title: "Porta empenada".into(),
        description: String::new(),
        priority: Priority::Low,
        assignee: "Marcenaria".into(),
        requested_by: "Diego".into(),
        deadline: now().date(),
        location: "Bloco B, Apto 12".into(),
        photos: Vec::new(),
    };
    let first = create_issue(input.clone(), now());
    let second = create_issue(input, now());
    assert_eq!(first.status, IssueStatus::Open);
    assert_eq!(first.created_at, now());
    assert_ne!(first.id, second.id);
}

#[test]
fn delivery_problem_issue_is_high_priority_and_dated_today() {
    let delivery = Delivery {
        status: DeliveryStatus::Problem,
        receipt_photos: vec!["data:image/jpeg;base64,BBBB".into()],
        ..Storage::seeded().deliveries()[0].clone()
    };

    let issue = issue_for_delivery_problem(&delivery, Some(&foreman()), now());
    assert!(issue.title.contains("Cimento CP-II"));
    assert_eq!(issue.priority, Priority::High);
    assert_eq!(issue.location, PROBLEM_ISSUE_LOCATION);
    assert_eq!(issue.deadline, now().date());
    assert_eq!(issue.requested_by, "Ailton");
    assert_eq!(issue.photos, delivery.receipt_photos);
    assert!(issue.description.contains("Fornecedor: Votorantim"));
    assert!(issue.description.contains("Nota: não informada"));

    let anonymous = issue_for_delivery_problem(&delivery, None, now());
    assert_eq!(anonymous.requested_by, FALLBACK_REQUESTER);
}

#[test]
fn overdue_flag_ignores_done_issues() {
    let today = NaiveDate::from_ymd_opt(2023, 10, 26).unwrap();
    assert!(issue_with(IssueStatus::Open).is_overdue(today));
    assert!(!issue_with(IssueStatus::Done).is_overdue(today));
    let on_time = Issue {
        deadline: today,
        ..issue_with(IssueStatus::Open)
    };
    assert!(!on_time.is_overdue(today));
}
