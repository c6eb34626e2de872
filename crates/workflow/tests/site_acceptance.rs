use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{DeliveryStatus, IssueStatus, Priority},
    error::ErrorCode,
};
use storage::Storage;
use workflow::{
    drafts::{NewDeliveryDraft, ReceiveDraft, RejectDraft, UserDraft},
    filters::{filter_issues, pending_approvals, IssueFilter, IssueTab},
    session::{authenticate, landing_view, View},
    users,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 10, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

fn assert_store_invariants(store: &Storage) {
    for issue in store.issues() {
        assert_eq!(
            issue.rejection_reason.is_some(),
            issue.status == IssueStatus::Rejected,
            "rejection reason of {}",
            issue.id
        );
        if let Some(reason) = &issue.rejection_reason {
            assert!(!reason.trim().is_empty());
        }
        if issue.completion_photos.is_some() {
            assert!(issue.status.carries_completion_photos(), "photos on {}", issue.id);
        }
    }
    for delivery in store.deliveries() {
        let received = delivery.status.is_received();
        assert_eq!(delivery.received_at.is_some(), received, "received_at of {}", delivery.id);
        assert_eq!(delivery.receiver_name.is_some(), received, "receiver of {}", delivery.id);
        assert_ne!(delivery.status, DeliveryStatus::Arrived);
    }
}

#[test]
fn delivery_problem_flows_through_review_acceptance() {
    let mut store = Storage::seeded();
    let admin = authenticate(store.users(), "Engenharia", "1957")
        .expect("admin login")
        .clone();
    assert_eq!(landing_view(&admin), View::Engineering);

    // Admin registers a new storekeeper.
    let mut user_draft = UserDraft::default();
    user_draft.set_field("nome", "Rosa").expect("field");
    user_draft.set_field("usuario", "rosa").expect("field");
    user_draft.set_field("senha", "abc").expect("field");
    user_draft.set_field("cargo", "almoxarifado").expect("field");
    users::create_user(&mut store, Some(&admin), user_draft.validate().expect("valid user"))
        .expect("create user");

    let rosa = authenticate(store.users(), "ROSA", "abc")
        .expect("new user login")
        .clone();
    assert_eq!(landing_view(&rosa), View::Issues);
    assert!(rosa.capabilities().can_manage_logistics);

    // Rosa schedules and receives a delivery with a problem.
    let mut delivery_draft = NewDeliveryDraft::default();
    for (field, value) in [
        ("material", "Areia média"),
        ("fornecedor", "Areial Sul"),
        ("quantidade", "12,5"),
        ("unidade", "m³"),
        ("previsao", "2023-10-25T07:30"),
        ("nota", " "),
    ] {
        delivery_draft.set_field(field, value).expect("field");
    }
    let delivery =
        workflow::schedule_delivery(&mut store, delivery_draft.validate().expect("valid delivery"));
    assert_eq!(delivery.quantity, 12.5);
    assert_eq!(delivery.invoice_number, None);
    assert_eq!(store.deliveries()[0].id, delivery.id);

    let mut receipt = ReceiveDraft::for_user(Some(&rosa));
    receipt.set_field("conferencia", "Problema").expect("field");
    let result = workflow::receive_delivery(
        &mut store,
        Some(&rosa),
        &delivery.id,
        receipt.validate().expect("valid receipt"),
        at(25, 8),
    )
    .expect("receive");
    let issue = result.spawned_issue.expect("problem opens an issue");
    assert_eq!(issue.priority, Priority::High);
    assert_eq!(issue.requested_by, "Rosa");
    assert_eq!(issue.deadline, at(25, 8).date());
    assert_store_invariants(&store);

    let again = workflow::receive_delivery(
        &mut store,
        Some(&rosa),
        &delivery.id,
        receipt.validate().expect("valid receipt"),
        at(25, 9),
    )
    .expect_err("second receipt");
    assert_eq!(again.code, ErrorCode::InvalidTransition);

    // High priority: listed ahead of every Medium and Low issue.
    let active = filter_issues(store.issues(), IssueTab::Active, &IssueFilter::default(), None);
    assert!(active
        .iter()
        .take_while(|i| i.priority == Priority::High)
        .any(|i| i.id == issue.id));

    // Field work, a rejection, then approval.
    workflow::start_issue(&mut store, &issue.id).expect("start");
    workflow::resolve_issue(&mut store, &issue.id, vec!["data:image/jpeg;base64,AA==".into()])
        .expect("resolve");
    assert_eq!(pending_approvals(store.issues()).len(), 3);

    let refused = workflow::approve_issue(&mut store, Some(&rosa), &issue.id).expect_err("not a reviewer");
    assert_eq!(refused.code, ErrorCode::Forbidden);

    let reject = RejectDraft::default();
    let rejected = workflow::reject_issue(&mut store, Some(&admin), &issue.id, &reject.reason)
        .expect("reject");
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Motivo não informado"));
    assert_eq!(rejected.completion_photos, None);
    assert_store_invariants(&store);

    workflow::start_issue(&mut store, &issue.id).expect("restart");
    workflow::resolve_issue(&mut store, &issue.id, Vec::new()).expect("resolve again");
    let done = workflow::approve_issue(&mut store, Some(&admin), &issue.id).expect("approve");
    assert_eq!(done.status, IssueStatus::Done);
    assert_store_invariants(&store);

    let history = filter_issues(store.issues(), IssueTab::History, &IssueFilter::default(), None);
    assert!(history.iter().any(|i| i.id == issue.id));

    // The seed admin stays protected even from itself.
    let protected = users::delete_user(&mut store, Some(&admin), &admin.id).expect_err("protected");
    assert_eq!(protected.code, ErrorCode::Forbidden);
}
