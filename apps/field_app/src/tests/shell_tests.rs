use super::*;
use std::{io::Cursor, sync::Arc};

use client_core::{Collaborators, DataUrlEncoder, FixedDescription};
use crossbeam_channel::bounded;
use shared::domain::{IssueStatus, Priority};
use storage::Storage;

use crate::backend_bridge::runtime;

fn seeded() -> AppState {
    AppState::new(Storage::seeded())
}

fn events(line: &str, state: &AppState) -> Vec<UiEvent> {
    match parse_command(line, state).expect("parses") {
        Some(ShellCommand::Events(events)) => events,
        other => panic!("expected events for '{line}', got {other:?}"),
    }
}

#[test]
fn blank_lines_and_comments_are_skipped() {
    let state = seeded();
    assert_eq!(parse_command("   ", &state).expect("parses"), None);
    assert_eq!(parse_command("# setup", &state).expect("parses"), None);
}

#[test]
fn login_expands_to_form_events() {
    let parsed = events("login engenharia 1957", &seeded());
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[2], UiEvent::SubmitLogin);
}

#[test]
fn set_keeps_the_rest_of_the_line() {
    let parsed = events("set titulo Falta rejunte no box", &seeded());
    assert_eq!(
        parsed,
        vec![UiEvent::SetDraftField {
            field: "titulo".into(),
            value: "Falta rejunte no box".into(),
        }]
    );
}

#[test]
fn filters_build_on_the_current_filter() {
    let mut state = seeded();
    state.issue_filter.priority = Some(Priority::High);

    let parsed = events("filter status Aguardando Aprovação", &state);
    match &parsed[..] {
        [UiEvent::SetIssueFilter(filter)] => {
            assert_eq!(filter.priority, Some(Priority::High));
            assert_eq!(filter.status, Some(IssueStatus::WaitingApproval));
        }
        other => panic!("unexpected events {other:?}"),
    }

    let parsed = events("filter priority all", &state);
    assert!(matches!(&parsed[..], [UiEvent::SetIssueFilter(f)] if f.priority.is_none()));

    assert!(parse_command("filter until amanhã", &state).is_err());
    assert!(parse_command("filter color red", &state).is_err());
}

#[test]
fn ids_resolve_by_prefix_and_usernames() {
    let mut state = seeded();
    let issue = workflow::issues::create_issue(
        workflow::drafts::IssueInput {
            title: "Porta".into(),
            description: String::new(),
            priority: Priority::Low,
            assignee: "Marcenaria".into(),
            requested_by: "Ailton".into(),
            deadline: chrono::NaiveDate::from_ymd_opt(2023, 11, 1).expect("date"),
            location: "Apto 12".into(),
            photos: Vec::new(),
        },
        now(),
    );
    let full = issue.id.clone();
    state.store.insert_issue(issue);

    let prefix = &full.as_str()[..8];
    assert_eq!(
        events(&format!("start {prefix}"), &state),
        vec![UiEvent::StartIssue(full)]
    );
    assert_eq!(
        events("start 1", &state),
        vec![UiEvent::StartIssue(IssueId::from("1"))]
    );
    assert!(parse_command("start zz", &state).is_err());
    assert_eq!(
        events("delete-user Diego", &state),
        vec![UiEvent::RequestDeleteUser(UserId::from("5"))]
    );
}

#[test]
fn attach_needs_a_form_that_takes_photos() {
    let state = seeded();
    assert!(parse_command("attach foto.jpg", &state).is_err());
}

#[test]
fn unknown_commands_are_errors() {
    assert!(parse_command("dance", &seeded()).is_err());
}

#[test]
fn scripted_session_drives_backend_and_exports_store() {
    let photo_dir = tempfile::tempdir().expect("tempdir");
    let photo = photo_dir.path().join("box.png");
    std::fs::write(&photo, b"\x89PNG").expect("write photo");

    let (cmd_tx, cmd_rx) = bounded(16);
    let (ui_tx, ui_rx) = bounded(16);
    let worker = runtime::launch(
        cmd_rx,
        ui_tx,
        Collaborators {
            descriptions: Arc::new(FixedDescription("Rejunte ausente no box.".into())),
            images: Arc::new(DataUrlEncoder::default()),
            connectivity: None,
        },
        Duration::ZERO,
    );

    let script = format!(
        "login ailton 123\n\
         new issue\n\
         set titulo Falta rejunte no box\n\
         set local Apto 101\n\
         set responsavel Azulejista\n\
         set prazo 2030-01-15\n\
         generate\n\
         attach {}\n\
         wait 5\n\
         confirm\n\
         view engineering\n\
         ok\n\
         export\n\
         quit\n\
         show\n",
        photo.display()
    );

    let mut out = Vec::new();
    let mut shell = Shell::new(seeded(), &cmd_tx, &ui_rx);
    shell
        .run(Cursor::new(script), &mut out)
        .expect("session runs");

    let state = shell.state();
    assert!(state.modal.is_none());
    assert!(!state.generating_description);
    let created = &state.store.issues()[0];
    assert_eq!(created.title, "Falta rejunte no box");
    assert_eq!(created.description, "Rejunte ausente no box.");
    assert_eq!(created.photos, vec!["data:image/png;base64,iVBORw==".to_string()]);
    assert_eq!(state.view, View::Issues);

    let output = String::from_utf8(out).expect("utf8 output");
    assert!(output.contains("! Acesso restrito à equipe de Engenharia."));
    assert!(output.contains("\"title\": \"Falta rejunte no box\""));

    drop(shell);
    drop(cmd_tx);
    worker.join().expect("worker exits");
}
