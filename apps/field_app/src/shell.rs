//! Line-oriented operator shell: parses commands into controller events,
//! feeds them through the reducer and prints the resulting screen.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use shared::domain::{DeliveryId, IssueId, UserId};
use workflow::{drafts::parse_date, filters::IssueTab, session::View};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{PhotoField, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::{reduce, AppState, Transition},
};
use crate::render::{export_json, render_screen};

pub const HELP: &str = "\
Comandos:
  login <usuário> <senha> | logout
  view issues|logistics|engineering|profile
  tab active|history
  search [texto]
  filter status|priority|assignee|until <valor|all>
  filter material|invoice|date|delivery-status <valor|all>
  filter clear
  new issue|delivery|user
  set <campo> <valor>
  attach <arquivo>... | signature <arquivo> | remove-photo <n> | remove-signature
  generate
  confirm | cancel
  start|resolve|approve|reject <pendência>
  receive <entrega>
  edit-user|delete-user <usuário>
  ok
  show | export | wait [segundos] | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Events(Vec<UiEvent>),
    Show,
    Export,
    Wait(Duration),
    Help,
    Quit,
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
///
/// Some commands depend on the current screen (open form, current filters),
/// so the state is consulted but never changed here.
pub fn parse_command(line: &str, state: &AppState) -> anyhow::Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = split_word(line);
    let events = match verb {
        "show" => return Ok(Some(ShellCommand::Show)),
        "export" => return Ok(Some(ShellCommand::Export)),
        "help" => return Ok(Some(ShellCommand::Help)),
        "quit" | "exit" => return Ok(Some(ShellCommand::Quit)),
        "wait" => {
            let secs = if rest.is_empty() {
                10
            } else {
                rest.parse::<u64>()
                    .with_context(|| format!("invalid wait time '{rest}'"))?
            };
            return Ok(Some(ShellCommand::Wait(Duration::from_secs(secs))));
        }

        "login" => {
            let (username, password) = split_word(rest);
            if username.is_empty() {
                bail!("usage: login <username> <password>");
            }
            vec![
                UiEvent::SetLoginField {
                    field: "username".into(),
                    value: username.into(),
                },
                UiEvent::SetLoginField {
                    field: "password".into(),
                    value: password.into(),
                },
                UiEvent::SubmitLogin,
            ]
        }
        "logout" => vec![UiEvent::Logout],
        "view" => vec![UiEvent::Navigate(parse_view(rest)?)],
        "tab" => vec![UiEvent::SelectTab(match rest {
            "active" | "ativas" => IssueTab::Active,
            "history" | "historico" | "histórico" => IssueTab::History,
            other => bail!("unknown tab '{other}'"),
        })],
        "search" => vec![UiEvent::SetSearch(rest.to_string())],
        "filter" => vec![parse_filter(rest, state)?],
        "new" => vec![match rest {
            "issue" => UiEvent::OpenNewIssue,
            "delivery" => UiEvent::OpenNewDelivery,
            "user" => UiEvent::OpenNewUser,
            other => bail!("cannot create '{other}'"),
        }],
        "set" => {
            let (field, value) = split_word(rest);
            if field.is_empty() {
                bail!("usage: set <field> <value>");
            }
            vec![UiEvent::SetDraftField {
                field: field.into(),
                value: value.replace("\\n", "\n"),
            }]
        }
        "attach" => {
            let field = state
                .modal
                .as_ref()
                .and_then(|modal| modal.default_photo_field())
                .ok_or_else(|| anyhow!("the open form takes no photos"))?;
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                bail!("usage: attach <file>...");
            }
            vec![UiEvent::AttachPhotos { field, paths }]
        }
        "signature" => {
            if rest.is_empty() {
                bail!("usage: signature <file>");
            }
            vec![UiEvent::AttachPhotos {
                field: PhotoField::Signature,
                paths: vec![PathBuf::from(rest)],
            }]
        }
        "remove-photo" => {
            let field = state
                .modal
                .as_ref()
                .and_then(|modal| modal.default_photo_field())
                .ok_or_else(|| anyhow!("the open form takes no photos"))?;
            let index = rest
                .parse::<usize>()
                .with_context(|| format!("invalid photo index '{rest}'"))?;
            vec![UiEvent::RemovePhoto { field, index }]
        }
        "remove-signature" => vec![UiEvent::RemovePhoto {
            field: PhotoField::Signature,
            index: 0,
        }],
        "generate" => vec![UiEvent::GenerateDescription],
        "confirm" => vec![UiEvent::ConfirmModal],
        "cancel" => vec![UiEvent::CloseModal],
        "ok" => vec![UiEvent::DismissAlert],

        "start" => vec![UiEvent::StartIssue(issue_id(rest, state)?)],
        "resolve" => vec![UiEvent::OpenResolve(issue_id(rest, state)?)],
        "approve" => vec![UiEvent::ApproveIssue(issue_id(rest, state)?)],
        "reject" => vec![UiEvent::OpenReject(issue_id(rest, state)?)],
        "receive" => vec![UiEvent::OpenReceive(delivery_id(rest, state)?)],
        "edit-user" => vec![UiEvent::OpenEditUser(user_id(rest, state)?)],
        "delete-user" => vec![UiEvent::RequestDeleteUser(user_id(rest, state)?)],

        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(ShellCommand::Events(events)))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn parse_view(raw: &str) -> anyhow::Result<View> {
    Ok(match raw {
        "issues" | "pendencias" | "pendências" => View::Issues,
        "logistics" | "logistica" | "logística" => View::Logistics,
        "engineering" | "engenharia" => View::Engineering,
        "profile" | "perfil" => View::Profile,
        other => bail!("unknown view '{other}'"),
    })
}

fn is_all(value: &str) -> bool {
    value.is_empty() || matches!(value, "all" | "todos" | "todas")
}

fn parse_filter(rest: &str, state: &AppState) -> anyhow::Result<UiEvent> {
    let (field, value) = split_word(rest);
    let mut issues = state.issue_filter.clone();
    let mut deliveries = state.delivery_filter.clone();
    let clear = is_all(value);

    let event = match field {
        "clear" => UiEvent::ClearFilters,
        "status" => {
            issues.status = if clear { None } else { Some(value.parse()?) };
            UiEvent::SetIssueFilter(issues)
        }
        "priority" => {
            issues.priority = if clear { None } else { Some(value.parse()?) };
            UiEvent::SetIssueFilter(issues)
        }
        "assignee" => {
            issues.assignee = (!clear).then(|| value.to_string());
            UiEvent::SetIssueFilter(issues)
        }
        "until" => {
            issues.deadline_until = if clear { None } else { Some(parse_date(value)?) };
            UiEvent::SetIssueFilter(issues)
        }
        "material" => {
            deliveries.material = (!clear).then(|| value.to_string());
            UiEvent::SetDeliveryFilter(deliveries)
        }
        "invoice" => {
            deliveries.invoice_number = (!clear).then(|| value.to_string());
            UiEvent::SetDeliveryFilter(deliveries)
        }
        "date" => {
            deliveries.date = if clear { None } else { Some(parse_date(value)?) };
            UiEvent::SetDeliveryFilter(deliveries)
        }
        "delivery-status" => {
            deliveries.status = if clear { None } else { Some(value.parse()?) };
            UiEvent::SetDeliveryFilter(deliveries)
        }
        other => bail!("unknown filter '{other}'"),
    };
    Ok(event)
}

/// Exact id, or an unambiguous prefix of one.
fn resolve_id<'a>(token: &str, ids: impl Iterator<Item = &'a str>) -> anyhow::Result<String> {
    if token.is_empty() {
        bail!("an id is required");
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(token)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == token) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [single] => Ok(single.to_string()),
        [] => bail!("nothing matches '{token}'"),
        _ => bail!("'{token}' is ambiguous"),
    }
}

fn issue_id(token: &str, state: &AppState) -> anyhow::Result<IssueId> {
    let ids = state.store.issues().iter().map(|issue| issue.id.as_str());
    Ok(IssueId::from(resolve_id(token, ids)?.as_str()))
}

fn delivery_id(token: &str, state: &AppState) -> anyhow::Result<DeliveryId> {
    let ids = state.store.deliveries().iter().map(|delivery| delivery.id.as_str());
    Ok(DeliveryId::from(resolve_id(token, ids)?.as_str()))
}

/// Accepts a username as well as an id.
fn user_id(token: &str, state: &AppState) -> anyhow::Result<UserId> {
    if let Some(user) = state.store.user_by_username(token) {
        return Ok(user.id.clone());
    }
    let ids = state.store.users().iter().map(|user| user.id.as_str());
    Ok(UserId::from(resolve_id(token, ids)?.as_str()))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Drives the reducer for one session. `in_flight` counts backend requests
/// still owed a reply, so `wait` knows when scripted input can continue.
pub struct Shell<'a> {
    state: AppState,
    cmd_tx: &'a Sender<BackendCommand>,
    ui_rx: &'a Receiver<UiEvent>,
    in_flight: usize,
}

impl<'a> Shell<'a> {
    pub fn new(state: AppState, cmd_tx: &'a Sender<BackendCommand>, ui_rx: &'a Receiver<UiEvent>) -> Self {
        Self {
            state,
            cmd_tx,
            ui_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
        writeln!(out, "{}", render_screen(self.state(), now().date()))?;
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            self.drain_replies();

            let command = match parse_command(&line, self.state()) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    writeln!(out, "erro: {err:#}")?;
                    continue;
                }
            };
            match command {
                ShellCommand::Events(events) => {
                    for event in events {
                        self.apply(event);
                    }
                    self.write_feedback(&mut out)?;
                }
                ShellCommand::Show => writeln!(out, "{}", render_screen(self.state(), now().date()))?,
                ShellCommand::Export => writeln!(out, "{}", export_json(&self.state().store)?)?,
                ShellCommand::Wait(timeout) => {
                    self.wait_for_replies(timeout);
                    self.write_feedback(&mut out)?;
                }
                ShellCommand::Help => writeln!(out, "{HELP}")?,
                ShellCommand::Quit => break,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn apply(&mut self, event: UiEvent) {
        if matches!(
            event,
            UiEvent::DescriptionGenerated(_) | UiEvent::PhotosEncoded { .. }
        ) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        let Transition { state, commands } = reduce(std::mem::take(&mut self.state), event, now());
        self.state = state;

        for cmd in commands {
            let expects_reply = cmd.expects_reply();
            let mut status = None;
            if dispatch_backend_command(self.cmd_tx, cmd, &mut status) {
                if expects_reply {
                    self.in_flight += 1;
                }
            } else if let Some(message) = status {
                self.apply(UiEvent::BackendUnavailable(message));
            }
        }
    }

    fn drain_replies(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply(event);
        }
    }

    fn wait_for_replies(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.ui_rx.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending = self.in_flight, "gave up waiting for backend replies");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.drain_replies();
    }

    fn write_feedback(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let state = self.state();
        if let Some(alert) = &state.alert {
            writeln!(out, "! {alert}")?;
        }
        if state.session.is_none() {
            if let Some(error) = &state.login_error {
                writeln!(out, "{error}")?;
            }
        }
        if state.modal.is_some() {
            writeln!(out, "{}", render_screen(state, now().date()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
