//! Plain-text rendering of the current screen.

use chrono::NaiveDate;
use shared::{
    domain::IssueStatus,
    records::{Delivery, Issue, User},
};
use storage::Storage;
use workflow::{
    deliveries::receiver_candidates,
    filters::{pending_approvals, IssueTab},
    session::View,
    users,
};

use crate::controller::{events::Modal, reducer::AppState};

const OFFLINE_BANNER: &str =
    "[OFFLINE] Sem conexão com a internet. Os dados continuam disponíveis neste dispositivo.";

pub fn render_screen(state: &AppState, today: NaiveDate) -> String {
    let mut lines = Vec::new();
    if !state.online {
        lines.push(OFFLINE_BANNER.to_string());
    }
    lines.push(navigation(state));
    lines.push(format!("== {} ==", state.view.title()));
    if let Some(alert) = &state.alert {
        lines.push(format!("! {alert}  (use 'ok' para fechar)"));
    }

    match state.view {
        View::Issues => issues_view(state, today, &mut lines),
        View::Logistics => logistics_view(state, &mut lines),
        View::Engineering => engineering_view(state, today, &mut lines),
        View::Profile => profile_view(state, &mut lines),
    }

    if let Some(modal) = &state.modal {
        lines.push(String::new());
        lines.extend(render_modal(state, modal));
    }
    lines.join("\n")
}

fn navigation(state: &AppState) -> String {
    let engineering = match state.pending_badge() {
        Some(count) => format!("engenharia ({count})"),
        None => "engenharia".to_string(),
    };
    let who = state
        .current_user()
        .map(|user| format!("{} [{}]", user.name, user.role))
        .unwrap_or_else(|| "visitante".to_string());
    format!("pendências | logística | {engineering} | perfil    {who}")
}

fn issues_view(state: &AppState, today: NaiveDate, lines: &mut Vec<String>) {
    lines.push(format!(
        "Aba: {}  Filtros ativos: {}{}",
        match state.issue_tab {
            IssueTab::Active => "ativas",
            IssueTab::History => "histórico",
        },
        state.issue_filter.active_count(),
        search_suffix(&state.search)
    ));
    let visible = state.visible_issues();
    if visible.is_empty() {
        lines.push("Nenhuma pendência encontrada.".to_string());
    }
    let user = state.current_user();
    for issue in visible {
        lines.extend(issue_card(issue, user, today));
    }
}

fn logistics_view(state: &AppState, lines: &mut Vec<String>) {
    lines.push(format!(
        "Filtros ativos: {}{}",
        state.delivery_filter.active_count(),
        search_suffix(&state.search)
    ));
    let visible = state.visible_deliveries();
    if visible.is_empty() {
        lines.push("Nenhuma entrega encontrada.".to_string());
    }
    for delivery in visible {
        lines.extend(delivery_card(delivery));
    }
}

fn engineering_view(state: &AppState, today: NaiveDate, lines: &mut Vec<String>) {
    let pending = pending_approvals(state.store.issues());
    lines.push(format!("Aguardando aprovação: {}", pending.len()));
    let user = state.current_user();
    for issue in pending {
        lines.extend(issue_card(issue, user, today));
    }

    lines.push(String::new());
    lines.push("Usuários:".to_string());
    let manages = user.is_some_and(|u| u.capabilities().can_manage_users);
    for listed in state.store.users() {
        let actions = if manages && users::is_editable(listed) {
            format!("  [edit-user {id} | delete-user {id}]", id = listed.id)
        } else {
            String::new()
        };
        lines.push(format!(
            "  {} ({}) - {}{actions}",
            listed.name, listed.username, listed.role
        ));
    }
}

fn profile_view(state: &AppState, lines: &mut Vec<String>) {
    match state.current_user() {
        Some(user) => {
            let caps = user.capabilities();
            lines.push(format!("Nome: {}", user.name));
            lines.push(format!("Usuário: {}", user.username));
            lines.push(format!("Cargo: {}", user.role));
            lines.push(format!(
                "Permissões: aprovar={} usuários={} logística={}",
                yes_no(caps.can_approve),
                yes_no(caps.can_manage_users),
                yes_no(caps.can_manage_logistics)
            ));
        }
        None => {
            lines.push("Faça login para acessar o sistema: login <usuário> <senha>".to_string());
            if !state.login.username.is_empty() {
                lines.push(format!("Usuário: {}", state.login.username));
            }
            if let Some(error) = &state.login_error {
                lines.push(format!("  {error}"));
            }
        }
    }
}

pub fn issue_card(issue: &Issue, user: Option<&User>, today: NaiveDate) -> Vec<String> {
    let overdue = if issue.is_overdue(today) {
        " ATRASADO"
    } else {
        ""
    };
    let mut card = vec![
        format!(
            "[{}] {} ({}) - {}",
            issue.id, issue.title, issue.priority, issue.status
        ),
        format!(
            "    Responsável: {} | Solicitante: {}",
            issue.assignee, issue.requested_by
        ),
        format!(
            "    Local: {} | Prazo: {}{overdue}",
            issue.location,
            issue.deadline.format("%d/%m/%Y")
        ),
    ];
    if !issue.description.is_empty() {
        card.push(format!("    {}", issue.description.replace('\n', "\n    ")));
    }
    if !issue.photos.is_empty() {
        card.push(format!("    Fotos: {}", issue.photos.len()));
    }
    if let Some(photos) = &issue.completion_photos {
        card.push(format!("    Fotos da solução: {}", photos.len()));
    }
    if let Some(reason) = &issue.rejection_reason {
        card.push(format!("    Motivo da rejeição: {reason}"));
    }
    let actions = issue_actions(issue, user);
    if !actions.is_empty() {
        card.push(format!("    Ações: {}", actions.join(" | ")));
    }
    card
}

/// Commands offered on an issue card for the signed-in user.
pub fn issue_actions(issue: &Issue, user: Option<&User>) -> Vec<String> {
    let reviewer = user.is_some_and(|u| u.capabilities().can_approve);
    match issue.status {
        IssueStatus::Open | IssueStatus::Rejected => vec![format!("start {}", issue.id)],
        IssueStatus::InProgress => vec![format!("resolve {}", issue.id)],
        IssueStatus::WaitingApproval if reviewer => vec![
            format!("approve {}", issue.id),
            format!("reject {}", issue.id),
        ],
        IssueStatus::WaitingApproval | IssueStatus::Done => Vec::new(),
    }
}

pub fn delivery_card(delivery: &Delivery) -> Vec<String> {
    let mut card = vec![
        format!(
            "[{}] {} - {} {} ({})",
            delivery.id, delivery.material, delivery.quantity, delivery.unit, delivery.status
        ),
        format!(
            "    Fornecedor: {} | Nota: {} | Previsto: {}",
            delivery.supplier,
            delivery.invoice_number.as_deref().unwrap_or("-"),
            delivery.expected_date.format("%d/%m/%Y %H:%M")
        ),
    ];
    if let (Some(received_at), Some(receiver)) = (delivery.received_at, &delivery.receiver_name) {
        card.push(format!(
            "    Recebido por {receiver} em {} | Assinatura: {} | Fotos: {}",
            received_at.format("%d/%m/%Y %H:%M"),
            yes_no(delivery.signature.is_some()),
            delivery.receipt_photos.len()
        ));
    } else {
        card.push(format!("    Ações: receive {}", delivery.id));
    }
    card
}

fn render_modal(state: &AppState, modal: &Modal) -> Vec<String> {
    let mut lines = vec![format!("-- {} --", modal.title())];
    match modal {
        Modal::NewIssue(draft) => {
            lines.push(format!("  título: {}", draft.title));
            lines.push(format!("  local: {}", draft.location));
            lines.push(format!("  prioridade: {}", draft.priority));
            lines.push(format!("  responsável: {}", draft.assignee));
            lines.push(format!("  solicitante: {}", draft.requested_by));
            lines.push(format!(
                "  prazo: {}",
                draft
                    .deadline
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            ));
            lines.push(format!("  descrição: {}", draft.description));
            lines.push(format!("  fotos: {}", draft.photos.len()));
            if state.generating_description {
                lines.push("  Gerando descrição...".to_string());
            } else if draft.can_generate_description() {
                lines.push("  'generate' preenche a descrição automaticamente".to_string());
            }
        }
        Modal::NewDelivery(draft) => {
            lines.push(format!("  material: {}", draft.material));
            lines.push(format!("  fornecedor: {}", draft.supplier));
            lines.push(format!("  quantidade: {} {}", draft.quantity, draft.unit));
            lines.push(format!(
                "  previsão: {}",
                draft
                    .expected_date
                    .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                    .unwrap_or_default()
            ));
            lines.push(format!("  nota: {}", draft.invoice_number));
        }
        Modal::Receive { delivery_id, draft } => {
            if let Some(delivery) = state.store.delivery(delivery_id) {
                lines.push(format!("  {} ({})", delivery.material, delivery.supplier));
            }
            lines.push(format!("  conferência: {}", draft.status));
            lines.push(format!("  recebedor: {}", draft.receiver_name));
            let candidates: Vec<&str> = receiver_candidates(state.store.users())
                .into_iter()
                .map(|user| user.name.as_str())
                .collect();
            lines.push(format!("  sugestões: {}", candidates.join(", ")));
            lines.push(format!("  assinatura: {}", yes_no(draft.signature.is_some())));
            lines.push(format!("  fotos: {}", draft.receipt_photos.len()));
        }
        Modal::Resolve { issue_id, draft } => {
            lines.push(format!("  pendência: {issue_id}"));
            lines.push(format!("  fotos da solução: {}", draft.completion_photos.len()));
        }
        Modal::Reject { issue_id, draft } => {
            lines.push(format!("  pendência: {issue_id}"));
            lines.push(format!("  motivo: {}", draft.reason));
        }
        Modal::User { draft, .. } => {
            lines.push(format!("  nome: {}", draft.name));
            lines.push(format!("  usuário: {}", draft.username));
            lines.push(format!("  senha: {}", draft.password));
            lines.push(format!("  cargo: {}", draft.role));
        }
        Modal::ConfirmDeleteUser { user_id } => {
            let name = state
                .store
                .user(user_id)
                .map(|user| user.name.as_str())
                .unwrap_or_default();
            lines.push(format!("  Tem certeza que deseja remover {name}?"));
        }
    }
    lines.push(format!(
        "  confirm: {} | cancel",
        if modal.can_confirm() {
            "disponível"
        } else {
            "indisponível"
        }
    ));
    lines
}

pub fn export_json(store: &Storage) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

fn search_suffix(search: &str) -> String {
    if search.trim().is_empty() {
        String::new()
    } else {
        format!("  Busca: \"{}\"", search.trim())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "sim"
    } else {
        "não"
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::IssueId;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 24).expect("valid date")
    }

    #[test]
    fn overdue_issue_is_flagged() {
        let store = Storage::seeded();
        let late = store.issue(&IssueId::from("3")).expect("seed issue");
        let card = issue_card(late, None, today()).join("\n");
        assert!(card.contains("ATRASADO"));

        let done = store.issue(&IssueId::from("4")).expect("seed issue");
        assert!(!issue_card(done, None, today()).join("\n").contains("ATRASADO"));
    }

    #[test]
    fn review_actions_need_approval_rights() {
        let store = Storage::seeded();
        let waiting = store.issue(&IssueId::from("2")).expect("seed issue");
        let admin = store.user_by_username("engenharia");
        let foreman = store.user_by_username("ailton");

        assert_eq!(issue_actions(waiting, admin), vec!["approve 2", "reject 2"]);
        assert!(issue_actions(waiting, foreman).is_empty());
    }

    #[test]
    fn screen_shows_offline_banner_and_alert() {
        let mut state = AppState::new(Storage::seeded());
        state.online = false;
        state.alert = Some("Atenção".into());
        let screen = render_screen(&state, today());
        assert!(screen.starts_with("[OFFLINE]"));
        assert!(screen.contains("! Atenção"));
        assert!(screen.contains("Falta rejunte banheiro"));
        assert!(!screen.contains("Vidro da varanda riscado"));
    }

    #[test]
    fn export_is_json_of_the_store() {
        let json = export_json(&Storage::seeded()).expect("export");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["issues"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["users"][0]["username"], "engenharia");
    }
}
