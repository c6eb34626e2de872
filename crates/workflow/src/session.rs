use shared::{
    domain::UserId,
    error::{DomainError, DomainResult, ErrorCode},
    records::User,
};

pub const INVALID_CREDENTIALS: &str = "Usuário ou senha inválidos.";
pub const RESTRICTED_ACCESS: &str = "Acesso restrito à equipe de Engenharia.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Issues,
    Logistics,
    Engineering,
    Profile,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Issues => "Pendências da Obra",
            View::Logistics => "Logística e Materiais",
            View::Engineering => "Gestão de Engenharia",
            View::Profile => "Perfil do Usuário",
        }
    }
}

/// The signed-in user. Holds only the id; the store stays the source of
/// truth for the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

/// Case-insensitive username, exact password.
pub fn authenticate<'a>(users: &'a [User], username: &str, password: &str) -> DomainResult<&'a User> {
    let wanted = username.to_lowercase();
    users
        .iter()
        .find(|user| user.username.to_lowercase() == wanted && user.password == password)
        .ok_or_else(|| DomainError::new(ErrorCode::Unauthorized, INVALID_CREDENTIALS))
}

pub fn landing_view(user: &User) -> View {
    let caps = user.capabilities();
    if caps.can_approve || caps.can_manage_users {
        View::Engineering
    } else {
        View::Issues
    }
}

pub fn ensure_can_open(view: View, user: Option<&User>) -> DomainResult<()> {
    match view {
        View::Engineering if !user.is_some_and(|u| u.capabilities().can_approve) => {
            Err(DomainError::forbidden(RESTRICTED_ACCESS))
        }
        _ => Ok(()),
    }
}
