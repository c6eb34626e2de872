use shared::{
    domain::UserId,
    error::{DomainError, DomainResult, ErrorCode},
    records::User,
};
use storage::Storage;
use tracing::info;

use crate::drafts::UserInput;

/// Whether the admin view offers edit/delete for this record.
pub fn is_editable(user: &User) -> bool {
    !user.is_protected()
}

pub fn create_user(store: &mut Storage, actor: Option<&User>, input: UserInput) -> DomainResult<User> {
    ensure_user_manager(actor)?;
    ensure_unique_username(store, &input.username, None)?;
    let user = User {
        id: UserId::generate(),
        name: input.name,
        username: input.username,
        password: input.password,
        role: input.role,
    };
    store.insert_user(user.clone());
    info!(user_id = %user.id, username = %user.username, role = %user.role, "user created");
    Ok(user)
}

pub fn update_user(
    store: &mut Storage,
    actor: Option<&User>,
    user_id: &UserId,
    input: UserInput,
) -> DomainResult<User> {
    ensure_user_manager(actor)?;
    let existing = load_editable(store, user_id)?;
    ensure_unique_username(store, &input.username, Some(user_id))?;
    let updated = User {
        name: input.name,
        username: input.username,
        password: input.password,
        role: input.role,
        ..existing
    };
    store.replace_user(updated.clone())?;
    info!(user_id = %updated.id, username = %updated.username, "user updated");
    Ok(updated)
}

/// Callers must have confirmed the deletion with the operator first.
pub fn delete_user(store: &mut Storage, actor: Option<&User>, user_id: &UserId) -> DomainResult<User> {
    ensure_user_manager(actor)?;
    load_editable(store, user_id)?;
    let removed = store.remove_user(user_id)?;
    info!(user_id = %removed.id, username = %removed.username, "user deleted");
    Ok(removed)
}

fn ensure_user_manager(actor: Option<&User>) -> DomainResult<()> {
    match actor {
        None => Err(DomainError::new(
            ErrorCode::Unauthorized,
            "sign in to manage users",
        )),
        Some(user) if !user.capabilities().can_manage_users => Err(DomainError::forbidden(
            format!("{} cannot manage users", user.name),
        )),
        Some(_) => Ok(()),
    }
}

fn load_editable(store: &Storage, user_id: &UserId) -> DomainResult<User> {
    let user = store
        .user(user_id)
        .ok_or_else(|| DomainError::not_found(format!("user {user_id} not found")))?;
    if !is_editable(user) {
        return Err(DomainError::forbidden(format!(
            "user '{}' is protected",
            user.username
        )));
    }
    Ok(user.clone())
}

fn ensure_unique_username(
    store: &Storage,
    username: &str,
    except: Option<&UserId>,
) -> DomainResult<()> {
    match store.user_by_username(username) {
        Some(existing) if Some(&existing.id) != except => Err(DomainError::validation(format!(
            "username '{username}' is already taken"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Role;

    fn input(username: &str) -> UserInput {
        UserInput {
            name: "Paulo".into(),
            username: username.into(),
            password: "abc".into(),
            role: Role::Empreiteiro,
        }
    }

    fn admin(store: &Storage) -> User {
        store.user_by_username("engenharia").cloned().expect("admin")
    }

    #[test]
    fn admin_creates_edits_and_deletes_users() {
        let mut store = Storage::seeded();
        let actor = admin(&store);

        let created = create_user(&mut store, Some(&actor), input("paulo")).expect("create");
        assert_eq!(store.users().len(), 9);

        let mut changed = input("paulo.s");
        changed.role = Role::Almoxarifado;
        let updated =
            update_user(&mut store, Some(&actor), &created.id, changed).expect("update");
        assert_eq!(updated.username, "paulo.s");
        assert_eq!(store.user(&created.id).expect("stored").role, Role::Almoxarifado);

        delete_user(&mut store, Some(&actor), &created.id).expect("delete");
        assert!(store.user(&created.id).is_none());
    }

    #[test]
    fn seed_admin_is_protected() {
        let mut store = Storage::seeded();
        let actor = admin(&store);
        assert!(!is_editable(&actor));

        let err = delete_user(&mut store, Some(&actor), &actor.id).expect_err("protected");
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = update_user(&mut store, Some(&actor), &actor.id, input("eng2"))
            .expect_err("protected");
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(store.users().len(), 8);
    }

    #[test]
    fn only_user_managers_may_administer() {
        let mut store = Storage::seeded();
        let almox = store.user_by_username("almox").cloned().expect("almox");
        let err = create_user(&mut store, Some(&almox), input("x")).expect_err("forbidden");
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = create_user(&mut store, None, input("x")).expect_err("anonymous");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn usernames_stay_unique_ignoring_case() {
        let mut store = Storage::seeded();
        let actor = admin(&store);
        let err = create_user(&mut store, Some(&actor), input("DIEGO")).expect_err("duplicate");
        assert_eq!(err.code, ErrorCode::Validation);

        let diego = store.user_by_username("diego").cloned().expect("diego");
        let mut same = input("Diego");
        same.name = "Diego Souza".into();
        update_user(&mut store, Some(&actor), &diego.id, same).expect("keeping own username");
    }
}
