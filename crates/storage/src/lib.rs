use serde::Serialize;
use shared::{
    domain::{DeliveryId, IssueId, UserId},
    error::{DomainError, DomainResult},
    records::{Delivery, Issue, User},
};

mod seed;

pub use seed::{seed_deliveries, seed_issues, seed_users};

/// Session-scoped entity store. Owns every Issue, Delivery and User record;
/// nothing outlives the process.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Storage {
    issues: Vec<Issue>,
    deliveries: Vec<Delivery>,
    users: Vec<User>,
}

impl Storage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let storage = Self {
            issues: seed_issues(),
            deliveries: seed_deliveries(),
            users: seed_users(),
        };
        tracing::debug!(
            issues = storage.issues.len(),
            deliveries = storage.deliveries.len(),
            users = storage.users.len(),
            "seeded in-memory store"
        );
        storage
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn issue(&self, issue_id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| &issue.id == issue_id)
    }

    pub fn delivery(&self, delivery_id: &DeliveryId) -> Option<&Delivery> {
        self.deliveries
            .iter()
            .find(|delivery| &delivery.id == delivery_id)
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == user_id)
    }

    /// Case-insensitive lookup, matching how login compares usernames.
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        let wanted = username.to_lowercase();
        self.users
            .iter()
            .find(|user| user.username.to_lowercase() == wanted)
    }

    /// New issues are listed newest first.
    pub fn insert_issue(&mut self, issue: Issue) {
        self.issues.insert(0, issue);
    }

    pub fn replace_issue(&mut self, issue: Issue) -> DomainResult<()> {
        let slot = self
            .issues
            .iter_mut()
            .find(|existing| existing.id == issue.id)
            .ok_or_else(|| DomainError::not_found(format!("issue {} not found", issue.id)))?;
        *slot = issue;
        Ok(())
    }

    pub fn insert_delivery(&mut self, delivery: Delivery) {
        self.deliveries.insert(0, delivery);
    }

    pub fn replace_delivery(&mut self, delivery: Delivery) -> DomainResult<()> {
        let slot = self
            .deliveries
            .iter_mut()
            .find(|existing| existing.id == delivery.id)
            .ok_or_else(|| {
                DomainError::not_found(format!("delivery {} not found", delivery.id))
            })?;
        *slot = delivery;
        Ok(())
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn replace_user(&mut self, user: User) -> DomainResult<()> {
        let slot = self
            .users
            .iter_mut()
            .find(|existing| existing.id == user.id)
            .ok_or_else(|| DomainError::not_found(format!("user {} not found", user.id)))?;
        *slot = user;
        Ok(())
    }

    pub fn remove_user(&mut self, user_id: &UserId) -> DomainResult<User> {
        let index = self
            .users
            .iter()
            .position(|user| &user.id == user_id)
            .ok_or_else(|| DomainError::not_found(format!("user {user_id} not found")))?;
        Ok(self.users.remove(index))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
