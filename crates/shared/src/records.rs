use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Capabilities, DeliveryId, DeliveryStatus, IssueId, IssueStatus, Priority, Role, UserId,
};

/// Username of the seeded administrative account; it can never be edited or
/// removed.
pub const PROTECTED_USERNAME: &str = "engenharia";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    pub fn is_protected(&self) -> bool {
        self.username == PROTECTED_USERNAME
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub requested_by: String,
    pub deadline: NaiveDate,
    pub location: String,
    pub photos: Vec<String>,
    pub status: IssueStatus,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_photos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Issue {
    /// Past deadline on an unfinished issue. Display-only.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.deadline < today && self.status != IssueStatus::Done
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub material: String,
    pub supplier: String,
    pub quantity: f64,
    pub unit: String,
    pub expected_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receipt_photos: Vec<String>,
}
