//! Transient per-form state. A draft never touches the store; `validate`
//! turns it into the typed input the lifecycle functions accept, and
//! `can_confirm` is what keeps a form's confirm action disabled.

use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{DeliveryStatus, Priority, Role},
    error::{DomainError, DomainResult},
    records::User,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

pub fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_date_time(raw: &str) -> DomainResult<NaiveDateTime> {
    let raw = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            DomainError::validation(format!("invalid date-time '{raw}', expected YYYY-MM-DDTHH:MM"))
        })
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unknown_field(form: &str, field: &str) -> DomainError {
    DomainError::validation(format!("{form} has no field '{field}'"))
}

/// Removes the photo at `index`; out-of-range indexes are ignored.
pub fn remove_photo(photos: &mut Vec<String>, index: usize) {
    if index < photos.len() {
        photos.remove(index);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginDraft {
    pub username: String,
    pub password: String,
}

impl LoginDraft {
    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "username" | "usuario" => self.username = value.to_string(),
            "password" | "senha" => self.password = value.to_string(),
            other => return Err(unknown_field("login", other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub requested_by: String,
    pub deadline: NaiveDate,
    pub location: String,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssueDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub requested_by: String,
    pub deadline: Option<NaiveDate>,
    pub location: String,
    pub photos: Vec<String>,
}

impl NewIssueDraft {
    /// The requester defaults to whoever is signed in.
    pub fn for_user(user: Option<&User>) -> Self {
        Self {
            requested_by: user.map(|u| u.name.clone()).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "title" | "titulo" => self.title = value.to_string(),
            "description" | "descricao" => self.description = value.to_string(),
            "priority" | "prioridade" => self.priority = value.parse()?,
            "assignee" | "responsavel" => self.assignee = value.to_string(),
            "requested_by" | "solicitante" => self.requested_by = value.to_string(),
            "deadline" | "prazo" => self.deadline = Some(parse_date(value)?),
            "location" | "local" => self.location = value.to_string(),
            other => return Err(unknown_field("issue form", other)),
        }
        Ok(())
    }

    pub fn can_generate_description(&self) -> bool {
        !self.title.trim().is_empty() && !self.location.trim().is_empty()
    }

    pub fn validate(&self) -> DomainResult<IssueInput> {
        Ok(IssueInput {
            title: required(&self.title, "title")?,
            description: self.description.trim().to_string(),
            priority: self.priority,
            assignee: required(&self.assignee, "assignee")?,
            requested_by: required(&self.requested_by, "requested_by")?,
            deadline: self
                .deadline
                .ok_or_else(|| DomainError::validation("deadline is required"))?,
            location: required(&self.location, "location")?,
            photos: self.photos.clone(),
        })
    }

    pub fn can_confirm(&self) -> bool {
        self.validate().is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryInput {
    pub material: String,
    pub supplier: String,
    pub quantity: f64,
    pub unit: String,
    pub expected_date: NaiveDateTime,
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDeliveryDraft {
    pub material: String,
    pub supplier: String,
    /// Kept as typed so a half-entered number does not lose keystrokes.
    pub quantity: String,
    pub unit: String,
    pub expected_date: Option<NaiveDateTime>,
    pub invoice_number: String,
}

impl NewDeliveryDraft {
    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "material" => self.material = value.to_string(),
            "supplier" | "fornecedor" => self.supplier = value.to_string(),
            "quantity" | "quantidade" => self.quantity = value.to_string(),
            "unit" | "unidade" => self.unit = value.to_string(),
            "expected_date" | "previsao" => self.expected_date = Some(parse_date_time(value)?),
            "invoice_number" | "invoice" | "nota" => self.invoice_number = value.to_string(),
            other => return Err(unknown_field("delivery form", other)),
        }
        Ok(())
    }

    pub fn validate(&self) -> DomainResult<DeliveryInput> {
        let quantity = self
            .quantity
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| DomainError::validation(format!("invalid quantity '{}'", self.quantity)))?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(DeliveryInput {
            material: required(&self.material, "material")?,
            supplier: required(&self.supplier, "supplier")?,
            quantity,
            unit: required(&self.unit, "unit")?,
            expected_date: self
                .expected_date
                .ok_or_else(|| DomainError::validation("expected_date is required"))?,
            invoice_number: optional(&self.invoice_number),
        })
    }

    pub fn can_confirm(&self) -> bool {
        self.validate().is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Checked,
    Problem,
}

impl From<ReceiptOutcome> for DeliveryStatus {
    fn from(value: ReceiptOutcome) -> Self {
        match value {
            ReceiptOutcome::Checked => DeliveryStatus::Checked,
            ReceiptOutcome::Problem => DeliveryStatus::Problem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptInput {
    pub outcome: ReceiptOutcome,
    pub receiver_name: String,
    pub signature: Option<String>,
    pub receipt_photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveDraft {
    pub status: DeliveryStatus,
    pub receiver_name: String,
    pub signature: Option<String>,
    pub receipt_photos: Vec<String>,
}

impl ReceiveDraft {
    /// Opens pre-selected on `Arrived` with the signed-in user as receiver.
    pub fn for_user(user: Option<&User>) -> Self {
        Self {
            status: DeliveryStatus::Arrived,
            receiver_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            signature: None,
            receipt_photos: Vec::new(),
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "status" | "outcome" | "conferencia" => self.status = value.parse()?,
            "receiver_name" | "receiver" | "recebedor" => self.receiver_name = value.to_string(),
            other => return Err(unknown_field("receipt form", other)),
        }
        Ok(())
    }

    pub fn validate(&self) -> DomainResult<ReceiptInput> {
        let outcome = match self.status {
            DeliveryStatus::Checked => ReceiptOutcome::Checked,
            DeliveryStatus::Problem => ReceiptOutcome::Problem,
            other => {
                return Err(DomainError::validation(format!(
                    "choose Conferido or Problema, not {other}"
                )))
            }
        };
        Ok(ReceiptInput {
            outcome,
            receiver_name: required(&self.receiver_name, "receiver_name")?,
            signature: self.signature.clone(),
            receipt_photos: self.receipt_photos.clone(),
        })
    }

    pub fn can_confirm(&self) -> bool {
        self.validate().is_ok()
    }
}

/// "Register solution": photos are optional, the act itself is the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveDraft {
    pub completion_photos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectDraft {
    pub reason: String,
}

impl RejectDraft {
    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "reason" | "motivo" => self.reason = value.to_string(),
            other => return Err(unknown_field("rejection form", other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl UserDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            password: user.password.clone(),
            role: user.role.label().to_string(),
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> DomainResult<()> {
        match field {
            "name" | "nome" => self.name = value.to_string(),
            "username" | "usuario" => self.username = value.to_string(),
            "password" | "senha" => self.password = value.to_string(),
            "role" | "cargo" => self.role = value.to_string(),
            other => return Err(unknown_field("user form", other)),
        }
        Ok(())
    }

    pub fn validate(&self) -> DomainResult<UserInput> {
        let name = required(&self.name, "name")?;
        let username = required(&self.username, "username")?;
        // Compared verbatim at login, so not trimmed.
        if self.password.trim().is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        let role = Role::from(required(&self.role, "role")?);
        Ok(UserInput {
            name,
            username,
            password: self.password.clone(),
            role,
        })
    }

    pub fn can_confirm(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
#[path = "tests/drafts_tests.rs"]
mod tests;
