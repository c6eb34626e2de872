use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(IssueId);
id_newtype!(DeliveryId);

/// Lowercases, strips the Portuguese diacritics used by the labels and folds
/// separators to `_`, so "Aguardando Aprovação" and "aguardando_aprovacao"
/// parse the same.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' | 'Á' | 'À' | 'Ã' | 'Â' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'õ' | 'ô' | 'Ó' | 'Õ' | 'Ô' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort weight: higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Média",
            Priority::Low => "Baixa",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "alta" | "high" => Ok(Priority::High),
            "media" | "medium" => Ok(Priority::Medium),
            "baixa" | "low" => Ok(Priority::Low),
            _ => Err(DomainError::validation(format!("unknown priority '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    WaitingApproval,
    Done,
    Rejected,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::WaitingApproval,
        IssueStatus::Done,
        IssueStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueStatus::Open => "Aberto",
            IssueStatus::InProgress => "Em Andamento",
            IssueStatus::WaitingApproval => "Aguardando Aprovação",
            IssueStatus::Done => "Concluído",
            IssueStatus::Rejected => "Rejeitado",
        }
    }

    pub fn carries_completion_photos(self) -> bool {
        matches!(self, IssueStatus::WaitingApproval | IssueStatus::Done)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "aberto" | "open" => Ok(IssueStatus::Open),
            "em_andamento" | "in_progress" => Ok(IssueStatus::InProgress),
            "aguardando_aprovacao" | "waiting_approval" | "waiting" => {
                Ok(IssueStatus::WaitingApproval)
            }
            "concluido" | "done" => Ok(IssueStatus::Done),
            "rejeitado" | "rejected" => Ok(IssueStatus::Rejected),
            _ => Err(DomainError::validation(format!("unknown issue status '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Scheduled,
    /// Pre-selection shown while a receipt is being filled in; never stored.
    Arrived,
    Checked,
    Problem,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Scheduled,
        DeliveryStatus::Arrived,
        DeliveryStatus::Checked,
        DeliveryStatus::Problem,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Scheduled => "Agendado",
            DeliveryStatus::Arrived => "Chegou",
            DeliveryStatus::Checked => "Conferido",
            DeliveryStatus::Problem => "Problema",
        }
    }

    pub fn is_received(self) -> bool {
        matches!(self, DeliveryStatus::Checked | DeliveryStatus::Problem)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "agendado" | "scheduled" => Ok(DeliveryStatus::Scheduled),
            "chegou" | "arrived" => Ok(DeliveryStatus::Arrived),
            "conferido" | "checked" | "ok" => Ok(DeliveryStatus::Checked),
            "problema" | "problem" => Ok(DeliveryStatus::Problem),
            _ => Err(DomainError::validation(format!(
                "unknown delivery status '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Engenharia,
    MestreDeObras,
    Empreiteiro,
    Almoxarifado,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_approve: bool,
    pub can_manage_users: bool,
    pub can_manage_logistics: bool,
}

impl Role {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Engenharia => Capabilities {
                can_approve: true,
                can_manage_users: true,
                can_manage_logistics: true,
            },
            Role::Almoxarifado => Capabilities {
                can_manage_logistics: true,
                ..Capabilities::default()
            },
            Role::MestreDeObras | Role::Empreiteiro | Role::Other(_) => Capabilities::default(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Role::Engenharia => "Engenharia",
            Role::MestreDeObras => "Mestre de Obras",
            Role::Empreiteiro => "Empreiteiro",
            Role::Almoxarifado => "Almoxarifado",
            Role::Other(label) => label,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match normalize_label(value).as_str() {
            "engenharia" => Role::Engenharia,
            "mestre_de_obras" | "mestre" => Role::MestreDeObras,
            "empreiteiro" => Role::Empreiteiro,
            "almoxarifado" | "almox" => Role::Almoxarifado,
            _ => Role::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
