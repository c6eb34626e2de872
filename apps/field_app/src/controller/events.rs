//! Operator intents and backend results consumed by the reducer, plus the
//! modal union that owns per-form draft state.

use std::path::PathBuf;

use shared::domain::{DeliveryId, IssueId, UserId};
use workflow::{
    drafts::{NewDeliveryDraft, NewIssueDraft, ReceiveDraft, RejectDraft, ResolveDraft, UserDraft},
    filters::{DeliveryFilter, IssueFilter, IssueTab},
    session::View,
};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SetLoginField { field: String, value: String },
    SubmitLogin,
    Logout,
    Navigate(View),
    DismissAlert,

    SelectTab(IssueTab),
    SetSearch(String),
    SetIssueFilter(IssueFilter),
    SetDeliveryFilter(DeliveryFilter),
    ClearFilters,

    OpenNewIssue,
    OpenNewDelivery,
    OpenReceive(DeliveryId),
    OpenResolve(IssueId),
    OpenReject(IssueId),
    OpenNewUser,
    OpenEditUser(UserId),
    RequestDeleteUser(UserId),
    SetDraftField { field: String, value: String },
    AttachPhotos { field: PhotoField, paths: Vec<PathBuf> },
    RemovePhoto { field: PhotoField, index: usize },
    GenerateDescription,
    ConfirmModal,
    CloseModal,

    StartIssue(IssueId),
    ApproveIssue(IssueId),

    DescriptionGenerated(String),
    PhotosEncoded { field: PhotoField, images: Vec<String> },
    ConnectivityChanged(bool),
    BackendUnavailable(String),
}

/// Which draft an encoded image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoField {
    IssuePhotos,
    CompletionPhotos,
    ReceiptPhotos,
    /// Single image; a new one replaces the previous signature.
    Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    NewIssue(NewIssueDraft),
    NewDelivery(NewDeliveryDraft),
    Receive {
        delivery_id: DeliveryId,
        draft: ReceiveDraft,
    },
    Resolve {
        issue_id: IssueId,
        draft: ResolveDraft,
    },
    Reject {
        issue_id: IssueId,
        draft: RejectDraft,
    },
    User {
        /// `None` while creating a new user.
        editing: Option<UserId>,
        draft: UserDraft,
    },
    ConfirmDeleteUser {
        user_id: UserId,
    },
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Modal::NewIssue(_) => "Nova Pendência",
            Modal::NewDelivery(_) => "Agendar Entrega",
            Modal::Receive { .. } => "Receber Material",
            Modal::Resolve { .. } => "Registrar Solução",
            Modal::Reject { .. } => "Rejeitar Solução",
            Modal::User { editing: None, .. } => "Novo Usuário",
            Modal::User { editing: Some(_), .. } => "Editar Usuário",
            Modal::ConfirmDeleteUser { .. } => "Remover Usuário",
        }
    }

    /// Whether the confirm action is currently enabled.
    pub fn can_confirm(&self) -> bool {
        match self {
            Modal::NewIssue(draft) => draft.can_confirm(),
            Modal::NewDelivery(draft) => draft.can_confirm(),
            Modal::Receive { draft, .. } => draft.can_confirm(),
            Modal::User { draft, .. } => draft.can_confirm(),
            Modal::Resolve { .. } | Modal::Reject { .. } | Modal::ConfirmDeleteUser { .. } => true,
        }
    }

    /// The photo field that results for `field` should land in, if this
    /// modal owns it.
    pub fn photos_mut(&mut self, field: PhotoField) -> Option<&mut Vec<String>> {
        match (self, field) {
            (Modal::NewIssue(draft), PhotoField::IssuePhotos) => Some(&mut draft.photos),
            (Modal::Resolve { draft, .. }, PhotoField::CompletionPhotos) => {
                Some(&mut draft.completion_photos)
            }
            (Modal::Receive { draft, .. }, PhotoField::ReceiptPhotos) => {
                Some(&mut draft.receipt_photos)
            }
            _ => None,
        }
    }

    pub fn owns(&self, field: PhotoField) -> bool {
        matches!(
            (self, field),
            (Modal::NewIssue(_), PhotoField::IssuePhotos)
                | (Modal::Resolve { .. }, PhotoField::CompletionPhotos)
                | (Modal::Receive { .. }, PhotoField::ReceiptPhotos | PhotoField::Signature)
        )
    }

    /// The photo field a bare "attach" refers to in this modal.
    pub fn default_photo_field(&self) -> Option<PhotoField> {
        match self {
            Modal::NewIssue(_) => Some(PhotoField::IssuePhotos),
            Modal::Resolve { .. } => Some(PhotoField::CompletionPhotos),
            Modal::Receive { .. } => Some(PhotoField::ReceiptPhotos),
            _ => None,
        }
    }
}
