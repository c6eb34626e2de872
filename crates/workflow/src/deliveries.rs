use chrono::NaiveDateTime;
use shared::{
    domain::{DeliveryId, DeliveryStatus},
    error::{DomainError, DomainResult},
    records::{Delivery, User},
};

use crate::drafts::{DeliveryInput, ReceiptInput};

pub fn schedule_delivery(input: DeliveryInput) -> Delivery {
    Delivery {
        id: DeliveryId::generate(),
        material: input.material,
        supplier: input.supplier,
        quantity: input.quantity,
        unit: input.unit,
        expected_date: input.expected_date,
        invoice_number: input.invoice_number,
        status: DeliveryStatus::Scheduled,
        received_at: None,
        receiver_name: None,
        signature: None,
        receipt_photos: Vec::new(),
    }
}

/// Scheduled → Checked | Problem. Stamps the receipt; both outcomes are
/// terminal.
pub fn receive(
    delivery: &Delivery,
    input: ReceiptInput,
    now: NaiveDateTime,
) -> DomainResult<Delivery> {
    if delivery.status != DeliveryStatus::Scheduled {
        return Err(DomainError::invalid_transition(format!(
            "delivery {} was already received ({})",
            delivery.id, delivery.status
        )));
    }
    Ok(Delivery {
        status: input.outcome.into(),
        received_at: Some(now),
        receiver_name: Some(input.receiver_name),
        signature: input.signature,
        receipt_photos: input.receipt_photos,
        ..delivery.clone()
    })
}

/// Everyone can sign for a delivery; dedicated logistics staff (logistics
/// capability without approval rights) are offered first.
pub fn receiver_candidates(users: &[User]) -> Vec<&User> {
    let (mut logistics, others): (Vec<&User>, Vec<&User>) = users.iter().partition(|user| {
        let caps = user.capabilities();
        caps.can_manage_logistics && !caps.can_approve
    });
    logistics.extend(others);
    logistics
}
