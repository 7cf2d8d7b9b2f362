use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a charge
pub type ChargeId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// charge status
///
/// `Vencido` is a read-time state: a pending charge past its due instant is
/// reported as overdue, but the stored status stays `Pendente` until a
/// payment or cancellation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChargeStatus {
    /// open, awaiting payment
    Pendente,
    /// settled by a payment
    Pago,
    /// past due with no payment (derived, never stored)
    Vencido,
    /// voided before payment
    Cancelado,
}

impl ChargeStatus {
    /// statuses that admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChargeStatus::Pago | ChargeStatus::Cancelado)
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChargeStatus::Pendente => "PENDENTE",
            ChargeStatus::Pago => "PAGO",
            ChargeStatus::Vencido => "VENCIDO",
            ChargeStatus::Cancelado => "CANCELADO",
        };
        write!(f, "{}", name)
    }
}

/// payment method, informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    DebitCard,
    Boleto,
    BankTransfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Boleto => "BOLETO",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        };
        write!(f, "{}", name)
    }
}

/// customer owning one or more charges
///
/// Document format validation (CPF etc) is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub document: String,
}
