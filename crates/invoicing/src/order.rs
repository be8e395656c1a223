use serde::{Deserialize, Serialize};

use backfill_core::{DomainError, Entity, EventId, ValueObject};

use crate::invoice::Invoice;

/// Order code: the short, human-facing order identifier, unique per organizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderCode(String);

impl OrderCode {
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let code = code.into();
        if code.is_empty() {
            return Err(DomainError::validation("order code must not be empty"));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(format!(
                "order code {code:?} must be alphanumeric"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderCode> for String {
    fn from(value: OrderCode) -> Self {
        value.0
    }
}

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
    Canceled,
}

/// Billing address given by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceAddress {
    pub company: Option<String>,
    pub name: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub vat_id: Option<String>,
}

impl ValueObject for InvoiceAddress {}

/// Order as read from the platform, with its invoices and billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub code: OrderCode,
    pub event_id: EventId,
    pub status: OrderStatus,
    /// Total in smallest currency unit (e.g., cents).
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default = "default_sales_channel")]
    pub sales_channel: String,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub invoice_address: Option<InvoiceAddress>,
}

fn default_sales_channel() -> String {
    "web".to_string()
}

impl Order {
    pub fn new(code: OrderCode, event_id: EventId, status: OrderStatus) -> Self {
        Self {
            code,
            event_id,
            status,
            total: 0,
            require_approval: false,
            sales_channel: default_sales_channel(),
            invoices: Vec::new(),
            invoice_address: None,
        }
    }

    pub fn has_invoices(&self) -> bool {
        !self.invoices.is_empty()
    }

    pub fn cancellation_count(&self) -> usize {
        self.invoices.iter().filter(|i| i.is_cancellation).count()
    }

    pub fn non_cancellation_count(&self) -> usize {
        self.invoices.iter().filter(|i| !i.is_cancellation).count()
    }

    /// A paid or pending order whose invoices are all cancelled out is treated
    /// as uninvoiced and may receive a fresh invoice.
    pub fn is_reissue_eligible(&self) -> bool {
        matches!(self.status, OrderStatus::Paid | OrderStatus::Pending)
            && self.cancellation_count() >= self.non_cancellation_count()
    }

    pub fn has_invoice_address(&self) -> bool {
        self.invoice_address.is_some()
    }
}

impl Entity for Order {
    type Id = OrderCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}
