use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backfill_core::{Entity, InvoiceId};

/// Invoice attached to an order.
///
/// A cancellation is itself an invoice (a credit note) with `is_cancellation`
/// set; it never removes the invoice it cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    #[serde(default)]
    pub is_cancellation: bool,
    pub issued_at: DateTime<Utc>,
}

impl Invoice {
    pub fn issued(number: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: InvoiceId::new(),
            number: number.into(),
            is_cancellation: false,
            issued_at,
        }
    }

    pub fn cancellation(number: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            is_cancellation: true,
            ..Self::issued(number, issued_at)
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
