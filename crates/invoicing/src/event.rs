use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use backfill_core::{DomainError, Entity, EventId, OrganizerId, Slug};

/// Settings key holding the invoice generation mode.
pub const INVOICE_GENERATE: &str = "invoice_generate";
/// Settings key listing the sales channels invoices are generated for.
pub const INVOICE_GENERATE_SALES_CHANNELS: &str = "invoice_generate_sales_channels";
/// Settings key deciding whether free (zero total) orders get invoices.
pub const INVOICE_INCLUDE_FREE: &str = "invoice_include_free";
/// Settings key overriding the invoice number prefix.
pub const INVOICE_NUMBERS_PREFIX: &str = "invoice_numbers_prefix";

/// Organizer: the tenant that owns events, orders and invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: OrganizerId,
    pub slug: Slug,
    pub name: String,
}

impl Entity for Organizer {
    type Id = OrganizerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: a ticketed occasion with its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub organizer_id: OrganizerId,
    pub slug: Slug,
    pub name: String,
    #[serde(default)]
    pub settings: EventSettings,
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// How (and whether) an event issues invoices.
///
/// The wire values are exact: `"True"` is the only spelling of [`Self::True`],
/// and booleans are not coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceGenerateMode {
    /// Only issued manually from the backend.
    #[serde(rename = "admin")]
    Admin,
    /// Customers may request one.
    #[serde(rename = "user")]
    User,
    /// Issued automatically once the order is paid.
    #[serde(rename = "paid")]
    Paid,
    /// Issued automatically for every order.
    #[serde(rename = "True")]
    True,
    /// Never issued.
    #[serde(rename = "False")]
    False,
}

impl InvoiceGenerateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceGenerateMode::Admin => "admin",
            InvoiceGenerateMode::User => "user",
            InvoiceGenerateMode::Paid => "paid",
            InvoiceGenerateMode::True => "True",
            InvoiceGenerateMode::False => "False",
        }
    }

    /// Whether the event issues invoices at all.
    pub fn generates_invoices(&self) -> bool {
        !matches!(self, InvoiceGenerateMode::False)
    }
}

impl core::fmt::Display for InvoiceGenerateMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceGenerateMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(InvoiceGenerateMode::Admin),
            "user" => Ok(InvoiceGenerateMode::User),
            "paid" => Ok(InvoiceGenerateMode::Paid),
            "True" => Ok(InvoiceGenerateMode::True),
            "False" => Ok(InvoiceGenerateMode::False),
            other => Err(DomainError::validation(format!(
                "unknown {INVOICE_GENERATE} value {other:?} (expected one of admin, user, paid, True, False)"
            ))),
        }
    }
}

/// Per-event settings: a key/value mapping with typed accessors for the keys
/// the invoicing subsystem reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSettings(BTreeMap<String, Value>);

impl EventSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Invoice generation mode. An absent key means invoices are off.
    pub fn invoice_generate(&self) -> Result<InvoiceGenerateMode, DomainError> {
        match self.get(INVOICE_GENERATE) {
            None => Ok(InvoiceGenerateMode::False),
            Some(Value::String(s)) => s.parse(),
            Some(other) => Err(DomainError::validation(format!(
                "{INVOICE_GENERATE} must be a string, got {other}"
            ))),
        }
    }

    /// Sales channels eligible for invoices; defaults to the web shop.
    pub fn invoice_generate_sales_channels(&self) -> Vec<String> {
        match self.get(INVOICE_GENERATE_SALES_CHANNELS) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => vec!["web".to_string()],
        }
    }

    pub fn invoice_include_free(&self) -> bool {
        self.get(INVOICE_INCLUDE_FREE)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn invoice_numbers_prefix(&self) -> Option<&str> {
        self.get(INVOICE_NUMBERS_PREFIX)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}
