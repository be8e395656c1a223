use serde::{Deserialize, Serialize};

/// Audit log action kinds written by the backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "backfill.invoice.generated")]
    InvoiceGenerated,
}

impl ActionKind {
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionKind::InvoiceGenerated => "backfill.invoice.generated",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.action_type())
    }
}
