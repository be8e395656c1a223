use crate::event::Event;
use crate::order::Order;
use crate::ports::InvoiceQualification;

/// The platform's standard invoice rule.
///
/// An order does not qualify when it is free and the event excludes free
/// orders, when it still awaits approval, or when it was sold through a channel
/// the event does not invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardQualification;

impl InvoiceQualification for StandardQualification {
    fn is_qualified(&self, event: &Event, order: &Order) -> bool {
        if order.total == 0 && !event.settings.invoice_include_free() {
            return false;
        }
        if order.require_approval {
            return false;
        }
        event
            .settings
            .invoice_generate_sales_channels()
            .iter()
            .any(|c| *c == order.sales_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backfill_core::{EventId, OrganizerId, Slug};
    use serde_json::json;

    use crate::event::{EventSettings, INVOICE_GENERATE_SALES_CHANNELS, INVOICE_INCLUDE_FREE};
    use crate::order::{OrderCode, OrderStatus};

    fn event(settings: EventSettings) -> Event {
        Event {
            id: EventId::new(),
            organizer_id: OrganizerId::new(),
            slug: Slug::new("democon").unwrap(),
            name: "DemoCon".to_string(),
            settings,
        }
    }

    fn order(event: &Event, total: u64) -> Order {
        let mut o = Order::new(OrderCode::new("A1B2C").unwrap(), event.id, OrderStatus::Paid);
        o.total = total;
        o
    }

    #[test]
    fn paid_web_order_qualifies() {
        let e = event(EventSettings::new());
        assert!(StandardQualification.is_qualified(&e, &order(&e, 2500)));
    }

    #[test]
    fn free_order_depends_on_include_free() {
        let e = event(EventSettings::new());
        assert!(StandardQualification.is_qualified(&e, &order(&e, 0)));

        let e = event(EventSettings::new().with(INVOICE_INCLUDE_FREE, false));
        assert!(!StandardQualification.is_qualified(&e, &order(&e, 0)));
        assert!(StandardQualification.is_qualified(&e, &order(&e, 100)));
    }

    #[test]
    fn approval_pending_order_does_not_qualify() {
        let e = event(EventSettings::new());
        let mut o = order(&e, 2500);
        o.require_approval = true;
        assert!(!StandardQualification.is_qualified(&e, &o));
    }

    #[test]
    fn sales_channel_must_be_listed() {
        let e = event(EventSettings::new().with(INVOICE_GENERATE_SALES_CHANNELS, json!(["web"])));
        let mut o = order(&e, 2500);
        o.sales_channel = "box_office".to_string();
        assert!(!StandardQualification.is_qualified(&e, &o));

        let e = event(
            EventSettings::new().with(INVOICE_GENERATE_SALES_CHANNELS, json!(["web", "box_office"])),
        );
        assert!(StandardQualification.is_qualified(&e, &o));
    }
}
