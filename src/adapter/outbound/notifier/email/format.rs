//! HTML bodies for notification emails.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::port::outbound::notifier::{Event, PauseEvent, PurchaseEvent};

/// Time the marketplace gives the buyer to pay before the key is released.
const PAYMENT_WINDOW_MINUTES: i64 = 15;

/// Subject and HTML body of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

/// Render an event, or `None` if it should not be emailed.
pub fn format_event_email(event: &Event, notify_pauses: bool) -> Option<EmailMessage> {
    match event {
        Event::PurchaseSucceeded(e) => Some(purchase_email(e)),
        Event::TaskPaused(e) if notify_pauses => Some(pause_email(e)),
        Event::TaskPaused(_) => None,
    }
}

/// Share of the join price saved, in percent, rounded to two places.
///
/// Zero when the join price is unknown or not positive.
#[must_use]
pub fn discount_percent(join_price: Option<Decimal>, paid: Decimal) -> Decimal {
    match join_price {
        Some(join) if join > Decimal::ZERO => {
            ((join - paid) / join * Decimal::ONE_HUNDRED).round_dp(2)
        }
        _ => Decimal::ZERO,
    }
}

fn purchase_email(e: &PurchaseEvent) -> EmailMessage {
    let paid = e.paid_price.unwrap_or(e.price);
    let join = e
        .join_price
        .map_or_else(|| "-".to_string(), |j| format!("¥{j:.2}"));
    let saved = e
        .join_price
        .map_or_else(|| "-".to_string(), |j| format!("¥{:.2}", j - paid));
    let discount = discount_percent(e.join_price, paid);
    let order = e.order_id.as_ref().map_or("-", |o| o.as_str());
    let release = e.completed_at + Duration::minutes(PAYMENT_WINDOW_MINUTES);
    let name = escape_html(&e.name);

    let rows = [
        row("Paid", &format!("¥{paid:.2}")),
        row("Lowest when added", &join),
        row("Saved", &saved),
        row("Discount", &format!("{discount:.2}%")),
        row("Order", &escape_html(order)),
        row("Item", &escape_html(e.item_id.as_str())),
        row("Bought at", &timestamp(e.completed_at)),
    ]
    .concat();

    let body = format!(
        "<h2 style=\"margin:0 0 16px\">{name}</h2>\n\
         <table style=\"border-collapse:collapse;width:100%\">\n{rows}</table>\n\
         <p style=\"color:#e65100\">Pay within {PAYMENT_WINDOW_MINUTES} minutes. \
         The key should be released around {}.</p>\n\
         <p style=\"color:#999;font-size:12px\">{}</p>",
        release.format("%H:%M UTC"),
        escape_html(&e.reason),
    );

    EmailMessage {
        subject: format!("Key purchased - {}", e.name),
        html: page("Key purchased", "#4caf50", &body),
    }
}

fn pause_email(e: &PauseEvent) -> EmailMessage {
    let body = format!(
        "<h2 style=\"margin:0 0 16px\">{}</h2>\n\
         <table style=\"border-collapse:collapse;width:100%\">\n{}{}</table>",
        escape_html(&e.name),
        row("Item", &escape_html(e.item_id.as_str())),
        row("Reason", &escape_html(&e.reason)),
    );
    EmailMessage {
        subject: format!("Task paused - {}", e.name),
        html: page("Task paused", "#ff9800", &body),
    }
}

fn page(title: &str, accent: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><meta charset=\"UTF-8\"><title>{title}</title></head>\n\
         <body style=\"margin:0;padding:0;font-family:Arial,sans-serif;background:#f5f5f5\">\n\
         <div style=\"max-width:600px;margin:0 auto;background:#fff\">\n\
         <div style=\"background:{accent};padding:24px;text-align:center\">\
         <h1 style=\"margin:0;color:#fff\">{title}</h1></div>\n\
         <div style=\"padding:24px\">\n{body}\n</div>\n\
         </div>\n</body>\n</html>\n"
    )
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding:6px 0;color:#666\">{label}</td>\
         <td style=\"padding:6px 0;text-align:right;font-weight:bold\">{value}</td></tr>\n"
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::ItemId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn purchase(join_price: Option<Decimal>, paid_price: Option<Decimal>) -> Event {
        Event::PurchaseSucceeded(PurchaseEvent {
            item_id: ItemId::from("g-1"),
            name: "Hades <GOTY>".into(),
            price: dec!(70),
            paid_price,
            join_price,
            order_id: Some("o-7".into()),
            reason: "price 70.00 <= 70% of join 100.00".into(),
            completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        })
    }

    #[test]
    fn discount_is_share_of_join_price() {
        assert_eq!(discount_percent(Some(dec!(100)), dec!(99)), dec!(1));
        assert_eq!(discount_percent(Some(dec!(80)), dec!(60)), dec!(25));
        assert_eq!(discount_percent(Some(dec!(3)), dec!(2)), dec!(33.33));
        assert_eq!(discount_percent(Some(Decimal::ZERO), dec!(5)), Decimal::ZERO);
        assert_eq!(discount_percent(None, dec!(5)), Decimal::ZERO);
    }

    #[test]
    fn purchase_email_shows_prices_and_escapes_name() {
        let mail = format_event_email(&purchase(Some(dec!(100)), Some(dec!(68.5))), false).unwrap();

        assert_eq!(mail.subject, "Key purchased - Hades <GOTY>");
        assert!(mail.html.contains("Hades &lt;GOTY&gt;"));
        assert!(!mail.html.contains("<GOTY>"));
        assert!(mail.html.contains("¥68.50"));
        assert!(mail.html.contains("¥100.00"));
        assert!(mail.html.contains("¥31.50"));
        assert!(mail.html.contains("31.50%"));
        assert!(mail.html.contains("o-7"));
        assert!(mail.html.contains("12:15 UTC"));
    }

    #[test]
    fn purchase_email_without_join_price() {
        let mail = format_event_email(&purchase(None, None), false).unwrap();
        assert!(mail.html.contains("¥70.00"));
        assert!(mail.html.contains("0.00%"));
    }

    #[test]
    fn pause_email_respects_toggle() {
        let event = Event::TaskPaused(PauseEvent {
            item_id: ItemId::from("g-2"),
            name: "Celeste".into(),
            reason: "sold out".into(),
        });
        assert!(format_event_email(&event, false).is_none());

        let mail = format_event_email(&event, true).unwrap();
        assert_eq!(mail.subject, "Task paused - Celeste");
        assert!(mail.html.contains("sold out"));
    }
}
