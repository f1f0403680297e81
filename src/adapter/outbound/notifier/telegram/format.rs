//! Message formatting for Telegram notifications.

use crate::port::outbound::notifier::Event;

use super::notifier::TelegramConfig;

/// Format an event into a Telegram message, or None if the event should be skipped.
pub fn format_event_message(event: &Event, config: &TelegramConfig) -> Option<String> {
    match event {
        Event::PurchaseSucceeded(e) => {
            let name = truncate(&e.name, 60);
            let order = e
                .order_id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let paid = e
                .paid_price
                .map_or_else(|| format!("{:.2}", e.price), |p| format!("{p:.2}"));

            Some(format!(
                "✅ *Key Purchased*\n\
                \n\
                🎮 {}\n\
                🆔 Item: `{}`\n\
                💰 Paid: `¥{}`\n\
                🧾 Order: `{}`\n\
                📝 {}",
                escape_markdown(&name),
                escape_markdown(e.item_id.as_str()),
                escape_markdown(&paid),
                escape_markdown(&order),
                escape_markdown(&e.reason)
            ))
        }
        Event::TaskPaused(e) if config.notify_pauses => {
            let name = truncate(&e.name, 60);

            Some(format!(
                "⏸️ *Task Paused*\n\
                \n\
                🎮 {}\n\
                🆔 Item: `{}`\n\
                🚫 Reason: {}",
                escape_markdown(&name),
                escape_markdown(e.item_id.as_str()),
                escape_markdown(&e.reason)
            ))
        }
        Event::TaskPaused(_) => None,
    }
}

/// Truncate a string with ellipsis (Unicode-safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Escape special characters for Telegram `MarkdownV2`.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}
