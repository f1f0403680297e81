//! Plain-text rendering for console replies.

use rust_decimal::Decimal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::listing::ItemSummary;
use crate::domain::policy::percentage_threshold;
use crate::domain::task::GrabTask;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Join")]
    join: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Pct")]
    percentage: String,
    #[tabled(rename = "Buy at")]
    threshold: String,
    #[tabled(rename = "Lowest")]
    lowest: String,
    #[tabled(rename = "Bought")]
    bought: String,
}

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Available")]
    available: &'static str,
}

fn price(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"))
}

/// Task table, or a short note when there are none.
#[must_use]
pub fn task_table(tasks: &[GrabTask]) -> String {
    if tasks.is_empty() {
        return "no tasks".to_string();
    }
    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.to_string(),
        name: task.name.clone(),
        status: task.status.to_string(),
        join: price(Some(task.join_price())),
        target: price(task.target_price()),
        percentage: task.target_percentage().to_string(),
        threshold: price(percentage_threshold(&task.policy())),
        lowest: price(task.current_min_price),
        bought: price(task.last_success_price),
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Numbered search results, as referenced by `add <n>`.
#[must_use]
pub fn search_table(items: &[ItemSummary]) -> String {
    if items.is_empty() {
        return "no results".to_string();
    }
    let rows = items.iter().enumerate().map(|(i, item)| SearchRow {
        index: i + 1,
        id: item.id.to_string(),
        name: item.name.clone(),
        price: price(item.price),
        available: if item.available { "yes" } else { "no" },
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::ItemId;
    use crate::domain::task::{NewTask, Percentage};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn task_table_shows_threshold_and_dashes() {
        let task = GrabTask::new(
            NewTask::try_new("g-1", "Hades", dec!(100)).unwrap(),
            Percentage::DEFAULT,
            Utc::now(),
        );
        let table = task_table(&[task]);
        assert!(table.contains("Hades"));
        assert!(table.contains("70.00"));
        assert!(table.contains("monitoring"));
        assert!(table.contains('-'));
    }

    #[test]
    fn search_table_is_one_based() {
        let items = vec![ItemSummary {
            id: ItemId::from("g-9"),
            name: "Celeste".into(),
            price: Some(dec!(20)),
            available: true,
            app_id: None,
        }];
        let table = search_table(&items);
        assert!(table.contains("│ 1 "));
        assert!(table.contains("Celeste"));
    }

    #[test]
    fn empty_inputs_render_notes() {
        assert_eq!(task_table(&[]), "no tasks");
        assert_eq!(search_table(&[]), "no results");
    }
}
