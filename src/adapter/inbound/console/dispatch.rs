//! Executes parsed console commands against the supervisor.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::application::grab::{PolicyUpdate, WorkerSupervisor};
use crate::application::session::SessionStore;
use crate::domain::id::ItemId;
use crate::domain::listing::ItemSummary;
use crate::domain::task::{NewTask, Percentage};
use crate::error::Result;
use crate::port::outbound::marketplace::CatalogSearch;
use crate::port::outbound::store::SettingsStore;

use super::command::{ConsoleCommand, HELP};
use super::render;

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

impl Reply {
    fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

pub struct Console {
    supervisor: WorkerSupervisor,
    catalog: Arc<dyn CatalogSearch>,
    session: Arc<SessionStore>,
    settings_store: Arc<dyn SettingsStore>,
    last_results: Mutex<Vec<ItemSummary>>,
}

impl Console {
    #[must_use]
    pub fn new(
        supervisor: WorkerSupervisor,
        catalog: Arc<dyn CatalogSearch>,
        session: Arc<SessionStore>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            supervisor,
            catalog,
            session,
            settings_store,
            last_results: Mutex::new(Vec::new()),
        }
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Returns supervisor and marketplace errors unchanged so the caller can
    /// print them; none of them are fatal.
    pub async fn execute(&self, command: ConsoleCommand) -> Result<Reply> {
        let reply = match command {
            ConsoleCommand::Search(keyword) => {
                let results = self.catalog.search(&keyword).await?;
                let table = render::search_table(&results);
                *self.last_results.lock() = results;
                Reply::Text(table)
            }
            ConsoleCommand::AddResult(index) => {
                let picked = self.last_results.lock().get(index - 1).cloned();
                let Some(item) = picked else {
                    return Ok(Reply::text(format!("no search result #{index}")));
                };
                let join_price = item.price.unwrap_or(Decimal::ZERO);
                self.add(NewTask::try_new(item.id, item.name, join_price)?)
            }
            ConsoleCommand::Add {
                id,
                name,
                join_price,
            } => self.add(NewTask::try_new(id, name, join_price)?),
            ConsoleCommand::List => Reply::Text(render::task_table(&self.supervisor.tasks())),
            ConsoleCommand::Pause(id) => {
                self.supervisor.pause(&id)?;
                Reply::text(format!("{id} paused"))
            }
            ConsoleCommand::Resume(id) => {
                self.supervisor.resume(&id)?;
                Reply::text(format!("{id} monitoring"))
            }
            ConsoleCommand::Remove(id) => {
                if self.supervisor.remove_task(&id).await? {
                    Reply::text(format!("{id} removed"))
                } else {
                    Reply::text(format!("{id} is not tracked"))
                }
            }
            ConsoleCommand::Target { id, price } => {
                let task = self
                    .supervisor
                    .update_policy(&id, PolicyUpdate::target_price(price))?;
                match task.target_price() {
                    Some(p) => Reply::text(format!("{id} target {p:.2}")),
                    None => Reply::text(format!("{id} target cleared")),
                }
            }
            ConsoleCommand::Percent { id, percentage } => {
                let task = self
                    .supervisor
                    .update_policy(&id, PolicyUpdate::percentage(percentage))?;
                Reply::text(format!("{id} percentage {}", task.target_percentage()))
            }
            ConsoleCommand::Interval(secs) => {
                let applied = self.supervisor.settings().set_poll_interval_secs(secs);
                Reply::Text(self.persist_settings(format!("poll interval {applied}s")))
            }
            ConsoleCommand::Default {
                percentage,
                apply_to_all,
            } => {
                let percentage = Percentage::clamped(percentage);
                let updated = self
                    .supervisor
                    .set_default_percentage(percentage, apply_to_all);
                let text = if apply_to_all {
                    format!("default {percentage}, applied to {updated} task(s)")
                } else {
                    format!("default {percentage}")
                };
                Reply::Text(self.persist_settings(text))
            }
            ConsoleCommand::Token(token) => {
                let saved = self.settings_store.save_token(&token);
                self.session.replace(Some(token));
                info!("Access token replaced");
                match saved {
                    Ok(()) => Reply::text("token updated"),
                    Err(e) => {
                        error!(error = %e, "Failed to save access token");
                        Reply::text(format!("token updated for this session, not saved: {e}"))
                    }
                }
            }
            ConsoleCommand::Help => Reply::text(HELP),
            ConsoleCommand::Quit => Reply::Quit,
        };
        Ok(reply)
    }

    /// Save the current interval and default percentage. A failed save keeps
    /// the in-memory change and is reported in the reply.
    fn persist_settings(&self, mut text: String) -> String {
        let snapshot = self.supervisor.settings().snapshot();
        if let Err(e) = self.settings_store.save_settings(&snapshot) {
            error!(error = %e, "Failed to save operator settings");
            text.push_str(&format!(" (not saved: {e})"));
        }
        text
    }

    fn add(&self, request: NewTask) -> Reply {
        let id: ItemId = request.id.clone();
        if self.supervisor.add_task(request) {
            Reply::text(format!("{id} added"))
        } else {
            Reply::text(format!("{id} is already tracked"))
        }
    }
}
