//! Handler for `keygrab tasks`.

use serde_json::json;

use crate::adapter::inbound::cli::command::TasksArgs;
use crate::adapter::inbound::cli::{output, paths};
use crate::adapter::inbound::console::render;
use crate::adapter::outbound::store::JsonTaskStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::TaskStore;

/// Print the saved task list as stored on disk.
///
/// # Errors
///
/// Returns an error if the config or the task file cannot be read.
pub fn execute(args: &TasksArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let path = paths::store_path(&config, args.store.as_deref());
    let tasks = JsonTaskStore::new(&path).load()?;

    if output::is_json() {
        output::json_output(json!({
            "store": path.display().to_string(),
            "tasks": tasks,
        }));
        return Ok(());
    }

    output::section("Tasks");
    output::field("Task file", path.display());
    output::field("Count", tasks.len());
    output::lines(&render::task_table(&tasks));
    Ok(())
}
