//! Handler for `keygrab search`.

use std::sync::Arc;

use serde_json::json;

use crate::adapter::inbound::cli::command::SearchArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::console::render;
use crate::adapter::outbound::steampy::SteampyClient;
use crate::application::session::SessionStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::marketplace::CatalogSearch;

/// One-shot catalog search.
///
/// # Errors
///
/// Returns config, transport and authorization errors.
pub async fn execute(args: &SearchArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let session = Arc::new(SessionStore::new(config.access_token.clone()));
    let client = SteampyClient::from_config(&config.marketplace, session)?;

    let keyword = args.keyword.join(" ");
    let results = client.search(&keyword).await?;

    if output::is_json() {
        output::json_output(json!({
            "keyword": keyword,
            "results": results,
        }));
        return Ok(());
    }

    output::section(&format!("Results for \"{keyword}\""));
    output::lines(&render::search_table(&results));
    if !results.is_empty() {
        output::note("Track one with `add <id> <name> <price>` in `keygrab run`");
    }
    Ok(())
}
