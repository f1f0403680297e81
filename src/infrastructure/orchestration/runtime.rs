//! Foreground runtime: console input, event fan-out, orderly shutdown.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::console::{parse, Console, Reply};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::notifier::NotifierRegistry;

/// Run until `quit` is typed or `shutdown` flips to `true`.
///
/// Closing `input` does not stop the runtime; workers keep going until the
/// shutdown signal. Every worker is stopped before this returns, and events
/// produced while stopping are still delivered.
///
/// # Errors
///
/// Returns an error only if writing to `output` fails.
pub async fn run_with_shutdown<R, W>(
    services: Services,
    notifiers: NotifierRegistry,
    input: R,
    mut output: W,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Services {
        supervisor,
        mut events,
        session,
        catalog,
        settings_store,
    } = services;
    let console = Console::new(supervisor.clone(), catalog, session, settings_store);
    let mut lines = input.lines();
    let mut input_open = true;

    info!(
        tasks = supervisor.tasks().len(),
        notifiers = notifiers.len(),
        "Console ready"
    );

    let result = loop {
        tokio::select! {
            changed = shutdown.changed() => {
                match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!("Shutdown signal received");
                        break Ok(());
                    }
                    Ok(()) => {}
                    Err(_) => {
                        info!("Shutdown channel closed");
                        break Ok(());
                    }
                }
            }
            Some(event) = events.recv() => notifiers.notify_all(event),
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Console input closed");
                        input_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "Console input failed");
                        input_open = false;
                        continue;
                    }
                };
                let text = match parse(&line) {
                    Ok(None) => continue,
                    Ok(Some(command)) => match console.execute(command).await {
                        Ok(Reply::Text(text)) => text,
                        Ok(Reply::Quit) => break Ok(()),
                        Err(e) => format!("error: {e}"),
                    },
                    Err(e) => format!("error: {e}"),
                };
                if let Err(e) = write_line(&mut output, &text).await {
                    break Err(e);
                }
            }
        }
    };

    supervisor.shutdown().await;
    while let Ok(event) = events.try_recv() {
        notifiers.notify_all(event);
    }
    info!("keygrab stopped");
    result
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
