//! Watch command: print agent status as it changes

use anyhow::Result;

use crate::output::{format_status, print_info};
use gkm_core::AppContext;

/// Poll the agent until interrupted, printing every status change
pub async fn watch_command(ctx: &mut AppContext) -> Result<()> {
    print_info(&format!(
        "Watching SSH agent every {}s (Ctrl+C to stop)",
        ctx.config().poll_interval.as_secs()
    ));

    let mut last = ctx.controller().current_status().await;
    println!("{}", format_status(&last));

    let mut rx = ctx.subscribe();
    ctx.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping watch");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = rx.borrow_and_update().clone();
                // The poller starts from an empty snapshot
                if status != last {
                    println!("{}", format_status(&status));
                    last = status;
                }
            }
        }
    }

    ctx.stop().await;
    Ok(())
}
