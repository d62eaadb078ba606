//! Agent commands: load, unload, status

use anyhow::Result;

use crate::output::{format_status, print_error, print_info, print_success, print_warning};
use gkm_core::{AgentPresence, AppContext};

/// Make sure an agent is reachable before talking to it
///
/// Failures are reported as warnings; the following command surfaces its own
/// error if the agent really is unusable.
pub async fn ensure_agent(ctx: &AppContext) {
    match ctx.controller().ensure_agent_running().await {
        Ok(AgentPresence::Running) => {}
        Ok(AgentPresence::Started(env)) => {
            print_info("SSH agent not running. Started a new one.");
            if let Some(env) = env {
                print_info("Point your shell at it with:");
                for line in env.export_lines() {
                    println!("  {}", line);
                }
            }
        }
        Err(e) => {
            print_warning(&format!("Could not check SSH agent: {}", e));
        }
    }
}

/// Execute the load command
pub async fn load_command(ctx: &AppContext, name: &str) -> Result<()> {
    ensure_agent(ctx).await;

    match ctx.controller().load_registered(name).await {
        Ok(path) => {
            print_success(&format!("Key '{}' loaded successfully!", name));
            tracing::debug!("Loaded {:?}", path);
            println!("{}", format_status(&ctx.controller().current_status().await));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Failed to load key: {}", e));
            Err(e.into())
        }
    }
}

/// Execute the unload command
pub async fn unload_command(ctx: &AppContext) -> Result<()> {
    ctx.controller().unload_all().await;
    print_success("All keys unloaded");
    println!("{}", format_status(&ctx.controller().current_status().await));
    Ok(())
}

/// Execute the status command
pub async fn status_command(ctx: &AppContext) -> Result<()> {
    let state = ctx.controller().agent_state().await;
    let status = ctx.controller().current_status().await;
    println!("{}", format_status(&status));
    println!("Agent: {}", state);
    Ok(())
}
