//! Remote authentication test

use anyhow::Result;

use crate::output::{print_error, print_info, print_success};
use gkm_core::{AppContext, AuthError};

/// Execute the test command against `host`, or the configured host
pub async fn test_command(ctx: &AppContext, host: Option<&str>) -> Result<()> {
    let host = host.unwrap_or(&ctx.config().auth_host);
    print_info(&format!("Testing SSH authentication to {}...", host));

    match ctx.controller().test_remote_auth(host).await {
        Ok(identity) => {
            print_success(&format!("Connected as: {}", identity.username));
            Ok(())
        }
        Err(AuthError::Rejected { detail, .. }) => {
            print_error("Connection failed");
            if !detail.trim().is_empty() {
                eprintln!("{}", detail.trim_end());
            }
            anyhow::bail!("Authentication to {} failed", host)
        }
        Err(e @ AuthError::NoResponse { .. }) => {
            print_error(&format!("Connection failed: {}", e));
            Err(e.into())
        }
        Err(e) => {
            print_error(&format!("Connection test could not run: {}", e));
            Err(e.into())
        }
    }
}
