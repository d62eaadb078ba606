//! Registry commands: list, add, remove

use std::io::Write;

use anyhow::Result;

use crate::output::{format_keys, print_error, print_success, print_warning};
use gkm_core::AppContext;

/// Execute the list command
pub async fn list_command(ctx: &AppContext) -> Result<()> {
    let keys = ctx.keys().await;
    println!("Configured Keys:");
    println!("{}", format_keys(&keys));
    Ok(())
}

/// Execute the add command
pub async fn add_command(ctx: &AppContext, name: &str, path: &str) -> Result<()> {
    match ctx.add_key(name, path).await {
        Ok(Some(previous)) => {
            print_success(&format!(
                "Key '{}' updated ({} -> {})",
                name, previous, path
            ));
        }
        Ok(None) => {
            print_success(&format!("Key '{}' added successfully!", name));
        }
        Err(e) => {
            print_error(&format!("Failed to add key '{}': {}", name, e));
            return Err(e.into());
        }
    }
    Ok(())
}

/// Execute the remove command
pub async fn remove_command(ctx: &AppContext, name: &str, force: bool) -> Result<()> {
    if !force {
        print!("Remove key '{}'? [y/N] ", name);
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            print_warning("Aborted");
            return Ok(());
        }
    }

    match ctx.remove_key(name).await {
        Ok(_) => {
            print_success(&format!("Key '{}' removed", name));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Failed to remove key '{}': {}", name, e));
            Err(e.into())
        }
    }
}
