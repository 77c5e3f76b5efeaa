//! Account command implementation.
//!
//! Manage saved credentials in `~/.qiskit/qiskit-ibm.json`.

use anyhow::Result;
use console::style;

use qfc_core::{Account, AccountStore, Channel};

/// Execute the account save subcommand.
pub fn execute_save(
    token: &str,
    name: Option<&str>,
    channel: Option<&str>,
    instance: Option<&str>,
    set_default: bool,
    overwrite: bool,
) -> Result<()> {
    let store = AccountStore::new()?;

    let mut account = Account::new(token);
    if let Some(channel) = channel {
        account = account.with_channel(channel.parse::<Channel>()?);
    }
    if let Some(instance) = instance {
        account = account.with_instance(instance);
    }
    if set_default {
        account = account.as_default();
    }

    let saved = store.save(name, account, overwrite)?;

    println!(
        "{} Saved account {} to {}",
        style("✓").green().bold(),
        style(&saved).cyan(),
        style(store.path().display()).dim()
    );
    Ok(())
}

/// Execute the account list subcommand.
pub fn execute_list() -> Result<()> {
    let store = AccountStore::new()?;
    let accounts = store.list()?;

    if accounts.is_empty() {
        println!("No saved accounts. Use 'qfc account save <TOKEN>' to add one.");
        return Ok(());
    }

    println!("{} {} account(s):\n", style("→").cyan().bold(), accounts.len());
    println!(
        "  {:<32}  {:<22}  {:<8}  {}",
        style("NAME").bold(),
        style("CHANNEL").bold(),
        style("DEFAULT").bold(),
        style("INSTANCE").bold()
    );
    println!("  {}", "-".repeat(80));

    for (name, account) in &accounts {
        println!(
            "  {:<32}  {:<22}  {:<8}  {}",
            style(name).cyan(),
            account.channel.as_str(),
            if account.is_default_account { "yes" } else { "" },
            account.instance.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Execute the account delete subcommand.
pub fn execute_delete(name: &str) -> Result<()> {
    let store = AccountStore::new()?;
    if !store.delete(name)? {
        anyhow::bail!("No saved account named '{name}'");
    }
    println!("{} Deleted account {}", style("✓").green().bold(), style(name).cyan());
    Ok(())
}
