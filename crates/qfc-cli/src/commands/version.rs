//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Qiskit Functions catalog client",
        style("qfc").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qfc-core                 Accounts, job and function types, gateway trait");
    println!("  qfc-adapter-serverless   Serverless gateway REST client");
    println!("  qfc-catalog              Catalog and serverless facades");
    println!("  qfc-cli                  Command-line interface");
    println!();
    println!(
        "Gateway:    {}",
        style(qfc_core::DEFAULT_HOST).underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
