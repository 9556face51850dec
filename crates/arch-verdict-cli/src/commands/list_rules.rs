//! List rules command implementation.

use arch_verdict_layers::AVAILABLE_RULES;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<22} Description", "Name");
    println!("{}", "-".repeat(80));

    for (name, description) in AVAILABLE_RULES {
        println!("{name:<22} {description}");
    }

    println!("\nRules are configured under [rules.<name>] (enabled, priority).");
    println!("dependency-pattern and naming are built from [[constraints]] entries.");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  arch-verdict check --rules layer-dependencies,naming");
}
