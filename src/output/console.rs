//! Console output utilities.

use console::style;

use crate::config::Config;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     stagepub                                          ║
║     fetch privately, publish to shared storage        ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(config: &Config, requests: usize) {
    let publish = &config.publish;
    let strategy = match (publish.use_broker, &publish.legacy_root) {
        (true, Some(legacy)) => format!(
            "broker -> {} (legacy {})",
            config.public_root().display(),
            legacy.display()
        ),
        (true, None) => format!("broker -> {}", config.public_root().display()),
        (false, Some(legacy)) => format!("legacy -> {}", legacy.display()),
        (false, None) => "none".to_string(),
    };

    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Requests: {}", requests);
    println!("  Staging: {}", config.staging_root().display());
    println!("  Publish: {}", strategy);
    if let Some(subdir) = &publish.subdirectory {
        println!("  Subdirectory: {}", subdir);
    }
    println!("  Permissions: {}", config.permissions.mode);
    println!();
}
