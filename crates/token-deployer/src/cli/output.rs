//! Terminal rendering for the CLI.

use colored::Colorize;

/// Colored status lines and key-value blocks.
pub struct Display;

impl Display {
	pub fn header(text: &str) {
		println!("\n{}", text.bold().cyan());
		println!("{}", "─".repeat(text.chars().count()).cyan());
	}

	pub fn success(message: &str) {
		println!("{} {}", "✓".green().bold(), message);
	}

	/// Written to stderr.
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	pub fn warning(message: &str) {
		println!("{} {}", "⚠".yellow().bold(), message.yellow());
	}

	pub fn info(message: &str) {
		println!("{} {}", "ℹ".blue().bold(), message);
	}

	pub fn kv(key: &str, value: &str) {
		println!("  {} {}", format!("{key}:").bold(), value);
	}

	pub fn section(title: &str) {
		println!("\n{}", format!("▸ {title}").bold());
	}

	/// Indented bullet list.
	pub fn list<S: AsRef<str>>(items: &[S]) {
		for item in items {
			println!("  • {}", item.as_ref());
		}
	}

	pub fn next_steps(steps: &[&str]) {
		Self::section("Next Steps");
		for (i, step) in steps.iter().enumerate() {
			println!("  {}. {}", i + 1, step);
		}
	}
}
