//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categories` - Category commands (list, seed, add, search)
//! - `core` - Core commands (init) and shared utilities (open_db, parse_date)
//! - `net_worth` - Net worth snapshot commands (list, add, update)
//! - `normalize` - Statement normalization
//! - `reports` - Report generation commands
//! - `transactions` - Transaction commands (list, show, set-category, note, review)

pub mod categories;
pub mod core;
pub mod net_worth;
pub mod normalize;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use net_worth::*;
pub use normalize::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Colored dollar amount: outflows red, inflows green with a leading +
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[32m+${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[31m${:.2}\x1b[0m", amount)
    }
}
