// src/utils/log.rs

//! Run-report helpers on top of the `log` facade.
//!
//! Library code logs through `log::*` directly; these helpers only shape
//! multi-line progress and summary blocks.

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {step_num}/{total}] {message}");
}

/// Log a separator line
pub fn separator() {
    log::info!("{}", "─".repeat(60));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {message}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for (key, value) in items {
        sub_item(&format!("{key}: {value}"));
    }
}

/// Group digits in thousands: `250000000` → `250 000 000`.
pub fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped() {
        assert_eq!(grouped(0), "0");
        assert_eq!(grouped(999), "999");
        assert_eq!(grouped(1_000), "1 000");
        assert_eq!(grouped(250_000_000), "250 000 000");
    }
}
