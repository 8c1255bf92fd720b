//! Shared event rendering for terminal output.
//! Status lines go to stderr; stable text itself goes through the sink.

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces a pending status line).
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Render a freshly stabilized string.
pub fn render_stable(text: &str) {
    eprintln!("{GREEN}stable{RESET} {text}");
}

/// Render a flush-epoch winner before it is handed to the notification sink.
pub fn render_flush(text: &str, priority: u32) {
    eprintln!("{CYAN}flush{RESET} {text} {DIM}(priority {priority}){RESET}");
}
