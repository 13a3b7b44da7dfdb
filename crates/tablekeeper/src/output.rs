//! Terminal output for the `plan` command.

pub use anstream::println as aprintln;

/// Tokyo Night color palette
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

pub fn p_g(text: &str) -> String {
    paint(colors::TKN_GREEN, text)
}

pub fn p_y(text: &str) -> String {
    paint(colors::TKN_YELLOW, text)
}

pub fn p_b(text: &str) -> String {
    paint(colors::TKN_BLUE, text)
}

pub fn p_c(text: &str) -> String {
    paint(colors::TKN_CYAN, text)
}

/// Colors a plan line by its leading marker.
pub fn colorize_plan_line(line: &str) -> String {
    match line.chars().next() {
        Some('+') => p_g(line),
        Some('~') => p_y(line),
        _ => p_b(line),
    }
}

/// Prints a plan with a header naming the target store.
pub fn print_plan(target: &str, lines: &[String]) {
    aprintln!("{}", p_c(&format!("Plan for {}", target)));
    for line in lines {
        aprintln!("  {}", colorize_plan_line(line));
    }
}
