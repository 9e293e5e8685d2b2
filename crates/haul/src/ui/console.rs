use console::{Color, Term, style};

/// `key` with the trailing colon the captions use. Ellipsis captions are
/// left alone.
fn caption(key: &str) -> String {
    if key.ends_with(':') || key.ends_with("...") {
        key.to_string()
    } else {
        format!("{key}:")
    }
}

fn value_color(value: &str, color: Option<Color>) -> Option<Color> {
    if value == "Done" {
        Some(Color::Green)
    } else {
        color
    }
}

pub fn log_pair_colored(key: &str, value: &str, color: Option<Color>) {
    let key = style(caption(key)).fg(Color::Cyan);
    let line = match value_color(value, color) {
        Some(color) => format!("{key} {}", style(value).fg(color)),
        None => format!("{key} {value}"),
    };
    let _ = Term::stderr().write_line(&line);
}

pub fn log_pair(key: &str, value: &str) {
    log_pair_colored(key, value, None);
}

/// Replace the previous line.
pub fn log_pair_above(key: &str, value: &str) {
    let _ = Term::stderr().clear_last_lines(1);
    log_pair(key, value);
}

pub fn log_error(error: &anyhow::Error) {
    let _ = Term::stderr().write_line(&format!("{} {error:#}", style("error:").red().bold()));
}
