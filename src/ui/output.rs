use crate::output::is_quiet;
use crate::ui::{stderr_theme, theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().heading));
}

pub fn banner(title: &str, subtitle: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::DATABASE, title.style(theme().heading));
    println!("   {}", subtitle.style(theme().label));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().good));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(stderr_theme().caution));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().label), value);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label), value);
}
