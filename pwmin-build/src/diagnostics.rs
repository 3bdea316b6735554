//! Build-aborting diagnostics
//!
//! Errors are rendered as a boxed banner so they stand out in cargo's
//! build script output.

use pwmin_core::BOARD_PROFILES;

use crate::pass::BuildError;

/// Width of the text area inside the box
const TEXT_WIDTH: usize = 64;

fn rule(left: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    line.extend(std::iter::repeat('═').take(TEXT_WIDTH + 3));
    line.push(right);
    line
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let kept: String = line.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        line.to_string()
    }
}

/// Format message lines with box drawing
fn format_lines(msg: &str) -> Vec<String> {
    msg.lines()
        .map(|line| format!("║  {:<width$} ║", truncate(line, TEXT_WIDTH), width = TEXT_WIDTH))
        .collect()
}

/// Format one detail as a bullet, continuation lines indented under it
fn format_detail(detail: &str) -> Vec<String> {
    detail
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let marker = if i == 0 { '•' } else { ' ' };
            let text = truncate(line, TEXT_WIDTH - 2);
            format!("║  {} {:<width$} ║", marker, text, width = TEXT_WIDTH - 2)
        })
        .collect()
}

/// Render a titled error box with one bullet per detail
pub fn render(title: &str, details: &[String]) -> String {
    let mut out = vec![String::new(), rule('╔', '╗')];
    out.extend(format_lines(&format!("ERROR: {}", title)));
    if !details.is_empty() {
        out.push(rule('╠', '╣'));
        for detail in details {
            out.extend(format_detail(detail));
        }
    }
    out.push(rule('╚', '╝'));
    out.join("\n")
}

/// Render a build failure
pub fn render_build_error(err: &BuildError) -> String {
    match err {
        BuildError::Config(e) => render("Invalid PWM input configuration", &[e.to_string()]),
        BuildError::Board(e) => {
            let names: Vec<&str> = BOARD_PROFILES.iter().map(|p| p.name).collect();
            render(
                "No board profile",
                &[e.to_string(), format!("Set `board` to one of: {}", names.join(", "))],
            )
        }
        BuildError::Declaration { index, name, error } => render(
            "Invalid PWM input sensor",
            &[format!("sensor '{}' (#{})", name, index), error.to_string()],
        ),
        BuildError::Emit(e) => render("Failed to emit PWM input pins", &[e.to_string()]),
    }
}
