//! ANSI text decoration
//!
//! Pure helpers for coloring report lines. Color is re-applied after every
//! line break and reset at the end of every line, so decoration never bleeds
//! past a line boundary.

const RESET: &str = "\x1b[0m";

/// Foreground text color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    None,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn code(self) -> Option<u8> {
        match self {
            Color::None => None,
            Color::Black => Some(30),
            Color::Red => Some(31),
            Color::Green => Some(32),
            Color::Yellow => Some(33),
            Color::Blue => Some(34),
            Color::Magenta => Some(35),
            Color::Cyan => Some(36),
            Color::White => Some(37),
        }
    }
}

/// Text style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    #[default]
    None,
    Bold,
    Underline,
}

impl Style {
    fn code(self) -> Option<u8> {
        match self {
            Style::None => None,
            Style::Bold => Some(1),
            Style::Underline => Some(4),
        }
    }
}

/// Background color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    #[default]
    None,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Background {
    fn code(self) -> Option<u8> {
        match self {
            Background::None => None,
            Background::Black => Some(40),
            Background::Red => Some(41),
            Background::Green => Some(42),
            Background::Yellow => Some(43),
            Background::Blue => Some(44),
            Background::Magenta => Some(45),
            Background::Cyan => Some(46),
            Background::White => Some(47),
        }
    }
}

/// Decorate `text` with the given attributes.
///
/// Returns `text` unchanged when all three attributes are `None`. Otherwise
/// every line of `text` is wrapped in an escape prefix (semicolon-joined
/// numeric codes) and a reset suffix.
pub fn decorate(text: &str, fg: Color, style: Style, bg: Background) -> String {
    let codes: Vec<u8> = [fg.code(), style.code(), bg.code()]
        .into_iter()
        .flatten()
        .collect();

    if codes.is_empty() {
        return text.to_string();
    }

    let joined = codes
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(";");
    let prefix = format!("\x1b[{joined}m");

    text.split('\n')
        .map(|line| format!("{prefix}{line}{RESET}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Green text
pub fn green(text: &str) -> String {
    decorate(text, Color::Green, Style::None, Background::None)
}

/// Red text
pub fn red(text: &str) -> String {
    decorate(text, Color::Red, Style::None, Background::None)
}

/// Yellow text
pub fn yellow(text: &str) -> String {
    decorate(text, Color::Yellow, Style::None, Background::None)
}

/// Bold green text
pub fn bold_green(text: &str) -> String {
    decorate(text, Color::Green, Style::Bold, Background::None)
}

/// Bold red text
pub fn bold_red(text: &str) -> String {
    decorate(text, Color::Red, Style::Bold, Background::None)
}

/// Bold yellow text
pub fn bold_yellow(text: &str) -> String {
    decorate(text, Color::Yellow, Style::Bold, Background::None)
}

/// Map a color token name (as used in expected transcripts, e.g. `GREEN`
/// or `BOLD_RED`) onto a decoration.
pub fn color_for_token(name: &str) -> Option<(Color, Style)> {
    match name {
        "RED" => Some((Color::Red, Style::None)),
        "GREEN" => Some((Color::Green, Style::None)),
        "YELLOW" => Some((Color::Yellow, Style::None)),
        "BOLD_RED" => Some((Color::Red, Style::Bold)),
        "BOLD_GREEN" => Some((Color::Green, Style::Bold)),
        "BOLD_YELLOW" => Some((Color::Yellow, Style::Bold)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_attributes_returns_input() {
        assert_eq!(
            decorate("plain", Color::None, Style::None, Background::None),
            "plain"
        );
    }

    #[test]
    fn test_single_color() {
        assert_eq!(
            decorate("hi", Color::Green, Style::None, Background::None),
            "\x1b[32mhi\x1b[0m"
        );
    }

    #[test]
    fn test_joined_codes() {
        assert_eq!(
            decorate("hi", Color::Red, Style::Bold, Background::White),
            "\x1b[31;1;47mhi\x1b[0m"
        );
    }

    #[test]
    fn test_color_does_not_bleed_across_lines() {
        let out = decorate("one\ntwo", Color::Yellow, Style::None, Background::None);
        assert_eq!(out, "\x1b[33mone\x1b[0m\n\x1b[33mtwo\x1b[0m");
    }

    #[test]
    fn test_named_helpers() {
        assert_eq!(green("x"), "\x1b[32mx\x1b[0m");
        assert_eq!(bold_red("x"), "\x1b[31;1mx\x1b[0m");
    }

    #[test]
    fn test_color_for_token() {
        assert_eq!(color_for_token("GREEN"), Some((Color::Green, Style::None)));
        assert_eq!(
            color_for_token("BOLD_YELLOW"),
            Some((Color::Yellow, Style::Bold))
        );
        assert_eq!(color_for_token("MAUVE"), None);
    }
}
