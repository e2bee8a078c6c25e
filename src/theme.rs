use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::syntax::Highlight;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub ui: UiColors,
    pub syntax: SyntaxColors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiColors {
    pub foreground: ThemeColor,
    pub background: ThemeColor,
    pub selection: ThemeColor,
    pub search_match: ThemeColor,
    pub search_match_fg: ThemeColor,
    /// Tildes past the end of the buffer and the welcome line
    pub non_text: ThemeColor,
    /// Drawn reversed
    pub status_bar: ThemeColor,
    pub message: ThemeColor,
}

/// One color per highlight class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxColors {
    pub normal: ThemeColor,
    pub comment: ThemeColor,
    pub ml_comment: ThemeColor,
    pub keyword1: ThemeColor, // control flow, declarations
    pub keyword2: ThemeColor, // type names
    pub string: ThemeColor,
    pub number: ThemeColor,
    pub search_match: ThemeColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    Rgb { r: u8, g: u8, b: u8 },
    /// 256-color palette index
    Indexed(u8),
    Named(String),
}

impl ThemeColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    pub fn to_color(&self) -> Color {
        match self {
            ThemeColor::Rgb { r, g, b } => Color::Rgb(*r, *g, *b),
            ThemeColor::Indexed(i) => Color::Indexed(*i),
            ThemeColor::Named(name) => match name.to_lowercase().as_str() {
                "reset" | "default" => Color::Reset,
                "black" => Color::Black,
                "red" => Color::Red,
                "green" => Color::Green,
                "yellow" => Color::Yellow,
                "blue" => Color::Blue,
                "magenta" => Color::Magenta,
                "cyan" => Color::Cyan,
                "white" => Color::White,
                "gray" | "grey" => Color::Gray,
                "darkgray" | "darkgrey" => Color::DarkGray,
                "lightred" => Color::LightRed,
                "lightgreen" => Color::LightGreen,
                "lightyellow" => Color::LightYellow,
                "lightblue" => Color::LightBlue,
                "lightmagenta" => Color::LightMagenta,
                "lightcyan" => Color::LightCyan,
                _ => {
                    // Try parsing hex color #RRGGBB
                    if name.starts_with('#') && name.len() == 7 {
                        if let (Ok(r), Ok(g), Ok(b)) = (
                            u8::from_str_radix(&name[1..3], 16),
                            u8::from_str_radix(&name[3..5], 16),
                            u8::from_str_radix(&name[5..7], 16),
                        ) {
                            return Color::Rgb(r, g, b);
                        }
                    }
                    Color::Reset
                }
            },
        }
    }
}

impl Theme {
    /// The eight-color terminal palette.
    pub fn classic() -> Self {
        Self {
            name: String::from("classic"),
            ui: UiColors {
                foreground: ThemeColor::named("reset"),
                background: ThemeColor::named("reset"),
                selection: ThemeColor::Indexed(237),
                search_match: ThemeColor::Indexed(226),
                search_match_fg: ThemeColor::named("black"),
                non_text: ThemeColor::named("reset"),
                status_bar: ThemeColor::named("reset"),
                message: ThemeColor::named("reset"),
            },
            syntax: SyntaxColors {
                normal: ThemeColor::named("reset"),
                comment: ThemeColor::named("cyan"),
                ml_comment: ThemeColor::named("cyan"),
                keyword1: ThemeColor::named("yellow"),
                keyword2: ThemeColor::named("green"),
                string: ThemeColor::named("magenta"),
                number: ThemeColor::named("red"),
                search_match: ThemeColor::named("blue"),
            },
        }
    }

    pub fn dark() -> Self {
        Self {
            name: String::from("dark"),
            ui: UiColors {
                foreground: ThemeColor::rgb(212, 212, 212),
                background: ThemeColor::rgb(30, 30, 30),
                selection: ThemeColor::rgb(70, 70, 120),
                search_match: ThemeColor::rgb(150, 120, 0),
                search_match_fg: ThemeColor::rgb(30, 30, 30),
                non_text: ThemeColor::rgb(90, 90, 90),
                status_bar: ThemeColor::rgb(150, 150, 150),
                message: ThemeColor::rgb(212, 212, 212),
            },
            syntax: SyntaxColors {
                normal: ThemeColor::rgb(212, 212, 212),
                comment: ThemeColor::rgb(106, 153, 85),    // Green
                ml_comment: ThemeColor::rgb(106, 153, 85), // Green
                keyword1: ThemeColor::rgb(86, 156, 214),   // Blue
                keyword2: ThemeColor::rgb(78, 201, 176),   // Teal
                string: ThemeColor::rgb(206, 145, 120),    // Orange/brown
                number: ThemeColor::rgb(181, 206, 168),    // Light green
                search_match: ThemeColor::rgb(100, 149, 237),
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dark" => Self::dark(),
            _ => Self::classic(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["classic", "dark"]
    }

    pub fn color_for(&self, hl: Highlight) -> Color {
        let syntax = &self.syntax;
        match hl {
            Highlight::Normal => syntax.normal.to_color(),
            Highlight::Comment => syntax.comment.to_color(),
            Highlight::MlComment => syntax.ml_comment.to_color(),
            Highlight::Keyword1 => syntax.keyword1.to_color(),
            Highlight::Keyword2 => syntax.keyword2.to_color(),
            Highlight::String => syntax.string.to_color(),
            Highlight::Number => syntax.number.to_color(),
            Highlight::Match => syntax.search_match.to_color(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
