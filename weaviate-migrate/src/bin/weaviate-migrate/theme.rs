use colored::Color;

/// Colors for status lines, tables and delta markers
pub struct Theme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub primary: Color,
    pub key: Color,
    pub value: Color,
    pub added: Color,
    pub removed: Color,
    pub modified: Color,
}

pub const THEME: Theme = Theme {
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    highlight: Color::Cyan,
    muted: Color::BrightBlack,
    primary: Color::BrightBlue,
    key: Color::BrightCyan,
    value: Color::White,
    added: Color::Green,
    removed: Color::Red,
    modified: Color::Yellow,
};

pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
    pub loading: &'static str,
    pub plus: &'static str,
    pub minus: &'static str,
    pub changed: &'static str,
    pub skipped: &'static str,
    pub file: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    bullet: "•",
    loading: "⟳",
    plus: "+",
    minus: "-",
    changed: "~",
    skipped: "·",
    file: "📄",
};
