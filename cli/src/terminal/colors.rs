use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const TOOL_OUTPUT: Color = Color::TrueColor {
    r: 190,
    g: 190,
    b: 190,
};
pub const CREDENTIAL: Color = Color::BrightYellow;
pub const HOSTNAME: Color = Color::BrightMagenta;
