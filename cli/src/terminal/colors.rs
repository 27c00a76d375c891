use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const PRICE: Color = Color::BrightCyan;
pub const LINK: Color = Color::Blue;
pub const FAILURE: Color = Color::Red;
