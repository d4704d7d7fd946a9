//! RGB colors parsed from `#RRGGBB` palette entries.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRID: Color = Color::rgb(210, 210, 210);
    pub const TEXT: Color = Color::rgb(40, 40, 40);
    pub const HEADER: Color = Color::rgb(230, 230, 230);
    /// Table cell background for rows over their resolution target
    pub const BREACH: Color = Color::rgb(244, 182, 182);
    /// Table cell background for rows within target
    pub const ON_TARGET: Color = Color::rgb(190, 215, 245);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.trim().strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        Some(Self::rgb(bytes[0], bytes[1], bytes[2]))
    }

    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    /// Components in `0.0..=1.0` for PDF color operators
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}
