/// Rendering attributes with priority-based overrides
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// An RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> Result<Self, ViewError> {
        let invalid = || ViewError::InvalidColor(text.to_owned());
        let digits = text.strip_prefix('#').ok_or_else(invalid)?;

        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };

        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = ViewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A stack entry: the color to render with and how strongly it is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attribute {
    pub color: Color,
    pub priority: u32,
}

impl Attribute {
    pub fn new(color: Color, priority: u32) -> Self {
        Self { color, priority }
    }
}

/// Stack of rendering attributes following the transform stack's push/pop
/// discipline.
///
/// A push only changes the resolved color when its priority is at least
/// that of the current top, so a drawable can force a color (a highlight,
/// say) that nested drawables of lower priority will not override. Color
/// changes are flagged and handed to the backend lazily, once, right before
/// the next primitive.
#[derive(Debug, Clone)]
pub struct AttributeStack {
    entries: Vec<Attribute>,
    pending: bool,
}

impl AttributeStack {
    pub fn new() -> Self {
        let mut stack = Self {
            entries: Vec::new(),
            pending: false,
        };
        stack.reset();
        stack
    }

    /// Back to a single black entry of priority 0, flagged for apply.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(Attribute::new(Color::BLACK, 0));
        self.pending = true;
    }

    pub fn push_color(&mut self, color: Color, priority: u32) {
        let attribute = match self.entries.last() {
            Some(top) => {
                let mut attribute = *top;
                if priority >= top.priority {
                    if color != top.color {
                        attribute.color = color;
                        self.pending = true;
                    }
                    attribute.priority = priority;
                }
                attribute
            }
            None => {
                self.pending = true;
                Attribute::new(color, priority)
            }
        };

        self.entries.push(attribute);
    }

    /// Remove the top entry; the last one always stays.
    pub fn pop(&mut self) {
        if self.entries.len() > 1 {
            if let Some(removed) = self.entries.pop() {
                if self.current().color != removed.color {
                    self.pending = true;
                }
            }
        }
    }

    /// The resolved attribute.
    pub fn current(&self) -> Attribute {
        self.entries.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// The resolved color if it changed since it was last taken.
    pub fn take_pending(&mut self) -> Option<Color> {
        if self.pending {
            self.pending = false;
            Some(self.current().color)
        } else {
            None
        }
    }
}

impl Default for AttributeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let mut stack = AttributeStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), Attribute::new(Color::BLACK, 0));
        assert_eq!(stack.take_pending(), Some(Color::BLACK));
        assert_eq!(stack.take_pending(), None);
    }

    #[test]
    fn test_lower_priority_does_not_override() {
        let mut stack = AttributeStack::new();
        stack.push_color(Color::RED, 5);
        stack.push_color(Color::BLUE, 2);

        assert_eq!(stack.current().color, Color::RED);
        assert_eq!(stack.current().priority, 5);
    }

    #[test]
    fn test_equal_priority_overrides() {
        let mut stack = AttributeStack::new();
        stack.push_color(Color::RED, 3);
        stack.push_color(Color::BLUE, 3);
        assert_eq!(stack.current().color, Color::BLUE);
    }

    #[test]
    fn test_apply_is_flagged_once_per_change() {
        let mut stack = AttributeStack::new();
        let _ = stack.take_pending();

        stack.push_color(Color::BLACK, 1);
        assert_eq!(stack.take_pending(), None);

        stack.push_color(Color::GREEN, 1);
        assert_eq!(stack.take_pending(), Some(Color::GREEN));
        assert_eq!(stack.take_pending(), None);

        stack.pop();
        assert_eq!(stack.take_pending(), Some(Color::BLACK));

        stack.pop();
        assert_eq!(stack.take_pending(), None);
    }

    #[test]
    fn test_pop_keeps_last_entry() {
        let mut stack = AttributeStack::new();
        stack.push_color(Color::RED, 0);
        for _ in 0..5 {
            stack.pop();
        }
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current().color, Color::BLACK);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex("#ff8000").ok(), Some(Color::rgb(255, 128, 0)));
        assert_eq!(
            Color::from_hex("#00000080").ok(),
            Some(Color::rgba(0, 0, 0, 128))
        );
        assert!(Color::from_hex("ff8000").is_err());
        assert!(Color::from_hex("#ff80").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }
}
