//! Minimal styled-text document and the serializer contract consumed by
//! the delivery backends.
//!
//! Richer document models plug in by implementing [`ContentSerializer`];
//! the pipeline only ever sees the two serialized string forms.

use serde_json::{Map, Value};

/// Prefix character of legacy formatting codes.
pub const LEGACY_SECTION: char = '\u{a7}';

// ─── Color ────────────────────────────────────────────────────────

/// Named text colors with their legacy code characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl Color {
    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkAqua => "dark_aqua",
            Self::DarkRed => "dark_red",
            Self::DarkPurple => "dark_purple",
            Self::Gold => "gold",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::LightPurple => "light_purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }

    pub fn legacy_code(self) -> char {
        match self {
            Self::Black => '0',
            Self::DarkBlue => '1',
            Self::DarkGreen => '2',
            Self::DarkAqua => '3',
            Self::DarkRed => '4',
            Self::DarkPurple => '5',
            Self::Gold => '6',
            Self::Gray => '7',
            Self::DarkGray => '8',
            Self::Blue => '9',
            Self::Green => 'a',
            Self::Aqua => 'b',
            Self::Red => 'c',
            Self::LightPurple => 'd',
            Self::Yellow => 'e',
            Self::White => 'f',
        }
    }
}

// ─── Document ─────────────────────────────────────────────────────

/// A styled text node with children. Children inherit unset style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub color: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub children: Vec<Document>,
}

impl Document {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    #[must_use]
    pub fn underlined(mut self) -> Self {
        self.underlined = true;
        self
    }

    #[must_use]
    pub fn append(mut self, child: Document) -> Self {
        self.children.push(child);
        self
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("text".to_owned(), Value::String(self.text.clone()));
        if let Some(color) = self.color {
            map.insert("color".to_owned(), Value::String(color.name().to_owned()));
        }
        if self.bold {
            map.insert("bold".to_owned(), Value::Bool(true));
        }
        if self.italic {
            map.insert("italic".to_owned(), Value::Bool(true));
        }
        if self.underlined {
            map.insert("underlined".to_owned(), Value::Bool(true));
        }
        if !self.children.is_empty() {
            let extra = self.children.iter().map(Document::to_json).collect();
            map.insert("extra".to_owned(), Value::Array(extra));
        }
        Value::Object(map)
    }

    fn write_legacy(&self, inherited: Style, out: &mut String) {
        let style = Style {
            color: self.color.or(inherited.color),
            bold: self.bold || inherited.bold,
            italic: self.italic || inherited.italic,
            underlined: self.underlined || inherited.underlined,
        };
        if !self.text.is_empty() {
            style.write_codes(out);
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.write_legacy(style, out);
        }
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    color: Option<Color>,
    bold: bool,
    italic: bool,
    underlined: bool,
}

impl Style {
    fn write_codes(self, out: &mut String) {
        // A color code resets formatting on the client, so it goes first.
        if let Some(color) = self.color {
            out.push(LEGACY_SECTION);
            out.push(color.legacy_code());
        }
        for (enabled, code) in [(self.bold, 'l'), (self.italic, 'o'), (self.underlined, 'n')] {
            if enabled {
                out.push(LEGACY_SECTION);
                out.push(code);
            }
        }
    }
}

// ─── Serializer ───────────────────────────────────────────────────

/// The two serialized forms the delivery backends consume.
pub trait ContentSerializer: Send + Sync {
    /// Structured wire text handed to the host's text deserializer.
    fn to_wire_format(&self, document: &Document) -> String;

    /// Flat text with inline legacy codes, for plain-text sinks.
    fn to_legacy_format(&self, document: &Document) -> String;
}

/// JSON wire text and `§`-coded legacy text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSerializer;

impl ContentSerializer for StandardSerializer {
    fn to_wire_format(&self, document: &Document) -> String {
        document.to_json().to_string()
    }

    fn to_legacy_format(&self, document: &Document) -> String {
        let mut out = String::new();
        document.write_legacy(Style::default(), &mut out);
        out
    }
}
