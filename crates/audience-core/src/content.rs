//! Content items delivered through the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;

// ─── Content Kind ─────────────────────────────────────────────────

/// Discriminant of a [`ContentItem`], used by backend availability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Message,
    ActionBar,
    Title,
}

impl ContentKind {
    pub const ALL: [Self; 3] = [Self::Message, Self::ActionBar, Self::Title];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::ActionBar => "action_bar",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Title ────────────────────────────────────────────────────────

/// Fade timings of a title overlay, in host ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Times {
    pub fade_in: i32,
    pub stay: i32,
    pub fade_out: i32,
}

impl Times {
    pub fn new(fade_in: i32, stay: i32, fade_out: i32) -> Self {
        Self {
            fade_in,
            stay,
            fade_out,
        }
    }
}

/// A titled screen overlay. Every part is optional; an all-empty title is
/// valid and produces no packets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Title {
    pub title: Option<Document>,
    pub subtitle: Option<Document>,
    pub action_bar: Option<Document>,
    pub times: Option<Times>,
    pub clear: bool,
    pub reset: bool,
}

impl Title {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<Document>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<Document>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_action_bar(mut self, action_bar: impl Into<Document>) -> Self {
        self.action_bar = Some(action_bar.into());
        self
    }

    #[must_use]
    pub fn with_times(mut self, times: Times) -> Self {
        self.times = Some(times);
        self
    }

    #[must_use]
    pub fn clearing(mut self) -> Self {
        self.clear = true;
        self
    }

    #[must_use]
    pub fn resetting(mut self) -> Self {
        self.reset = true;
        self
    }
}

// ─── Title Action ─────────────────────────────────────────────────

/// Logical title action understood by the host's title packet.
///
/// Each action carries the symbolic constant name it is looked up by and the
/// positional index used when the host does not declare that name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleAction {
    Title,
    Subtitle,
    ActionBar,
    Clear,
    Reset,
}

impl TitleAction {
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Subtitle,
        Self::ActionBar,
        Self::Clear,
        Self::Reset,
    ];

    /// Constant name declared by hosts that expose readable names.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Subtitle => "SUBTITLE",
            Self::ActionBar => "ACTIONBAR",
            Self::Clear => "CLEAR",
            Self::Reset => "RESET",
        }
    }

    /// Position in the declared constant list when the symbol is missing.
    pub fn positional_index(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Subtitle => 1,
            Self::ActionBar => 2,
            Self::Clear => 4,
            Self::Reset => 5,
        }
    }

    /// Whether packets of this action carry a text payload.
    pub fn carries_text(self) -> bool {
        matches!(self, Self::Title | Self::Subtitle | Self::ActionBar)
    }
}

impl fmt::Display for TitleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ─── Content Item ─────────────────────────────────────────────────

/// One unit of content handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Message(Document),
    ActionBar(Document),
    Title(Title),
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Message(_) => ContentKind::Message,
            Self::ActionBar(_) => ContentKind::ActionBar,
            Self::Title(_) => ContentKind::Title,
        }
    }
}
