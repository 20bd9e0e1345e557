//! Placeholder tokens and their values.
//!
//! A [`PlaceholderTable`] maps token names (the text between `{{` and `}}` in
//! the template) to either replacement text or a media file that the layout
//! engine embeds.
pub mod csi;
pub mod formatter;
pub mod keys;
pub mod ledger;
pub mod metric;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::TokenConfig;
use keys::TokenKind;

pub use formatter::{CompanyContext, Formatter};

/// Value bound to one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderValue {
    Text(String),
    /// Image or logo file to embed in place of a picture placeholder
    Media(PathBuf),
}

impl PlaceholderValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Media(_) => None,
        }
    }

    pub fn as_media(&self) -> Option<&Path> {
        match self {
            Self::Media(p) => Some(p),
            Self::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Media(p) => p.as_os_str().is_empty(),
        }
    }
}

/// Token name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderTable {
    values: BTreeMap<String, PlaceholderValue>,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PlaceholderValue) {
        self.values.insert(key.into(), value);
    }

    pub fn insert_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.insert(key, PlaceholderValue::Text(text.into()));
    }

    pub fn insert_media(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        self.insert(key, PlaceholderValue::Media(path.into()));
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&PlaceholderValue> {
        self.values.get(key)
    }

    /// Text bound to `key`; `None` for media and unknown keys.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PlaceholderValue::as_text)
    }

    pub fn media(&self, key: &str) -> Option<&Path> {
        self.get(key).and_then(PlaceholderValue::as_media)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlaceholderValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Give every expected token that is missing or empty its sentinel.
    ///
    /// Returns how many tokens were filled.
    pub fn backfill(&mut self, tokens: &TokenConfig) -> usize {
        let mut filled = 0;
        for (key, kind) in keys::expected() {
            if self.get(&key).is_some_and(|v| !v.is_empty()) {
                continue;
            }
            let sentinel = match kind {
                TokenKind::Text => &tokens.text_placeholder,
                TokenKind::Image => &tokens.image_placeholder,
                TokenKind::Logo => &tokens.logo_placeholder,
            };
            self.insert_text(key, sentinel.clone());
            filled += 1;
        }
        debug!(filled, "backfilled placeholder tokens");
        filled
    }
}
