//! Keystroke-intent and compile-trigger classification.
//!
//! Both classifiers are pure functions of the raw observation. The click
//! classifier is heuristic by design: label vocabulary matching accepts
//! false positives and false negatives as a trade-off, so it sits behind
//! the [`CompileTrigger`] trait where an alternative predicate can be
//! swapped in without touching the store or summarizer.

use serde::{Deserialize, Serialize};

use crate::event::KeyMeta;

/// Which modifier key plays the "primary control" role for shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Command-key platforms: the primary modifier is `metaKey`.
    Mac,
    /// Everything else: the primary modifier is `ctrl`.
    Other,
}

/// A raw key-press observation from the capture boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    pub key: String,
    pub code: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    fn primary(&self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.meta_key,
            Platform::Other => self.ctrl,
        }
    }
}

/// Classifies a key press into a semantic intent.
///
/// Rules, first match wins:
/// - undo: primary + `z`, without shift
/// - redo: primary + `y`, or primary + shift + `z`
/// - compile: primary + `Enter`
#[must_use]
pub fn classify_shortcut(press: &KeyPress, platform: Platform) -> Option<KeyMeta> {
    if !press.primary(platform) {
        return None;
    }
    let key = press.key.to_lowercase();
    if key == "z" && !press.shift {
        return Some(KeyMeta::Undo);
    }
    if key == "y" || (key == "z" && press.shift) {
        return Some(KeyMeta::Redo);
    }
    if press.key == "Enter" {
        return Some(KeyMeta::Compile);
    }
    None
}

/// Predicate deciding whether a clicked control label is a build trigger.
pub trait CompileTrigger {
    fn matches(&self, label: &str) -> bool;
}

/// Default trigger vocabulary: case-insensitive substring match on
/// `run | compile | execute | build`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildVocabulary;

const BUILD_WORDS: [&str; 4] = ["run", "compile", "execute", "build"];

impl CompileTrigger for BuildVocabulary {
    fn matches(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        BUILD_WORDS.iter().any(|word| label.contains(word))
    }
}
