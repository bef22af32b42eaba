//! Dialogue-act data model.
//!
//! A dialogue act is an unordered set of (intent, slot, value) triples; its
//! identity is the triple set. Instances are immutable once parsed. The text
//! form mirrors the corpus surface syntax:
//!
//! ```text
//! inform(name=Golden_Dragon,food=chinese)&request(area=?)
//! ```
//!
//! A `?` value (or a bare slot with no `=`) is the wildcard; a slot-less
//! intent is written `bye()`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of one dialogue-act slot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotValue {
    /// Wildcard: any value satisfies the slot.
    Any,
    /// A concrete slot value.
    Value(String),
}

impl SlotValue {
    /// True if `lemma` satisfies this value (wildcards match everything).
    #[must_use]
    pub fn matches(&self, lemma: &str) -> bool {
        match self {
            SlotValue::Any => true,
            SlotValue::Value(v) => v == lemma,
        }
    }
}

/// One (intent, slot, value) triple.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DaItem {
    pub intent: String,
    /// Slot name; empty for slot-less intents such as `bye()`.
    pub slot: String,
    pub value: SlotValue,
}

impl DaItem {
    pub fn new(
        intent: impl Into<String>,
        slot: impl Into<String>,
        value: SlotValue,
    ) -> Self {
        Self {
            intent: intent.into(),
            slot: slot.into(),
            value,
        }
    }

    /// True if a node with this lemma realizes the item.
    ///
    /// Concrete values are covered by their own lemma; wildcard items are
    /// covered by a lemma equal to the slot name (or the intent for
    /// slot-less items).
    #[must_use]
    pub fn is_covered_by(&self, lemma: &str) -> bool {
        match &self.value {
            SlotValue::Value(v) => v == lemma,
            SlotValue::Any => {
                if self.slot.is_empty() {
                    self.intent == lemma
                } else {
                    self.slot == lemma
                }
            }
        }
    }
}

impl fmt::Display for DaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.slot.is_empty(), &self.value) {
            (true, _) => write!(f, "{}()", self.intent),
            (false, SlotValue::Any) => write!(f, "{}({}=?)", self.intent, self.slot),
            (false, SlotValue::Value(v)) => write!(f, "{}({}={})", self.intent, self.slot, v),
        }
    }
}

/// An unordered, deduplicated set of dialogue-act items.
///
/// Stored sorted so that equality, hashing and [`DialogueAct::signature`]
/// are canonical regardless of input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogueAct {
    items: Vec<DaItem>,
}

impl DialogueAct {
    /// Build a dialogue act from items, sorting and deduplicating.
    #[must_use]
    pub fn new(mut items: Vec<DaItem>) -> Self {
        items.sort();
        items.dedup();
        Self { items }
    }

    /// Parse the textual form, e.g. `inform(name=X,food=?)&bye()`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::DataMismatch("empty dialogue act".to_string()));
        }
        let mut items = Vec::new();
        for part in text.split('&') {
            let part = part.trim();
            let open = part.find('(').ok_or_else(|| {
                Error::DataMismatch(format!("missing '(' in dialogue act item: {part}"))
            })?;
            if !part.ends_with(')') {
                return Err(Error::DataMismatch(format!(
                    "missing ')' in dialogue act item: {part}"
                )));
            }
            let intent = &part[..open];
            if intent.is_empty() {
                return Err(Error::DataMismatch(format!(
                    "empty intent in dialogue act item: {part}"
                )));
            }
            let body = &part[open + 1..part.len() - 1];
            if body.is_empty() {
                items.push(DaItem::new(intent, "", SlotValue::Any));
                continue;
            }
            for pair in body.split(',') {
                let pair = pair.trim();
                let (slot, value) = match pair.split_once('=') {
                    Some((s, "?")) => (s, SlotValue::Any),
                    Some((s, v)) => (s, SlotValue::Value(v.to_string())),
                    None => (pair, SlotValue::Any),
                };
                if slot.is_empty() {
                    return Err(Error::DataMismatch(format!(
                        "empty slot name in dialogue act item: {part}"
                    )));
                }
                items.push(DaItem::new(intent, slot, value));
            }
        }
        Ok(Self::new(items))
    }

    #[must_use]
    pub fn items(&self) -> &[DaItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Canonical string form, used as the candidate generator's context key.
    #[must_use]
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// True if any item is realized by `lemma`.
    #[must_use]
    pub fn mentions_lemma(&self, lemma: &str) -> bool {
        self.items.iter().any(|it| it.is_covered_by(lemma))
    }

    /// Residual act after a node with `lemma` is added: drops every item
    /// the lemma covers.
    #[must_use]
    pub fn remove_covered(&self, lemma: &str) -> DialogueAct {
        DialogueAct {
            items: self
                .items
                .iter()
                .filter(|it| !it.is_covered_by(lemma))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for DialogueAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
