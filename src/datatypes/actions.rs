//! Keyed actions (vertices) with their display metadata.

use crate::error::{DigraphError, Result};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};
use strum::{Display as StrumDisplay, EnumString, EnumVariantNames};

/// Metadata attached to an action.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMeta {
    /// Long display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short display name.
    #[serde(
        rename = "shortName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub short_name: Option<String>,
    /// Free comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An opaque action identifier together with its [ActionMeta].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    key: String,
    meta: ActionMeta,
}

impl Action {
    /// Action without metadata.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            meta: ActionMeta::default(),
        }
    }

    /// Action with metadata.
    pub fn with_meta(key: impl Into<String>, meta: ActionMeta) -> Self {
        Self {
            key: key.into(),
            meta,
        }
    }

    /// The identifying key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The display metadata.
    pub fn meta(&self) -> &ActionMeta {
        &self.meta
    }

    /// Short name if present, the key otherwise.
    pub fn short_name(&self) -> &str {
        self.meta.short_name.as_deref().unwrap_or(&self.key)
    }
}

/// Orderings which may be imposed on the actions of a container.
#[derive(EnumString, EnumVariantNames, StrumDisplay, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum KeyOrder {
    /// Plain lexicographic order on the keys.
    Lexicographic,
    /// Natural order, i.e. `a2` before `a10`.
    Natural,
}

impl Default for KeyOrder {
    fn default() -> Self {
        Self::Lexicographic
    }
}

/// A container which acts as a dictionary as well as an ordering of actions.
/// The position of an action in the container is the index used by all relation tables and all
/// [choice bitmaps][RoaringBitmap].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContainer {
    actions: Vec<Action>,
    mapping: HashMap<String, usize>,
}

impl ActionContainer {
    /// Creates a container from plain keys, keeping their order.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_actions(keys.into_iter().map(Action::new))
    }

    /// Creates a container from actions, keeping their order.
    /// Fails on duplicate keys.
    pub fn from_actions<I>(actions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Action>,
    {
        let mut result = Self::default();
        for action in actions {
            result.push(action)?;
        }
        Ok(result)
    }

    /// `prefix1 … prefixN`, zero-padded to a common width so that the lexicographic key order is
    /// the numbering order.
    pub fn numbered(prefix: &str, order: usize) -> Self {
        let width = order.to_string().len();
        Self::from_distinct(
            (1..=order)
                .map(|i| Action::new(format!("{prefix}{i:0width$}")))
                .collect(),
        )
    }

    /// The actions at the given positions, in the given order. Positions out of range and
    /// repeated positions are skipped.
    pub fn subset(&self, positions: &[usize]) -> Self {
        let mut seen = RoaringBitmap::new();
        Self::from_distinct(
            positions
                .iter()
                .filter(|&&x| x < self.len() && seen.insert(x as u32))
                .map(|&x| self.actions[x].clone())
                .collect(),
        )
    }

    /// Keys must be pairwise distinct.
    fn from_distinct(actions: Vec<Action>) -> Self {
        let mapping = actions
            .iter()
            .enumerate()
            .map(|(idx, action)| (action.key().to_string(), idx))
            .collect();
        Self { actions, mapping }
    }

    /// Appends an action and returns its position.
    pub fn push(&mut self, action: Action) -> Result<usize> {
        if self.mapping.contains_key(action.key()) {
            return Err(DigraphError::DomainMismatch(format!(
                "duplicate action {}",
                action.key()
            )));
        }
        let idx = self.actions.len();
        self.mapping.insert(action.key().to_string(), idx);
        self.actions.push(action);
        Ok(idx)
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if there is no action.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Position of the action with the given key.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.mapping.get(key).copied()
    }

    /// Position of the action with the given key, failing with [DigraphError::UnknownAction].
    pub fn require(&self, key: &str) -> Result<usize> {
        self.index(key)
            .ok_or_else(|| DigraphError::UnknownAction(key.to_string()))
    }

    /// Returns true if the key names an action of the container.
    pub fn contains(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }

    /// The key at a position.
    ///
    /// # Panics
    /// If the position is out of bounds.
    pub fn key(&self, idx: usize) -> &str {
        self.actions[idx].key()
    }

    /// The action at a position.
    pub fn action(&self, idx: usize) -> Option<&Action> {
        self.actions.get(idx)
    }

    /// Iterates over the actions in container order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter()
    }

    /// Iterates over the keys in container order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.actions.iter().map(Action::key)
    }

    /// The full index range as a bitmap.
    pub fn all(&self) -> RoaringBitmap {
        (0..self.actions.len() as u32).collect()
    }

    /// Resolves a set of keys to a bitmap.
    pub fn choice<'k, I>(&self, keys: I) -> Result<RoaringBitmap>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter()
            .map(|key| self.require(key).map(|idx| idx as u32))
            .collect()
    }

    /// Keys of the actions in a bitmap, in container order.
    pub fn choice_keys(&self, choice: &RoaringBitmap) -> Vec<String> {
        choice
            .iter()
            .filter_map(|idx| self.action(idx as usize))
            .map(|action| action.key().to_string())
            .collect()
    }

    /// Sorts the actions and returns, for every new position, the previous position.
    pub fn sort(&mut self, order: KeyOrder) -> Vec<usize> {
        let mut permutation: Vec<usize> = (0..self.actions.len()).collect();
        permutation.sort_by(|&left, &right| {
            let (left, right) = (self.actions[left].key(), self.actions[right].key());
            match order {
                KeyOrder::Lexicographic => lexical_sort::lexical_cmp(left, right),
                KeyOrder::Natural => lexical_sort::natural_lexical_cmp(left, right),
            }
        });
        let actions = permutation
            .iter()
            .map(|&idx| self.actions[idx].clone())
            .collect::<Vec<_>>();
        self.mapping = actions
            .iter()
            .enumerate()
            .map(|(idx, action)| (action.key().to_string(), idx))
            .collect();
        self.actions = actions;
        log::trace!("sorted actions {:?}", self.keys().collect::<Vec<_>>());
        permutation
    }

    /// For every position of `self`, the position of the same key in `other`.
    /// Fails with [DigraphError::DomainMismatch] if both containers do not hold the same keys.
    pub fn alignment(&self, other: &ActionContainer) -> Result<Vec<usize>> {
        if self.len() != other.len() {
            return Err(DigraphError::DomainMismatch(format!(
                "{} actions against {} actions",
                self.len(),
                other.len()
            )));
        }
        self.keys()
            .map(|key| {
                other.index(key).ok_or_else(|| {
                    DigraphError::DomainMismatch(format!("action {key} is missing"))
                })
            })
            .collect()
    }

    /// Creates a [PrintableChoice] for output purposes.
    pub fn print_choice<'a>(&'a self, choice: &'a RoaringBitmap) -> PrintableChoice<'a> {
        PrintableChoice {
            choice,
            actions: self,
        }
    }
}

/// A struct to print a choice as a set of keys.
#[derive(Debug, Clone, Copy)]
pub struct PrintableChoice<'a> {
    choice: &'a RoaringBitmap,
    actions: &'a ActionContainer,
}

impl Display for PrintableChoice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.actions.choice_keys(self.choice).join(", "))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn container() {
        let mut actions = ActionContainer::from_keys(["a10", "b", "a2"]).unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions.index("b"), Some(1));
        assert_eq!(
            actions.require("c"),
            Err(DigraphError::UnknownAction("c".to_string()))
        );
        assert!(actions.push(Action::new("b")).is_err());

        let permutation = actions.sort(KeyOrder::Natural);
        assert_eq!(actions.keys().collect::<Vec<_>>(), vec!["a2", "a10", "b"]);
        assert_eq!(permutation, vec![2, 0, 1]);
        assert_eq!(actions.index("a10"), Some(1));

        actions.sort(KeyOrder::Lexicographic);
        assert_eq!(actions.keys().collect::<Vec<_>>(), vec!["a10", "a2", "b"]);
    }

    #[test]
    fn choices() {
        let actions = ActionContainer::from_keys(["a", "b", "c"]).unwrap();
        let choice = actions.choice(["c", "a"]).unwrap();
        assert_eq!(actions.choice_keys(&choice), vec!["a", "c"]);
        assert_eq!(format!("{}", actions.print_choice(&choice)), "{a, c}");
        assert!(actions.choice(["d"]).is_err());

        let other = ActionContainer::from_keys(["c", "a", "b"]).unwrap();
        assert_eq!(actions.alignment(&other), Ok(vec![1, 2, 0]));
        let short = ActionContainer::from_keys(["a", "b"]).unwrap();
        assert!(actions.alignment(&short).is_err());
    }

    #[test]
    fn numbered_and_subsets() {
        let actions = ActionContainer::numbered("a", 12);
        assert_eq!(actions.len(), 12);
        assert_eq!(actions.key(0), "a01");
        assert_eq!(actions.index("a12"), Some(11));
        assert_eq!(ActionContainer::numbered("v", 3).key(2), "v3");
        assert!(ActionContainer::numbered("v", 0).is_empty());

        let subset = actions.subset(&[4, 1, 4, 40]);
        assert_eq!(subset.keys().collect::<Vec<_>>(), vec!["a05", "a02"]);
        assert_eq!(subset.index("a02"), Some(1));
        assert_eq!(subset.index("a01"), None);
        let mut subset = subset;
        assert!(subset.push(Action::new("a05")).is_err());
    }
}
