use std::collections::HashSet;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::model::Item;

/// Picks an item's identity: the explicit guid/id when non-empty, else its
/// resolved link. `None` means the item cannot be identified.
pub(crate) fn resolve_identity(explicit_id: &str, link: &str) -> Option<String> {
    [explicit_id, link]
        .into_iter()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

/// Accumulates items for one parse call, dropping repeated identities.
///
/// The `seen` set lives only as long as the parse; it is not part of the
/// returned feed.
#[derive(Debug, Default)]
pub(crate) struct ItemCollector {
    items: Vec<Item>,
    seen: HashSet<String>,
}

impl ItemCollector {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Resolves an identity for an item about to be built.
    ///
    /// Returns `None` when the item must be skipped: either it has no identity
    /// (reported as [`Diagnostic::ItemSkipped`]) or the identity was already
    /// collected (dropped silently).
    pub(crate) fn admit(
        &self,
        explicit_id: &str,
        link: &str,
        title: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let Some(id) = resolve_identity(explicit_id, link) else {
            diagnostics.push(Diagnostic::ItemSkipped {
                title: title.to_string(),
            });
            return None;
        };

        if self.seen.contains(&id) {
            tracing::trace!(id = %id, "Dropping duplicate item");
            return None;
        }
        Some(id)
    }

    /// Adds an item whose identity came from [`admit`](Self::admit).
    pub(crate) fn push(&mut self, item: Item) {
        if self.seen.insert(item.id.clone()) {
            self.items.push(item);
        }
    }

    pub(crate) fn into_items(self) -> Vec<Item> {
        self.items
    }
}
