/// What a reported history entry did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavigationChange {
    /// A new entry; anything after the cursor is dropped.
    Pushed,
    /// An entry already on the stack (reload, back, forward, cache restore).
    Revisited,
}

/// Session history of the main window, tracked by entry key.
///
/// The bridge script stamps every backend history entry with a random key in
/// `history.state` and reports it on load, cache restore and same-document
/// navigation. `history.state` survives reloads and traversal, so a known key
/// means the webview moved to an existing entry and an unknown key means it
/// created one. URLs are never compared.
#[derive(Debug, Default)]
pub(crate) struct NavigationHistory {
    entries: Vec<String>,
    index: usize,
}

impl NavigationHistory {
    /// Forgets every entry. Called when the window is pointed at the backend.
    pub(crate) fn reset(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    pub(crate) fn position(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.index)
    }

    pub(crate) fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub(crate) fn record_entry(&mut self, key: &str) -> NavigationChange {
        if let Some(index) = self.entries.iter().position(|entry| entry == key) {
            self.index = index;
            return NavigationChange::Revisited;
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(key.to_string());
        self.index = self.entries.len() - 1;
        NavigationChange::Pushed
    }
}
