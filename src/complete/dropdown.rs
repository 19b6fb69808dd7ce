//! The visible candidate list and its active-item cursor.

use super::index::MAX_CANDIDATES;
use super::provider::Candidate;
use super::trigger::TriggerMatch;

/// Everything the dropdown renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownState {
    pub visible: bool,
    pub items: Vec<Candidate>,
    pub active: usize,
    /// Trigger the items were produced for
    pub trigger: Option<TriggerMatch>,
}

impl DropdownState {
    pub fn active_item(&self) -> Option<&Candidate> {
        if self.visible {
            self.items.get(self.active)
        } else {
            None
        }
    }
}

/// Why the dropdown closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    Empty,
    Escape,
    Selected,
    Blur,
    Destroyed,
    /// The text before the caret no longer matches a dropdown strategy
    NoTrigger,
}

/// Owns [`DropdownState`]: `hidden → showing` on a non-empty list,
/// back to `hidden` on an empty list, Escape, selection, blur or destroy.
#[derive(Debug, Default)]
pub struct DropdownController {
    state: DropdownState,
}

impl DropdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DropdownState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn active_item(&self) -> Option<&Candidate> {
        self.state.active_item()
    }

    pub fn trigger(&self) -> Option<&TriggerMatch> {
        self.state.trigger.as_ref()
    }

    /// Show fresh results for `trigger`, or hide if there are none.
    pub fn update(&mut self, trigger: TriggerMatch, mut items: Vec<Candidate>) {
        if items.is_empty() {
            self.hide(HideReason::Empty);
            return;
        }
        items.truncate(MAX_CANDIDATES);
        if !self.state.visible {
            tracing::debug!(strategy = trigger.strategy.name(), "dropdown shown");
        }
        self.state = DropdownState {
            visible: true,
            items,
            active: 0,
            trigger: Some(trigger),
        };
    }

    /// Move the cursor down, wrapping from the last item to the first.
    pub fn next(&mut self) {
        let len = self.state.items.len();
        if self.state.visible && len > 0 {
            self.state.active = (self.state.active + 1) % len;
        }
    }

    /// Move the cursor up, wrapping from the first item to the last.
    pub fn prev(&mut self) {
        let len = self.state.items.len();
        if self.state.visible && len > 0 {
            self.state.active = if self.state.active == 0 {
                len - 1
            } else {
                self.state.active - 1
            };
        }
    }

    /// Take the active candidate and its trigger, closing the dropdown.
    pub fn take_selection(&mut self) -> Option<(Candidate, TriggerMatch)> {
        let candidate = self.state.active_item()?.clone();
        let trigger = self.state.trigger.clone()?;
        self.hide(HideReason::Selected);
        Some((candidate, trigger))
    }

    pub fn hide(&mut self, reason: HideReason) {
        if self.state.visible {
            tracing::debug!(?reason, "dropdown hidden");
        }
        self.state = DropdownState::default();
    }
}
