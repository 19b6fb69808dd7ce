//! One editing session: wires the detector, providers and both controllers
//! to a text input, and routes its key events.

use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::date_picker::{DateNav, DatePicker, DatePickerController, date_token, parse_typed_date};
use super::dropdown::{DropdownController, DropdownState, HideReason};
use super::host::{Clock, MetadataSource, SystemClock, TextInput};
use super::provider::{Anchor, Catalog, Providers, Splice};
use super::trigger::{Strategy, TriggerDetector, TriggerMatch};
use crate::model::CompletionConfig;

/// What the host should do with a key after the session saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Handled here; the host must not act on it.
    Consumed,
    /// Not ours: run default editing and the external key handlers.
    Forward,
    /// An input method is composing; nothing runs until it ends.
    Composing,
    /// The session was destroyed and no longer listens.
    Detached,
}

pub struct EditingSession {
    config: CompletionConfig,
    detector: TriggerDetector,
    providers: Providers,
    catalog: Rc<Catalog>,
    dropdown: DropdownController,
    picker: DatePickerController,
    clock: Box<dyn Clock>,
    attached: bool,
}

impl EditingSession {
    /// Snapshot the metadata and attach to a note. `current_file` is the
    /// vault-relative path of the note being edited, if it has one.
    pub fn start(
        metadata: &dyn MetadataSource,
        config: CompletionConfig,
        current_file: Option<&str>,
    ) -> Self {
        let catalog = Rc::new(Catalog::snapshot(metadata, current_file));
        EditingSession {
            detector: TriggerDetector::new(&config),
            providers: Providers::new(Rc::clone(&catalog), &config),
            catalog,
            dropdown: DropdownController::new(),
            picker: DatePickerController::new(config.first_day_of_week),
            clock: Box::new(SystemClock),
            attached: true,
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dropdown(&self) -> &DropdownState {
        self.dropdown.state()
    }

    pub fn date_picker(&self) -> Option<&DatePicker> {
        self.picker.picker()
    }

    pub fn picker_controller(&self) -> &DatePickerController {
        &self.picker
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Which strategy currently owns the input, if any.
    pub fn active_strategy(&self) -> Option<Strategy> {
        if self.picker.is_visible() {
            Some(Strategy::Date)
        } else {
            self.dropdown.trigger().map(|t| t.strategy)
        }
    }

    /// React to a text or caret change. The input already reflects it.
    pub fn on_text_change(&mut self, input: &dyn TextInput) {
        if !self.attached {
            return;
        }
        self.picker.flush_cleanup();
        if input.is_composing() {
            return;
        }

        match self
            .detector
            .detect(input.text_before_caret(), input.text_after_caret())
        {
            Some(m) if m.strategy == Strategy::Date => {
                self.dropdown.hide(HideReason::NoTrigger);
                // A later trigger takes over from a picker anchored earlier
                let moved = self.picker.picker().is_some_and(|p| p.trigger != m.range);
                if moved {
                    self.picker.destroy();
                }
                if !self.picker.is_visible() {
                    self.picker.open(m.range, self.clock.today());
                }
                self.picker.reposition(input.caret_coords(), input.viewport());
            }
            Some(m) => {
                if self.picker.destroy().is_some() {
                    tracing::debug!(strategy = m.strategy.name(), "date picker replaced");
                }
                let items = self
                    .providers
                    .get(m.strategy)
                    .map(|p| p.search(&m))
                    .unwrap_or_default();
                self.dropdown.update(m, items);
            }
            None => {
                self.dropdown.hide(HideReason::NoTrigger);
                self.follow_picker(input);
            }
        }
    }

    /// Keep a visible picker in sync with text typed after its trigger, or
    /// drop it once the trigger is gone or the caret left it.
    fn follow_picker(&mut self, input: &dyn TextInput) {
        let Some(picker) = self.picker.picker() else {
            return;
        };
        let trigger = picker.trigger.clone();
        let text = input.text();
        let caret = input.caret();
        let fragment = text.get(trigger.end..caret);
        let intact = text.get(trigger.clone()) == Some(self.config.date_trigger.as_str());

        match fragment {
            Some(fragment) if intact && !fragment.contains('\n') => {
                if let Some(date) = parse_typed_date(fragment, &self.config) {
                    self.picker.select(date);
                }
                self.picker.reposition(input.caret_coords(), input.viewport());
            }
            _ => {
                self.picker.destroy();
            }
        }
    }

    /// Route a key press. Priority: anchor shortcut on a link candidate,
    /// then the date picker, then the dropdown, then the host.
    pub fn handle_key(&mut self, input: &mut dyn TextInput, key: KeyEvent) -> KeyOutcome {
        if !self.attached {
            return KeyOutcome::Detached;
        }
        self.picker.flush_cleanup();
        if input.is_composing() {
            return KeyOutcome::Composing;
        }

        if let Some(outcome) = self.handle_anchor(input, key) {
            return outcome;
        }
        if self.picker.is_visible() {
            return self.handle_picker_key(input, key);
        }
        if self.dropdown.is_visible() {
            return self.handle_dropdown_key(input, key);
        }
        KeyOutcome::Forward
    }

    fn handle_anchor(&mut self, input: &mut dyn TextInput, key: KeyEvent) -> Option<KeyOutcome> {
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        if !(key.modifiers - KeyModifiers::SHIFT).is_empty() {
            return None;
        }
        let anchor = Anchor::from_char(c)?;
        let trigger = self.dropdown.trigger().filter(|t| t.strategy.is_link())?;
        let candidate = self.dropdown.active_item()?;
        let splice = self.providers.get(trigger.strategy)?.anchor_splice(
            candidate,
            trigger,
            &self.config,
            anchor,
        )?;

        self.dropdown.hide(HideReason::Selected);
        splice.apply(input);
        // Reopen on the heading or block list of the chosen target
        self.on_text_change(input);
        Some(KeyOutcome::Consumed)
    }

    fn handle_picker_key(&mut self, input: &mut dyn TextInput, key: KeyEvent) -> KeyOutcome {
        let nav = match key.code {
            KeyCode::Left => Some(DateNav::Left),
            KeyCode::Right => Some(DateNav::Right),
            KeyCode::Up => Some(DateNav::Up),
            KeyCode::Down => Some(DateNav::Down),
            _ => None,
        };
        if let Some(nav) = nav {
            self.picker.navigate(nav);
            return KeyOutcome::Consumed;
        }

        match key.code {
            KeyCode::Enter => {
                if let Some((trigger, date)) = self.picker.confirm() {
                    // Typed text after the trigger is replaced too
                    let end = input.caret().max(trigger.end);
                    let text = date_token(date, &self.config);
                    tracing::debug!(%date, "date confirmed");
                    Splice {
                        range: trigger.start..end,
                        caret: text.len(),
                        text,
                    }
                    .apply(input);
                }
                KeyOutcome::Consumed
            }
            KeyCode::Esc => {
                self.picker.destroy();
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::Forward,
        }
    }

    fn handle_dropdown_key(&mut self, input: &mut dyn TextInput, key: KeyEvent) -> KeyOutcome {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.dropdown.prev();
                KeyOutcome::Consumed
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.dropdown.next();
                KeyOutcome::Consumed
            }
            (_, KeyCode::Enter) | (KeyModifiers::NONE, KeyCode::Tab) => {
                self.accept(input);
                KeyOutcome::Consumed
            }
            (_, KeyCode::Esc) => {
                self.dropdown.hide(HideReason::Escape);
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::Forward,
        }
    }

    /// Splice the active dropdown candidate into the input.
    pub fn accept(&mut self, input: &mut dyn TextInput) -> bool {
        let Some((candidate, trigger)) = self.dropdown.take_selection() else {
            return false;
        };
        let Some(provider) = self.providers.get(trigger.strategy) else {
            return false;
        };
        let splice = provider.splice(&candidate, &trigger, &self.config);
        tracing::debug!(
            strategy = trigger.strategy.name(),
            label = %candidate.label,
            "candidate accepted"
        );
        splice.apply(input);
        true
    }

    /// The splice accepting dropdown item `index` would apply, without
    /// applying it.
    pub fn splice_for(&self, index: usize) -> Option<Splice> {
        let state = self.dropdown.state();
        let trigger = state.trigger.as_ref()?;
        let candidate = state.items.get(index)?;
        let provider = self.providers.get(trigger.strategy)?;
        Some(provider.splice(candidate, trigger, &self.config))
    }

    /// Input lost focus: close both controllers.
    pub fn blur(&mut self) {
        self.dropdown.hide(HideReason::Blur);
        self.picker.destroy();
    }

    /// Tear the session down. Returns the live picker, if any, so the host
    /// can remove its widget. Later calls and events are no-ops.
    pub fn destroy(&mut self) -> Option<DatePicker> {
        if !self.attached {
            return None;
        }
        self.attached = false;
        self.dropdown.hide(HideReason::Destroyed);
        let picker = self.picker.destroy();
        tracing::debug!(had_picker = picker.is_some(), "editing session destroyed");
        picker
    }

    /// Run the deferred cleanup of a destroyed picker now.
    pub fn flush_cleanup(&mut self) {
        self.picker.flush_cleanup();
    }

    /// Current trigger of the dropdown, for hosts that render a hint.
    pub fn trigger(&self) -> Option<&TriggerMatch> {
        self.dropdown.trigger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::host::{FixedClock, PlainInput};
    use crate::model::{Note, NoteSet};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn session() -> EditingSession {
        let notes = NoteSet::new(vec![
            Note {
                path: "Meeting.md".into(),
                tags: vec!["project".into(), "personal".into()],
                headings: vec![crate::model::HeadingRef {
                    text: "Agenda".into(),
                    level: 2,
                }],
                ..Default::default()
            },
            Note {
                path: "Journal.md".into(),
                ..Default::default()
            },
        ]);
        EditingSession::start(&notes, CompletionConfig::default(), Some("Journal.md"))
            .with_clock(FixedClock(today()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(s: &mut EditingSession, input: &mut PlainInput, text: &str) {
        for c in text.chars() {
            let outcome = s.handle_key(input, key(KeyCode::Char(c)));
            if outcome == KeyOutcome::Forward {
                input.type_str(&c.to_string());
                s.on_text_change(input);
            }
        }
    }

    #[test]
    fn test_forward_without_active_strategy() {
        let mut s = session();
        let mut input = PlainInput::new("plain");
        s.on_text_change(&input);
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Enter)), KeyOutcome::Forward);
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Esc)), KeyOutcome::Forward);
    }

    #[test]
    fn test_dropdown_owns_enter_and_escape() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "#p");
        assert!(s.dropdown().visible);
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Esc)), KeyOutcome::Consumed);
        assert!(!s.dropdown().visible);
        // Hidden again: Escape goes to the host
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Esc)), KeyOutcome::Forward);
        // Typing re-shows
        typed(&mut s, &mut input, "e");
        assert!(s.dropdown().visible);
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Enter)), KeyOutcome::Consumed);
        assert_eq!(input.text(), "#personal");
    }

    #[test]
    fn test_tab_accepts_active_after_navigation() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "x #");
        assert_eq!(s.dropdown().items.len(), 2);
        s.handle_key(&mut input, key(KeyCode::Up));
        assert_eq!(s.dropdown().active, 1);
        s.handle_key(&mut input, key(KeyCode::Tab));
        assert_eq!(input.text(), "x #personal");
        assert_eq!(input.caret(), input.text().len());
        assert_eq!(s.active_strategy(), None);
    }

    #[test]
    fn test_splice_for_previews_without_hiding() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "#pro");
        let splice = s.splice_for(0).unwrap();
        assert_eq!(splice.range, 0..4);
        assert_eq!(splice.text, "#project");
        assert!(s.dropdown().visible);
        assert_eq!(s.splice_for(5), None);
    }

    #[test]
    fn test_anchor_shortcut_opens_heading_list() {
        let mut s = session();
        let mut input = PlainInput::with_caret("[[mee", "]]");
        s.on_text_change(&input);
        assert!(s.dropdown().visible);
        let outcome = s.handle_key(&mut input, key(KeyCode::Char('#')));
        assert_eq!(outcome, KeyOutcome::Consumed);
        assert_eq!(input.text(), "[[Meeting#]]");
        assert_eq!(input.text_before_caret(), "[[Meeting#");
        assert_eq!(
            s.active_strategy(),
            Some(Strategy::HeadingLink(crate::complete::LinkStyle::Wiki))
        );
        assert_eq!(s.dropdown().items[0].label, "## Agenda");

        s.handle_key(&mut input, key(KeyCode::Enter));
        assert_eq!(input.text(), "[[Meeting#Agenda]]");
        assert_eq!(input.caret(), input.text().len());
    }

    #[test]
    fn test_anchor_char_types_normally_without_link_dropdown() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "a #");
        assert_eq!(input.text(), "a #");
    }

    #[test]
    fn test_date_picker_consumes_navigation() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "Due @");
        assert!(s.date_picker().is_some());
        for code in [KeyCode::Right, KeyCode::Left, KeyCode::Up, KeyCode::Down] {
            assert_eq!(s.handle_key(&mut input, key(code)), KeyOutcome::Consumed);
        }
        assert_eq!(s.date_picker().unwrap().selected, Some(today()));
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Esc)), KeyOutcome::Consumed);
        assert!(s.date_picker().is_none());
        assert_eq!(input.text(), "Due @");
    }

    #[test]
    fn test_typed_date_is_selected_and_replaced() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "Due @2026-11-02");
        let picker = s.date_picker().unwrap();
        assert_eq!(picker.selected, NaiveDate::from_ymd_opt(2026, 11, 2));
        s.handle_key(&mut input, key(KeyCode::Enter));
        assert_eq!(input.text(), "Due @{2026-11-02}");
    }

    #[test]
    fn test_mismatched_formats_do_not_break_session() {
        let source: std::collections::HashMap<String, String> = [
            ("date-format", "%Y-%m-%d %H:%M"),
            ("time-format", "%Y %H:%M"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = CompletionConfig::resolve(&source);
        let mut s = EditingSession::start(&NoteSet::default(), config, None)
            .with_clock(FixedClock(today()));

        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "Meeting @@09");
        assert_eq!(s.dropdown().items[0].label, "09:00");

        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "Meeting @");
        s.handle_key(&mut input, key(KeyCode::Enter));
        assert_eq!(input.text(), "Meeting @{2026-10-18}");
    }

    #[test]
    fn test_later_date_trigger_moves_picker() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "Due @");
        assert_eq!(s.date_picker().unwrap().trigger, 4..5);
        typed(&mut s, &mut input, " then ask Bob @");
        assert_eq!(s.date_picker().unwrap().trigger, 19..20);

        s.handle_key(&mut input, key(KeyCode::Enter));
        assert_eq!(input.text(), "Due @ then ask Bob @{2026-10-18}");
        assert!(s.date_picker().is_none());
    }

    #[test]
    fn test_switching_to_time_replaces_picker() {
        let mut s = session();
        let mut input = PlainInput::new("");
        typed(&mut s, &mut input, "call @");
        assert_eq!(s.active_strategy(), Some(Strategy::Date));
        typed(&mut s, &mut input, "@");
        assert_eq!(s.active_strategy(), Some(Strategy::Time));
        assert!(s.date_picker().is_none());
        assert!(s.picker_controller().is_pending_cleanup());
    }

    #[test]
    fn test_picker_closes_when_trigger_deleted() {
        let mut s = session();
        let mut input = PlainInput::new("Due @");
        s.on_text_change(&input);
        assert!(s.date_picker().is_some());
        input.replace_range(4..5, "");
        input.set_caret(4);
        s.on_text_change(&input);
        assert!(s.date_picker().is_none());
    }

    #[test]
    fn test_composition_suppresses_everything() {
        let mut s = session();
        let mut input = PlainInput::new("#");
        s.on_text_change(&input);
        input.composing = true;
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Enter)), KeyOutcome::Composing);
        assert_eq!(input.text(), "#");
    }

    #[test]
    fn test_blur_closes_controllers() {
        let mut s = session();
        let mut input = PlainInput::new("x @");
        s.on_text_change(&input);
        s.blur();
        assert!(s.date_picker().is_none());
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Enter)), KeyOutcome::Forward);
    }

    #[test]
    fn test_destroy_detaches() {
        let mut s = session();
        let mut input = PlainInput::new("x @");
        s.on_text_change(&input);
        assert!(s.destroy().is_some());
        assert!(s.destroy().is_none());
        assert!(!s.is_attached());
        assert_eq!(s.handle_key(&mut input, key(KeyCode::Enter)), KeyOutcome::Detached);
        input.type_str(" @");
        s.on_text_change(&input);
        assert!(s.date_picker().is_none());
        assert!(!s.dropdown().visible);
    }
}
