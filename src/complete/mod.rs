//! Inline autocomplete and date picking for a plain-text input.
//!
//! Per keystroke, data flows one way: a text change goes through the
//! [`TriggerDetector`], the matching [`Provider`] ranks candidates, and the
//! [`DropdownController`] shows them. A date trigger opens the
//! [`DatePickerController`] instead. [`EditingSession`] owns all of it and
//! is the single entry point for key events.

pub mod date_picker;
pub mod dropdown;
pub mod host;
pub mod index;
pub mod position;
pub mod provider;
pub mod session;
pub mod trigger;

pub use date_picker::{DateNav, DatePicker, DatePickerController, PickerSlot};
pub use dropdown::{DropdownController, DropdownState, HideReason};
pub use host::{Clock, FixedClock, MetadataSource, PlainInput, SystemClock, TextInput};
pub use index::{MAX_CANDIDATES, SearchIndex};
pub use position::{CaretCoords, Placement, Size, Viewport};
pub use provider::{Anchor, Candidate, Catalog, Entity, Provider, Providers, Splice};
pub use session::{EditingSession, KeyOutcome};
pub use trigger::{LinkStyle, Strategy, TriggerDetector, TriggerMatch, TriggerPattern};
