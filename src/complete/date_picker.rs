//! Calendar widget state with its own keyboard navigation.

use std::ops::Range;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::position::{CaretCoords, Placement, Size, Viewport, place};
use crate::model::{CompletionConfig, WeekStart};

/// Footprint of the rendered calendar: 7 columns of 3 cells plus borders,
/// a title, a weekday header and up to six weeks.
pub const PICKER_SIZE: Size = Size {
    width: 23,
    height: 10,
};

/// Arrow-key movement inside the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateNav {
    Left,
    Right,
    Up,
    Down,
}

/// One live picker, anchored at a date trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePicker {
    /// Byte range of the date trigger in the text
    pub trigger: Range<usize>,
    /// Explicitly chosen date, by arrow keys or by typing
    pub selected: Option<NaiveDate>,
    /// Highlighted date; starts on today
    pub cursor: NaiveDate,
    pub today: NaiveDate,
    pub placement: Option<Placement>,
}

impl DatePicker {
    /// Date Enter would apply.
    pub fn effective_date(&self) -> NaiveDate {
        self.selected.unwrap_or(self.today)
    }
}

/// Picker lifetime. A destroyed picker passes through `PendingCleanup`
/// until the next dispatch, so a second destroy or a late reposition finds
/// nothing to touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PickerSlot {
    #[default]
    Absent,
    Visible(DatePicker),
    PendingCleanup,
}

/// Owns the session's single date picker.
#[derive(Debug)]
pub struct DatePickerController {
    slot: PickerSlot,
    week_start: WeekStart,
}

impl DatePickerController {
    pub fn new(week_start: WeekStart) -> Self {
        DatePickerController {
            slot: PickerSlot::Absent,
            week_start,
        }
    }

    pub fn slot(&self) -> &PickerSlot {
        &self.slot
    }

    pub fn picker(&self) -> Option<&DatePicker> {
        match &self.slot {
            PickerSlot::Visible(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.slot, PickerSlot::Visible(_))
    }

    pub fn is_pending_cleanup(&self) -> bool {
        matches!(self.slot, PickerSlot::PendingCleanup)
    }

    /// Create the picker for a trigger. Returns false if one is already live.
    pub fn open(&mut self, trigger: Range<usize>, today: NaiveDate) -> bool {
        self.flush_cleanup();
        if self.is_visible() {
            return false;
        }
        tracing::debug!(?trigger, %today, "date picker opened");
        self.slot = PickerSlot::Visible(DatePicker {
            trigger,
            selected: None,
            cursor: today,
            today,
            placement: None,
        });
        true
    }

    /// Recompute placement from the caret. No-op unless visible.
    pub fn reposition(&mut self, caret: Option<CaretCoords>, viewport: Viewport) {
        if let PickerSlot::Visible(p) = &mut self.slot {
            p.placement = caret.map(|c| place(c, PICKER_SIZE, viewport));
        }
    }

    pub fn navigate(&mut self, nav: DateNav) {
        let week_start = self.week_start;
        if let PickerSlot::Visible(p) = &mut self.slot {
            let from = p.selected.unwrap_or(p.cursor);
            let to = step(from, nav, week_start);
            p.cursor = to;
            p.selected = Some(to);
        }
    }

    /// Mark `date` as explicitly chosen.
    pub fn select(&mut self, date: NaiveDate) {
        if let PickerSlot::Visible(p) = &mut self.slot {
            p.cursor = date;
            p.selected = Some(date);
        }
    }

    /// Close the picker and hand back the trigger range and date to apply.
    pub fn confirm(&mut self) -> Option<(Range<usize>, NaiveDate)> {
        let picker = self.destroy()?;
        Some((picker.trigger.clone(), picker.effective_date()))
    }

    /// Remove a live picker. Absent or already-destroyed pickers are left
    /// alone and `None` is returned.
    pub fn destroy(&mut self) -> Option<DatePicker> {
        match std::mem::take(&mut self.slot) {
            PickerSlot::Visible(p) => {
                tracing::debug!("date picker destroyed");
                self.slot = PickerSlot::PendingCleanup;
                Some(p)
            }
            other => {
                self.slot = other;
                None
            }
        }
    }

    /// Forget a destroyed picker.
    pub fn flush_cleanup(&mut self) {
        if self.is_pending_cleanup() {
            self.slot = PickerSlot::Absent;
        }
    }
}

/// Move `date` one step. Right/left cross into the next/previous month at
/// the week's edge; up/down move a week.
pub fn step(date: NaiveDate, nav: DateNav, week_start: WeekStart) -> NaiveDate {
    match nav {
        DateNav::Right if date.weekday() == week_start.last_day() => first_of_next_month(date),
        DateNav::Right => date.succ_opt().unwrap_or(date),
        DateNav::Left if date.weekday() == week_start.first_day() => last_of_previous_month(date),
        DateNav::Left => date.pred_opt().unwrap_or(date),
        DateNav::Up => date.checked_sub_days(Days::new(7)).unwrap_or(date),
        DateNav::Down => date.checked_add_days(Days::new(7)).unwrap_or(date),
    }
}

pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn last_of_previous_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Weeks of the month containing `date`, each starting on the locale's
/// first weekday. Days outside the month are `None`.
pub fn month_grid(date: NaiveDate, week_start: WeekStart) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };
    let lead = (first.weekday().num_days_from_sunday() + 7
        - week_start.first_day().num_days_from_sunday()) as usize
        % 7;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut col = lead;
    let mut day = Some(first);
    while let Some(d) = day.filter(|d| d.month() == first.month()) {
        week[col] = Some(d);
        col += 1;
        if col == 7 {
            weeks.push(week);
            week = [None; 7];
            col = 0;
        }
        day = d.succ_opt();
    }
    if col > 0 {
        weeks.push(week);
    }
    weeks
}

/// Weekday column headers in display order.
pub fn weekday_order(week_start: WeekStart) -> [Weekday; 7] {
    let mut days = [week_start.first_day(); 7];
    for i in 1..7 {
        days[i] = days[i - 1].succ();
    }
    days
}

/// The text a confirmed date is spliced in as: `@{2024-05-01}`, or
/// `@[[2024-05-01]]` when dates link to daily notes.
pub fn date_token(date: NaiveDate, config: &CompletionConfig) -> String {
    let formatted = date.format(&config.date_format).to_string();
    if config.link_date_to_daily_note {
        format!("{}[[{}]]", config.date_trigger, formatted)
    } else {
        format!("{}{{{}}}", config.date_trigger, formatted)
    }
}

/// Parse text typed after the trigger as a date in the configured format.
pub fn parse_typed_date(fragment: &str, config: &CompletionConfig) -> Option<NaiveDate> {
    let fragment = fragment.trim().trim_start_matches('{').trim_end_matches('}');
    NaiveDate::parse_from_str(fragment, &config.date_format).ok()
}
