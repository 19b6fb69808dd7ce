use std::collections::HashMap;
use std::fmt::{self, Write};

use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono::format::{Item, StrftimeItems};
use serde::Serialize;

pub const DEFAULT_DATE_TRIGGER: &str = "@";
pub const DEFAULT_TIME_TRIGGER: &str = "@@";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Named host settings consumed by the autocomplete layer.
pub mod keys {
    pub const DATE_TRIGGER: &str = "date-trigger";
    pub const TIME_TRIGGER: &str = "time-trigger";
    pub const DATE_FORMAT: &str = "date-format";
    pub const TIME_FORMAT: &str = "time-format";
    pub const AUTO_PAIR_BRACKETS: &str = "auto-pair-brackets";
    pub const FIRST_DAY_OF_WEEK: &str = "first-day-of-week";
    pub const LINK_DATE_TO_DAILY_NOTE: &str = "link-date-to-daily-note";
}

/// Read-only view of the host's configuration service.
pub trait SettingsSource {
    fn setting(&self, key: &str) -> Option<String>;
}

impl SettingsSource for HashMap<String, String> {
    fn setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A setting that was present but unusable. The default is used instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    #[error("{key}: empty trigger, using {fallback:?}")]
    EmptyTrigger {
        key: &'static str,
        fallback: &'static str,
    },
    #[error("{key}: invalid format string {value:?}")]
    InvalidFormat { key: &'static str, value: String },
    #[error("{key}: expected true or false, got {value:?}")]
    InvalidBool { key: &'static str, value: String },
    #[error("{key}: expected sunday or monday, got {value:?}")]
    InvalidWeekStart { key: &'static str, value: String },
    #[error("time-trigger {value:?} is the same as date-trigger, using {fallback:?}")]
    TriggerClash { value: String, fallback: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn first_day(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    pub fn last_day(self) -> Weekday {
        self.first_day().pred()
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" | "0" => Some(WeekStart::Sunday),
            "monday" | "mon" | "1" => Some(WeekStart::Monday),
            _ => None,
        }
    }
}

/// Resolved autocomplete configuration. Every field has a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompletionConfig {
    pub date_trigger: String,
    pub time_trigger: String,
    /// chrono strftime format for inserted dates
    pub date_format: String,
    /// chrono strftime format for inserted times
    pub time_format: String,
    pub auto_pair_brackets: bool,
    pub first_day_of_week: WeekStart,
    /// Insert dates as `@[[date]]` instead of `@{date}`
    pub link_date_to_daily_note: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        CompletionConfig {
            date_trigger: DEFAULT_DATE_TRIGGER.into(),
            time_trigger: DEFAULT_TIME_TRIGGER.into(),
            date_format: DEFAULT_DATE_FORMAT.into(),
            time_format: DEFAULT_TIME_FORMAT.into(),
            auto_pair_brackets: true,
            first_day_of_week: WeekStart::Sunday,
            link_date_to_daily_note: false,
        }
    }
}

impl CompletionConfig {
    /// Read every setting from `source`, falling back to defaults for
    /// missing values. Unusable values are returned alongside the config.
    pub fn from_settings(source: &dyn SettingsSource) -> (Self, Vec<SettingError>) {
        let mut config = CompletionConfig::default();
        let mut errors = Vec::new();

        if let Some(value) = source.setting(keys::DATE_TRIGGER) {
            match trigger_value(&value) {
                Some(t) => config.date_trigger = t,
                None => errors.push(SettingError::EmptyTrigger {
                    key: keys::DATE_TRIGGER,
                    fallback: DEFAULT_DATE_TRIGGER,
                }),
            }
        }
        if let Some(value) = source.setting(keys::TIME_TRIGGER) {
            match trigger_value(&value) {
                Some(t) => config.time_trigger = t,
                None => errors.push(SettingError::EmptyTrigger {
                    key: keys::TIME_TRIGGER,
                    fallback: DEFAULT_TIME_TRIGGER,
                }),
            }
        }
        if config.time_trigger == config.date_trigger {
            let fallback = config.date_trigger.repeat(2);
            errors.push(SettingError::TriggerClash {
                value: config.time_trigger.clone(),
                fallback: fallback.clone(),
            });
            config.time_trigger = fallback;
        }

        if let Some(value) = source.setting(keys::DATE_FORMAT) {
            if is_valid_date_format(&value) {
                config.date_format = value;
            } else {
                errors.push(SettingError::InvalidFormat {
                    key: keys::DATE_FORMAT,
                    value,
                });
            }
        }
        if let Some(value) = source.setting(keys::TIME_FORMAT) {
            if is_valid_time_format(&value) {
                config.time_format = value;
            } else {
                errors.push(SettingError::InvalidFormat {
                    key: keys::TIME_FORMAT,
                    value,
                });
            }
        }

        for (key, slot) in [
            (keys::AUTO_PAIR_BRACKETS, &mut config.auto_pair_brackets),
            (
                keys::LINK_DATE_TO_DAILY_NOTE,
                &mut config.link_date_to_daily_note,
            ),
        ] {
            if let Some(value) = source.setting(key) {
                match parse_bool(&value) {
                    Some(b) => *slot = b,
                    None => errors.push(SettingError::InvalidBool { key, value }),
                }
            }
        }

        if let Some(value) = source.setting(keys::FIRST_DAY_OF_WEEK) {
            match WeekStart::parse(&value) {
                Some(ws) => config.first_day_of_week = ws,
                None => errors.push(SettingError::InvalidWeekStart {
                    key: keys::FIRST_DAY_OF_WEEK,
                    value,
                }),
            }
        }

        (config, errors)
    }

    /// Like [`from_settings`](Self::from_settings), logging each fallback.
    pub fn resolve(source: &dyn SettingsSource) -> Self {
        let (config, errors) = Self::from_settings(source);
        for err in &errors {
            tracing::warn!(error = %err, "falling back to default setting");
        }
        config
    }
}

fn trigger_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A format string chrono can parse.
pub fn is_valid_format(fmt: &str) -> bool {
    !fmt.is_empty() && StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}

/// A format a `NaiveDate` can render. Time or zone fields fail here.
pub fn is_valid_date_format(fmt: &str) -> bool {
    is_valid_format(fmt) && renders(NaiveDate::default().format(fmt))
}

/// A format a `NaiveTime` can render. Date or zone fields fail here.
pub fn is_valid_time_format(fmt: &str) -> bool {
    is_valid_format(fmt) && renders(NaiveTime::default().format(fmt))
}

fn renders(formatted: impl fmt::Display) -> bool {
    let mut out = String::new();
    write!(out, "{formatted}").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let (config, errors) = CompletionConfig::from_settings(&HashMap::new());
        assert_eq!(config, CompletionConfig::default());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_all_settings_applied() {
        let source = settings(&[
            ("date-trigger", "!"),
            ("time-trigger", "!!"),
            ("date-format", "%d.%m.%Y"),
            ("time-format", "%I:%M %p"),
            ("auto-pair-brackets", "false"),
            ("first-day-of-week", "monday"),
            ("link-date-to-daily-note", "true"),
        ]);
        let (config, errors) = CompletionConfig::from_settings(&source);
        assert!(errors.is_empty());
        assert_eq!(config.date_trigger, "!");
        assert_eq!(config.time_trigger, "!!");
        assert_eq!(config.date_format, "%d.%m.%Y");
        assert_eq!(config.time_format, "%I:%M %p");
        assert!(!config.auto_pair_brackets);
        assert_eq!(config.first_day_of_week, WeekStart::Monday);
        assert!(config.link_date_to_daily_note);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let source = settings(&[
            ("date-trigger", "  "),
            ("date-format", "%Q"),
            ("auto-pair-brackets", "maybe"),
            ("first-day-of-week", "wednesday"),
        ]);
        let (config, errors) = CompletionConfig::from_settings(&source);
        assert_eq!(config.date_trigger, DEFAULT_DATE_TRIGGER);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert!(config.auto_pair_brackets);
        assert_eq!(config.first_day_of_week, WeekStart::Sunday);
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors[0],
            SettingError::EmptyTrigger {
                key: "date-trigger",
                fallback: "@"
            }
        );
    }

    #[test]
    fn test_trigger_clash_doubles_date_trigger() {
        let source = settings(&[("date-trigger", "%"), ("time-trigger", "%")]);
        let (config, errors) = CompletionConfig::from_settings(&source);
        assert_eq!(config.time_trigger, "%%");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_week_start_days() {
        assert_eq!(WeekStart::Sunday.last_day(), Weekday::Sat);
        assert_eq!(WeekStart::Monday.last_day(), Weekday::Sun);
        assert_eq!(WeekStart::parse("1"), Some(WeekStart::Monday));
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format("%Y-%m-%d"));
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("%Y-%"));
    }

    #[test]
    fn test_format_must_suit_its_type() {
        assert!(is_valid_date_format("%d.%m.%Y"));
        assert!(!is_valid_date_format("%Y-%m-%d %H:%M"));
        assert!(is_valid_time_format("%I:%M %p"));
        assert!(!is_valid_time_format("%Y %H:%M"));
    }

    #[test]
    fn test_mismatched_formats_fall_back() {
        let source = settings(&[
            ("date-format", "%Y-%m-%d %H:%M"),
            ("time-format", "%Y %H:%M"),
        ]);
        let (config, errors) = CompletionConfig::from_settings(&source);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.time_format, DEFAULT_TIME_FORMAT);
        assert_eq!(
            errors,
            vec![
                SettingError::InvalidFormat {
                    key: "date-format",
                    value: "%Y-%m-%d %H:%M".into(),
                },
                SettingError::InvalidFormat {
                    key: "time-format",
                    value: "%Y %H:%M".into(),
                },
            ]
        );
    }
}
