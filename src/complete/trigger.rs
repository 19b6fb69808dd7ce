//! Classifies the text before the caret into an autocomplete strategy.

use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::CompletionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[[target]]`
    Wiki,
    /// `![[target]]`
    Embed,
}

impl LinkStyle {
    pub fn opener(self) -> &'static str {
        match self {
            LinkStyle::Wiki => "[[",
            LinkStyle::Embed => "![[",
        }
    }
}

/// A trigger paired with its candidate provider and insertion behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Tag,
    BlockLink(LinkStyle),
    HeadingLink(LinkStyle),
    FileLink(LinkStyle),
    Time,
    Date,
}

impl Strategy {
    pub fn link_style(self) -> Option<LinkStyle> {
        match self {
            Strategy::BlockLink(s) | Strategy::HeadingLink(s) | Strategy::FileLink(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_link(self) -> bool {
        self.link_style().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Tag => "tag",
            Strategy::BlockLink(LinkStyle::Wiki) => "block-link",
            Strategy::BlockLink(LinkStyle::Embed) => "block-embed",
            Strategy::HeadingLink(LinkStyle::Wiki) => "heading-link",
            Strategy::HeadingLink(LinkStyle::Embed) => "heading-embed",
            Strategy::FileLink(LinkStyle::Wiki) => "file-link",
            Strategy::FileLink(LinkStyle::Embed) => "file-embed",
            Strategy::Time => "time",
            Strategy::Date => "date",
        }
    }
}

/// A strategy's pattern, matched against the text preceding the caret.
///
/// Every regex is anchored at the end (`$`) and exposes a `trigger` group
/// spanning the trigger plus the typed query, an optional `query` group and,
/// for heading/block links, a `target` group holding the file part.
#[derive(Debug, Clone)]
pub struct TriggerPattern {
    pub id: Strategy,
    pub regex: Regex,
    pub min_chars: usize,
}

/// The active trigger found before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub strategy: Strategy,
    /// Byte range of the trigger and the typed query; ends at the caret.
    pub range: Range<usize>,
    pub query: String,
    /// File part of a heading or block link. Empty means the current file.
    pub target: Option<String>,
    /// A closing `]]` auto-paired by the editor sits right after the caret.
    pub closed_after: bool,
}

impl TriggerMatch {
    /// Range a link splice should replace, swallowing an auto-paired `]]`.
    pub fn splice_range(&self) -> Range<usize> {
        if self.closed_after {
            self.range.start..self.range.end + 2
        } else {
            self.range.clone()
        }
    }
}

/// Start-of-text or whitespace before the trigger.
const BOUNDARY: &str = r"(?:^|\s)";
/// Characters allowed in a link target or heading query.
const LINK_CHARS: &str = r"[^\[\]#^|\n]*";

pub struct TriggerDetector {
    patterns: Vec<TriggerPattern>,
    auto_pair: bool,
}

impl TriggerDetector {
    /// Build the patterns for one editing session, in priority order:
    /// tag, block-link, heading-link, file-link, time, date.
    pub fn new(config: &CompletionConfig) -> Self {
        let mut sources = vec![(
            Strategy::Tag,
            format!(r"{BOUNDARY}(?P<trigger>#(?P<query>[^\s#\[\]]*))$"),
        )];

        let link_kinds: [fn(LinkStyle) -> Strategy; 3] =
            [Strategy::BlockLink, Strategy::HeadingLink, Strategy::FileLink];
        for make in link_kinds {
            for style in [LinkStyle::Embed, LinkStyle::Wiki] {
                let open = regex::escape(style.opener());
                let body = match make(style) {
                    Strategy::BlockLink(_) => {
                        format!(r"(?P<target>{LINK_CHARS})#?\^(?P<query>[^\]\n]*)")
                    }
                    Strategy::HeadingLink(_) => {
                        format!(r"(?P<target>{LINK_CHARS})#(?P<query>{LINK_CHARS})")
                    }
                    _ => format!(r"(?P<query>{LINK_CHARS})"),
                };
                sources.push((
                    make(style),
                    format!(r"{BOUNDARY}(?P<trigger>{open}{body})$"),
                ));
            }
        }

        sources.push((
            Strategy::Time,
            format!(
                r"{BOUNDARY}(?P<trigger>{}(?P<query>[^\s{{}}\[\]]*))$",
                regex::escape(&config.time_trigger)
            ),
        ));
        sources.push((
            Strategy::Date,
            format!(
                r"{BOUNDARY}(?P<trigger>{})$",
                regex::escape(&config.date_trigger)
            ),
        ));

        let patterns = sources
            .into_iter()
            .filter_map(|(id, source)| match Regex::new(&source) {
                Ok(regex) => Some(TriggerPattern {
                    id,
                    regex,
                    min_chars: 0,
                }),
                Err(e) => {
                    tracing::error!(strategy = id.name(), error = %e, "dropping trigger pattern");
                    None
                }
            })
            .collect();

        TriggerDetector {
            patterns,
            auto_pair: config.auto_pair_brackets,
        }
    }

    pub fn patterns(&self) -> &[TriggerPattern] {
        &self.patterns
    }

    /// First pattern matching the text before the caret, if any.
    pub fn detect(&self, before: &str, after: &str) -> Option<TriggerMatch> {
        self.patterns.iter().find_map(|p| {
            let caps = p.regex.captures(before)?;
            let trigger = caps.name("trigger")?;
            let query = caps.name("query").map_or("", |m| m.as_str());
            if query.chars().count() < p.min_chars {
                return None;
            }
            let closed_after = p.id.is_link() && self.auto_pair && after.starts_with("]]");
            Some(TriggerMatch {
                strategy: p.id,
                range: trigger.start()..trigger.end(),
                query: query.to_string(),
                target: caps.name("target").map(|m| m.as_str().to_string()),
                closed_after,
            })
        })
    }
}
