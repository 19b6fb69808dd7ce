//! Candidate providers: one per entity kind, all reading one shared snapshot.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::rc::Rc;

use chrono::NaiveTime;
use serde::Serialize;

use super::host::{MetadataSource, TextInput};
use super::index::{Ranked, SearchIndex};
use super::trigger::{LinkStyle, Strategy, TriggerMatch};
use crate::model::{
    BlockRef, CompletionConfig, HeadingRef, LinkTarget, link_matches, stem, strip_md,
};

/// Minutes between offered time slots
const TIME_STEP_MINUTES: u32 = 15;

/// The thing a candidate stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Tag { name: String },
    File { target: LinkTarget },
    Heading { file: String, heading: HeadingRef },
    Block { file: String, block: BlockRef },
    Time { time: NaiveTime },
}

/// A ranked suggestion offered for insertion at the trigger site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub label: String,
    pub entity: Entity,
    /// Lower ranks higher
    pub score: u32,
}

/// Replace `range` with `text`, then put the caret `caret` bytes into `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub range: Range<usize>,
    pub text: String,
    pub caret: usize,
}

impl Splice {
    fn at_end(range: Range<usize>, text: String) -> Self {
        Splice {
            caret: text.len(),
            range,
            text,
        }
    }

    pub fn apply(&self, input: &mut dyn TextInput) {
        input.replace_range(self.range.clone(), &self.text);
        input.set_caret(self.range.start + self.caret);
    }
}

/// Key typed while a link candidate is active that opens a sub-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `#`: heading inside the target
    Heading,
    /// `^`: block inside the target
    Block,
}

impl Anchor {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Anchor::Heading),
            '^' => Some(Anchor::Block),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Anchor::Heading => "#",
            Anchor::Block => "#^",
        }
    }
}

pub trait Provider {
    /// Ranked candidates for the match, at most [`MAX_CANDIDATES`](super::index::MAX_CANDIDATES).
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate>;

    /// Literal replacement for the trigger and typed query.
    fn splice(&self, candidate: &Candidate, m: &TriggerMatch, config: &CompletionConfig) -> Splice;

    /// Apply `candidate` and leave the link open after an anchor character.
    fn anchor_splice(
        &self,
        _candidate: &Candidate,
        _m: &TriggerMatch,
        _config: &CompletionConfig,
        _anchor: Anchor,
    ) -> Option<Splice> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeading {
    pub file: String,
    pub heading: HeadingRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    pub file: String,
    pub block: BlockRef,
}

/// Read-only indices over the host metadata, taken once per session.
pub struct Catalog {
    pub tags: SearchIndex<String>,
    pub files: SearchIndex<LinkTarget>,
    pub headings: SearchIndex<FileHeading>,
    pub blocks: SearchIndex<FileBlock>,
    /// Note being edited, as a vault-relative path
    pub current_file: Option<String>,
    /// How many existing files share each lowercase stem
    stem_counts: HashMap<String, usize>,
}

impl Catalog {
    pub fn snapshot(source: &dyn MetadataSource, current_file: Option<&str>) -> Self {
        let targets = source.link_targets();

        let mut stem_counts: HashMap<String, usize> = HashMap::new();
        let mut headings = Vec::new();
        let mut blocks = Vec::new();
        let mut seen_files: HashSet<&str> = HashSet::new();
        for target in targets.iter().filter(|t| t.exists) {
            if !seen_files.insert(&target.path) {
                continue;
            }
            *stem_counts.entry(stem(&target.path).to_lowercase()).or_default() += 1;
            headings.extend(source.headings(&target.path).into_iter().map(|heading| {
                FileHeading {
                    file: target.path.clone(),
                    heading,
                }
            }));
            blocks.extend(source.blocks(&target.path).into_iter().map(|block| FileBlock {
                file: target.path.clone(),
                block,
            }));
        }

        let catalog = Catalog {
            tags: SearchIndex::new(source.tags(), |t| vec![t.clone()]),
            files: SearchIndex::new(targets, |t| {
                let mut keys = vec![strip_md(&t.path).to_string()];
                if let Some(alias) = &t.alias {
                    keys.insert(0, alias.clone());
                }
                keys
            }),
            headings: SearchIndex::new(headings, |h| vec![h.heading.text.clone()]),
            blocks: SearchIndex::new(blocks, |b| vec![b.block.text.clone(), b.block.id.clone()]),
            current_file: current_file.map(str::to_string),
            stem_counts,
        };
        tracing::info!(
            tags = catalog.tags.len(),
            targets = catalog.files.len(),
            headings = catalog.headings.len(),
            blocks = catalog.blocks.len(),
            "autocomplete snapshot taken"
        );
        catalog
    }

    /// Existing file that link text refers to.
    pub fn resolve(&self, linktext: &str) -> Option<&str> {
        self.files
            .entries()
            .iter()
            .find(|t| t.exists && link_matches(linktext, &t.path))
            .map(|t| t.path.as_str())
    }

    /// File a heading/block match points at: the typed target, or the
    /// current file when the target is empty.
    fn target_file(&self, m: &TriggerMatch) -> Option<&str> {
        match m.target.as_deref().map(str::trim) {
            None | Some("") => self.current_file.as_deref(),
            Some(linktext) => self.resolve(linktext),
        }
    }

    fn is_current(&self, path: &str) -> bool {
        self.current_file.as_deref() == Some(path)
    }

    /// Shortest unambiguous link text for a file: its bare name, or the
    /// full path when several files share that name.
    pub fn link_text(&self, target: &LinkTarget) -> String {
        if !target.exists {
            return target.path.clone();
        }
        let name = stem(&target.path);
        if self.stem_counts.get(&name.to_lowercase()).copied().unwrap_or(0) > 1 {
            strip_md(&target.path).to_string()
        } else {
            name.to_string()
        }
    }

    fn file_link_text(&self, path: &str) -> String {
        self.link_text(&LinkTarget::file(path))
    }

    /// Link text for a sub-reference, dropping the file name for the
    /// current note.
    fn sub_link(&self, file: &str, subpath: &str) -> String {
        if self.is_current(file) {
            subpath.to_string()
        } else {
            format!("{}{}", self.file_link_text(file), subpath)
        }
    }
}

/// Wrap `inner` as a closed link of `style`.
fn closed_link(style: LinkStyle, inner: &str, m: &TriggerMatch) -> Splice {
    Splice::at_end(m.splice_range(), format!("{}{}]]", style.opener(), inner))
}

/// Wrap `inner` as an open link, keeping an auto-paired `]]` after the caret.
fn open_link(style: LinkStyle, inner: &str, m: &TriggerMatch, config: &CompletionConfig) -> Splice {
    let mut text = format!("{}{}", style.opener(), inner);
    let caret = text.len();
    if config.auto_pair_brackets {
        text.push_str("]]");
    }
    Splice {
        range: m.splice_range(),
        text,
        caret,
    }
}

fn style_of(m: &TriggerMatch) -> LinkStyle {
    m.strategy.link_style().unwrap_or(LinkStyle::Wiki)
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

pub struct TagProvider {
    catalog: Rc<Catalog>,
}

impl Provider for TagProvider {
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate> {
        self.catalog
            .tags
            .search(&m.query)
            .into_iter()
            .filter_map(|Ranked { index, score }| {
                let name = self.catalog.tags.get(index)?;
                Some(Candidate {
                    label: format!("#{}", name),
                    entity: Entity::Tag { name: name.clone() },
                    score,
                })
            })
            .collect()
    }

    fn splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        _config: &CompletionConfig,
    ) -> Splice {
        let text = match &candidate.entity {
            Entity::Tag { name } => format!("#{}", name),
            _ => candidate.label.clone(),
        };
        Splice::at_end(m.range.clone(), text)
    }
}

/// Files, aliases and unresolved link targets, for both link styles.
pub struct FileLinkProvider {
    catalog: Rc<Catalog>,
}

impl FileLinkProvider {
    fn inner(&self, target: &LinkTarget) -> String {
        let link = self.catalog.link_text(target);
        match &target.alias {
            Some(alias) => format!("{}|{}", link, alias),
            None => link,
        }
    }
}

impl Provider for FileLinkProvider {
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate> {
        self.catalog
            .files
            .search(&m.query)
            .into_iter()
            .filter_map(|Ranked { index, score }| {
                let target = self.catalog.files.get(index)?;
                let label = match &target.alias {
                    Some(alias) => format!("{} → {}", alias, strip_md(&target.path)),
                    None => strip_md(&target.path).to_string(),
                };
                Some(Candidate {
                    label,
                    entity: Entity::File {
                        target: target.clone(),
                    },
                    score,
                })
            })
            .collect()
    }

    fn splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        _config: &CompletionConfig,
    ) -> Splice {
        match &candidate.entity {
            Entity::File { target } => closed_link(style_of(m), &self.inner(target), m),
            _ => closed_link(style_of(m), &candidate.label, m),
        }
    }

    fn anchor_splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        config: &CompletionConfig,
        anchor: Anchor,
    ) -> Option<Splice> {
        let Entity::File { target } = &candidate.entity else {
            return None;
        };
        let inner = if target.exists && self.catalog.is_current(&target.path) {
            anchor.suffix().to_string()
        } else {
            format!("{}{}", self.catalog.link_text(target), anchor.suffix())
        };
        Some(open_link(style_of(m), &inner, m, config))
    }
}

/// Headings of the linked file, or of the current file for `[[#`.
pub struct HeadingLinkProvider {
    catalog: Rc<Catalog>,
}

impl Provider for HeadingLinkProvider {
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate> {
        let Some(file) = self.catalog.target_file(m) else {
            return Vec::new();
        };
        let headings = &self.catalog.headings;
        headings
            .search_where(&m.query, |h| h.file == file)
            .into_iter()
            .filter_map(|Ranked { index, score }| {
                let h = headings.get(index)?;
                Some(Candidate {
                    label: format!("{} {}", "#".repeat(h.heading.level as usize), h.heading.text),
                    entity: Entity::Heading {
                        file: h.file.clone(),
                        heading: h.heading.clone(),
                    },
                    score,
                })
            })
            .collect()
    }

    fn splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        _config: &CompletionConfig,
    ) -> Splice {
        match &candidate.entity {
            Entity::Heading { file, heading } => {
                let inner = self.catalog.sub_link(file, &format!("#{}", heading.text));
                closed_link(style_of(m), &inner, m)
            }
            _ => closed_link(style_of(m), &candidate.label, m),
        }
    }

    fn anchor_splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        config: &CompletionConfig,
        anchor: Anchor,
    ) -> Option<Splice> {
        // Only nested headings make sense below a heading
        let (Entity::Heading { file, heading }, Anchor::Heading) = (&candidate.entity, anchor)
        else {
            return None;
        };
        let inner = self.catalog.sub_link(file, &format!("#{}#", heading.text));
        Some(open_link(style_of(m), &inner, m, config))
    }
}

/// Block ids of the linked file, or of the current file for `[[^`.
pub struct BlockLinkProvider {
    catalog: Rc<Catalog>,
}

impl Provider for BlockLinkProvider {
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate> {
        let Some(file) = self.catalog.target_file(m) else {
            return Vec::new();
        };
        let blocks = &self.catalog.blocks;
        blocks
            .search_where(&m.query, |b| b.file == file)
            .into_iter()
            .filter_map(|Ranked { index, score }| {
                let b = blocks.get(index)?;
                Some(Candidate {
                    label: format!("{}  ^{}", b.block.text, b.block.id),
                    entity: Entity::Block {
                        file: b.file.clone(),
                        block: b.block.clone(),
                    },
                    score,
                })
            })
            .collect()
    }

    fn splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        _config: &CompletionConfig,
    ) -> Splice {
        match &candidate.entity {
            Entity::Block { file, block } => {
                let inner = self.catalog.sub_link(file, &format!("#^{}", block.id));
                closed_link(style_of(m), &inner, m)
            }
            _ => closed_link(style_of(m), &candidate.label, m),
        }
    }
}

/// Times of day at a fixed step, rendered with the time format.
pub struct TimeProvider {
    slots: SearchIndex<(NaiveTime, String)>,
}

impl TimeProvider {
    pub fn new(config: &CompletionConfig) -> Self {
        let slots = (0..24 * 60)
            .step_by(TIME_STEP_MINUTES as usize)
            .filter_map(|minute: u32| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .map(|t| (t, t.format(&config.time_format).to_string()))
            .collect();
        TimeProvider {
            slots: SearchIndex::new(slots, |(_, label)| vec![label.clone()]),
        }
    }
}

impl Provider for TimeProvider {
    fn search(&self, m: &TriggerMatch) -> Vec<Candidate> {
        self.slots
            .search(&m.query)
            .into_iter()
            .filter_map(|Ranked { index, score }| {
                let (time, label) = self.slots.get(index)?;
                Some(Candidate {
                    label: label.clone(),
                    entity: Entity::Time { time: *time },
                    score,
                })
            })
            .collect()
    }

    fn splice(
        &self,
        candidate: &Candidate,
        m: &TriggerMatch,
        config: &CompletionConfig,
    ) -> Splice {
        let formatted = match &candidate.entity {
            Entity::Time { time } => time.format(&config.time_format).to_string(),
            _ => candidate.label.clone(),
        };
        Splice::at_end(
            m.range.clone(),
            format!("{}{{{}}}", config.time_trigger, formatted),
        )
    }
}

/// Every provider of a session, sharing one catalog.
pub struct Providers {
    tags: TagProvider,
    files: FileLinkProvider,
    headings: HeadingLinkProvider,
    blocks: BlockLinkProvider,
    times: TimeProvider,
}

impl Providers {
    pub fn new(catalog: Rc<Catalog>, config: &CompletionConfig) -> Self {
        Providers {
            tags: TagProvider {
                catalog: Rc::clone(&catalog),
            },
            files: FileLinkProvider {
                catalog: Rc::clone(&catalog),
            },
            headings: HeadingLinkProvider {
                catalog: Rc::clone(&catalog),
            },
            blocks: BlockLinkProvider { catalog },
            times: TimeProvider::new(config),
        }
    }

    /// Provider behind a strategy. Dates have none; the picker handles them.
    pub fn get(&self, strategy: Strategy) -> Option<&dyn Provider> {
        match strategy {
            Strategy::Tag => Some(&self.tags),
            Strategy::FileLink(_) => Some(&self.files),
            Strategy::HeadingLink(_) => Some(&self.headings),
            Strategy::BlockLink(_) => Some(&self.blocks),
            Strategy::Time => Some(&self.times),
            Strategy::Date => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::trigger::TriggerDetector;
    use crate::model::{Note, NoteSet, WikiLink};
    use pretty_assertions::assert_eq;

    fn notes() -> NoteSet {
        NoteSet::new(vec![
            Note {
                path: "Meeting.md".into(),
                tags: vec!["project".into(), "meeting".into()],
                headings: vec![
                    HeadingRef {
                        text: "Agenda".into(),
                        level: 1,
                    },
                    HeadingRef {
                        text: "Action items".into(),
                        level: 2,
                    },
                ],
                blocks: vec![BlockRef {
                    id: "abc123".into(),
                    text: "Ship the beta".into(),
                }],
                ..Default::default()
            },
            Note {
                path: "daily/Journal.md".into(),
                aliases: vec!["Diary".into()],
                tags: vec!["project".into(), "personal".into()],
                headings: vec![HeadingRef {
                    text: "Morning".into(),
                    level: 2,
                }],
                links: vec![WikiLink {
                    target: "Someday".into(),
                    subpath: None,
                    alias: None,
                    embed: false,
                }],
                ..Default::default()
            },
            Note {
                path: "archive/Meeting.md".into(),
                ..Default::default()
            },
        ])
    }

    fn setup(current: Option<&str>) -> (Providers, CompletionConfig) {
        let config = CompletionConfig::default();
        let catalog = Rc::new(Catalog::snapshot(&notes(), current));
        (Providers::new(catalog, &config), config)
    }

    fn matched(before: &str, after: &str) -> TriggerMatch {
        TriggerDetector::new(&CompletionConfig::default())
            .detect(before, after)
            .unwrap()
    }

    fn labels(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_tag_search_and_splice() {
        let (providers, config) = setup(None);
        let m = matched("todo #proj", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(labels(&found), vec!["#project"]);
        let splice = provider.splice(&found[0], &m, &config);
        assert_eq!(splice.range, 5..10);
        assert_eq!(splice.text, "#project");
    }

    #[test]
    fn test_tags_ordered_by_use() {
        let (providers, _) = setup(None);
        let m = matched("#", "");
        let found = providers.get(m.strategy).unwrap().search(&m);
        assert_eq!(labels(&found), vec!["#project", "#meeting", "#personal"]);
    }

    #[test]
    fn test_file_search_includes_alias_and_unresolved() {
        let (providers, _) = setup(None);
        let m = matched("[[", "");
        let found = providers.get(m.strategy).unwrap().search(&m);
        assert_eq!(
            labels(&found),
            vec![
                "Meeting",
                "daily/Journal",
                "Diary → daily/Journal",
                "archive/Meeting",
                "Someday",
            ]
        );
        let Entity::File { target } = &found[4].entity else {
            panic!("expected file");
        };
        assert!(!target.exists);
    }

    #[test]
    fn test_file_splice_uses_shortest_unique_name() {
        let (providers, config) = setup(None);
        let m = matched("see [[jour", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(found[0].label, "daily/Journal");
        assert_eq!(provider.splice(&found[0], &m, &config).text, "[[Journal]]");

        // Two files named Meeting: the full path disambiguates
        let m = matched("[[archive", "");
        let found = provider.search(&m);
        assert_eq!(provider.splice(&found[0], &m, &config).text, "[[archive/Meeting]]");
    }

    #[test]
    fn test_alias_splice() {
        let (providers, config) = setup(None);
        let m = matched("![[Dia", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        let splice = provider.splice(&found[0], &m, &config);
        assert_eq!(splice.text, "![[Journal|Diary]]");
        assert_eq!(splice.range, 0..6);
    }

    #[test]
    fn test_splice_swallows_auto_paired_closer() {
        let (providers, config) = setup(None);
        let m = matched("[[jour", "]]");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        let splice = provider.splice(&found[0], &m, &config);
        assert_eq!(splice.range, 0..8);
        assert_eq!(splice.text, "[[Journal]]");
        assert_eq!(splice.caret, splice.text.len());
    }

    #[test]
    fn test_heading_search_in_other_file() {
        let (providers, config) = setup(Some("Meeting.md"));
        let m = matched("[[Journal#", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(labels(&found), vec!["## Morning"]);
        assert_eq!(
            provider.splice(&found[0], &m, &config).text,
            "[[Journal#Morning]]"
        );
    }

    #[test]
    fn test_same_file_heading_shorthand() {
        let (providers, config) = setup(Some("Meeting.md"));
        let m = matched("[[#act", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(labels(&found), vec!["## Action items"]);
        assert_eq!(
            provider.splice(&found[0], &m, &config).text,
            "[[#Action items]]"
        );
    }

    #[test]
    fn test_heading_without_current_file_is_empty() {
        let (providers, _) = setup(None);
        let m = matched("[[#", "");
        assert!(providers.get(m.strategy).unwrap().search(&m).is_empty());
    }

    #[test]
    fn test_block_search_and_splice() {
        let (providers, config) = setup(Some("daily/Journal.md"));
        let m = matched("[[Meeting#^ship", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(labels(&found), vec!["Ship the beta  ^abc123"]);
        assert_eq!(
            provider.splice(&found[0], &m, &config).text,
            "[[Meeting#^abc123]]"
        );
    }

    #[test]
    fn test_anchor_splice_keeps_link_open() {
        let (providers, config) = setup(None);
        let m = matched("[[jour", "]]");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        let splice = provider
            .anchor_splice(&found[0], &m, &config, Anchor::Heading)
            .unwrap();
        assert_eq!(splice.text, "[[Journal#]]");
        assert_eq!(splice.caret, "[[Journal#".len());

        let no_pair = CompletionConfig {
            auto_pair_brackets: false,
            ..Default::default()
        };
        let m = matched("[[jour", "");
        let splice = provider
            .anchor_splice(&found[0], &m, &no_pair, Anchor::Block)
            .unwrap();
        assert_eq!(splice.text, "[[Journal#^");
    }

    #[test]
    fn test_time_slots() {
        let (providers, config) = setup(None);
        let m = matched("call @@10:", "");
        let provider = providers.get(m.strategy).unwrap();
        let found = provider.search(&m);
        assert_eq!(labels(&found)[..4], ["10:00", "10:15", "10:30", "10:45"]);
        assert_eq!(provider.splice(&found[0], &m, &config).text, "@@{10:00}");

        let all = provider.search(&matched("@@", ""));
        assert_eq!(all.len(), 96);
    }

    #[test]
    fn test_empty_metadata_gives_no_candidates() {
        let config = CompletionConfig::default();
        let catalog = Rc::new(Catalog::snapshot(&NoteSet::default(), None));
        let providers = Providers::new(catalog, &config);
        for before in ["#", "[[", "[[a#", "[[a^"] {
            let m = matched(before, "");
            assert!(providers.get(m.strategy).unwrap().search(&m).is_empty());
        }
        assert!(providers.get(Strategy::Date).is_none());
    }
}
