use std::collections::HashSet;

use indexmap::IndexMap;

use super::entity::{BlockRef, HeadingRef, LinkTarget, Note, link_matches};
use crate::complete::MetadataSource;

/// An in-memory set of parsed notes, served as autocomplete metadata.
#[derive(Debug, Clone, Default)]
pub struct NoteSet {
    notes: Vec<Note>,
}

impl NoteSet {
    pub fn new(notes: Vec<Note>) -> Self {
        NoteSet { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, path: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.path == path)
    }

    /// Replace the note with the same path, or append it.
    pub fn upsert(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.path == note.path) {
            Some(slot) => *slot = note,
            None => self.notes.push(note),
        }
    }

    /// Whether some note answers to `linktext`.
    pub fn resolves(&self, linktext: &str) -> bool {
        self.notes.iter().any(|n| link_matches(linktext, &n.path))
    }
}

impl MetadataSource for NoteSet {
    /// Tags by number of uses, most used first; ties keep first appearance.
    /// Casing follows the first occurrence.
    fn tags(&self) -> Vec<String> {
        let mut counts: IndexMap<String, (String, usize)> = IndexMap::new();
        for tag in self.notes.iter().flat_map(|n| &n.tags) {
            let entry = counts
                .entry(tag.to_lowercase())
                .or_insert_with(|| (tag.clone(), 0));
            entry.1 += 1;
        }
        let mut tags: Vec<(String, usize)> = counts.into_values().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1));
        tags.into_iter().map(|(tag, _)| tag).collect()
    }

    /// Every note, then each alias, then link texts no note resolves.
    fn link_targets(&self) -> Vec<LinkTarget> {
        let mut targets = Vec::new();
        for note in &self.notes {
            targets.push(LinkTarget::file(&note.path));
            for alias in &note.aliases {
                targets.push(LinkTarget::aliased(&note.path, alias));
            }
        }

        let mut unresolved = HashSet::new();
        for link in self.notes.iter().flat_map(|n| &n.links) {
            let text = link.target.trim();
            if text.is_empty() || self.resolves(text) {
                continue;
            }
            if unresolved.insert(text.to_lowercase()) {
                targets.push(LinkTarget::unresolved(text));
            }
        }
        targets
    }

    fn headings(&self, path: &str) -> Vec<HeadingRef> {
        self.get(path).map(|n| n.headings.clone()).unwrap_or_default()
    }

    fn blocks(&self, path: &str) -> Vec<BlockRef> {
        self.get(path).map(|n| n.blocks.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WikiLink;
    use pretty_assertions::assert_eq;

    fn link(target: &str) -> WikiLink {
        WikiLink {
            target: target.into(),
            subpath: None,
            alias: None,
            embed: false,
        }
    }

    #[test]
    fn test_tags_merge_case_and_sort_by_use() {
        let set = NoteSet::new(vec![
            Note {
                path: "a.md".into(),
                tags: vec!["Rust".into(), "idea".into()],
                ..Default::default()
            },
            Note {
                path: "b.md".into(),
                tags: vec!["rust".into()],
                ..Default::default()
            },
        ]);
        assert_eq!(set.tags(), vec!["Rust", "idea"]);
    }

    #[test]
    fn test_unresolved_targets_deduplicated() {
        let set = NoteSet::new(vec![
            Note {
                path: "a.md".into(),
                links: vec![link("b"), link("Later"), link("later"), link("")],
                ..Default::default()
            },
            Note {
                path: "sub/b.md".into(),
                ..Default::default()
            },
        ]);
        assert_eq!(
            set.link_targets(),
            vec![
                LinkTarget::file("a.md"),
                LinkTarget::file("sub/b.md"),
                LinkTarget::unresolved("Later"),
            ]
        );
    }

    #[test]
    fn test_upsert_replaces_by_path() {
        let mut set = NoteSet::default();
        set.upsert(Note {
            path: "a.md".into(),
            tags: vec!["old".into()],
            ..Default::default()
        });
        set.upsert(Note {
            path: "a.md".into(),
            tags: vec!["new".into()],
            ..Default::default()
        });
        assert_eq!(set.notes().len(), 1);
        assert_eq!(set.tags(), vec!["new"]);
    }

    #[test]
    fn test_missing_note_has_no_headings() {
        assert!(NoteSet::default().headings("nope.md").is_empty());
    }
}
