use std::sync::LazyLock;

use regex::Regex;

use crate::model::{BlockRef, HeadingRef, Note, WikiLink};

static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\[\]|#^]*)((?:#[^\[\]|]*)?)(?:\|([^\[\]]*))?\]\]")
        .expect("valid wikilink regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").expect("valid tag regex"));

static BLOCK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\^([A-Za-z0-9\-]+)\s*$").expect("valid block id regex"));

static CODE_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").expect("valid code span regex"));

/// Extract tags, headings, block ids, wikilinks and frontmatter aliases
/// from one note. Fenced code blocks and inline code are skipped.
pub fn parse_note(path: &str, source: &str) -> Note {
    let mut note = Note {
        path: path.to_string(),
        ..Default::default()
    };

    let mut lines = source.lines().peekable();
    if lines.peek().is_some_and(|l| l.trim_end() == "---") {
        lines.next();
        let mut frontmatter = Vec::new();
        for line in lines.by_ref() {
            if line.trim_end() == "---" {
                break;
            }
            frontmatter.push(line);
        }
        parse_frontmatter(&frontmatter, &mut note);
    }

    let mut in_fence = false;
    for line in lines {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(heading) = parse_heading(line) {
            note.headings.push(heading);
            continue;
        }

        let text = CODE_SPAN_RE.replace_all(line, "");
        for caps in TAG_RE.captures_iter(&text) {
            let tag = &caps[1];
            // A tag needs at least one non-digit character
            if tag.chars().any(|c| !c.is_ascii_digit()) {
                push_unique(&mut note.tags, tag);
            }
        }
        for caps in WIKILINK_RE.captures_iter(&text) {
            let subpath = caps.get(3).map(|m| m.as_str()).filter(|s| !s.is_empty());
            note.links.push(WikiLink {
                target: caps[2].trim().to_string(),
                subpath: subpath.map(str::to_string),
                alias: caps.get(4).map(|m| m.as_str().to_string()),
                embed: &caps[1] == "!",
            });
        }
        if let Some(caps) = BLOCK_ID_RE.captures(line) {
            let marker = caps.get(0).map_or(line.len(), |m| m.start());
            note.blocks.push(BlockRef {
                id: caps[1].to_string(),
                text: strip_list_marker(line[..marker].trim()).to_string(),
            });
        }
    }
    note
}

/// `## Title ##` → level 2, "Title"
fn parse_heading(line: &str) -> Option<HeadingRef> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }
    Some(HeadingRef {
        text: text.to_string(),
        level: hashes as u8,
    })
}

fn strip_list_marker(text: &str) -> &str {
    for marker in ["- [ ] ", "- [x] ", "- ", "* ", "+ ", "> "] {
        if let Some(rest) = text.strip_prefix(marker) {
            return rest;
        }
    }
    text
}

/// Reads `aliases` and `tags`, either inline (`[a, b]`, `a`) or as a
/// following `- item` list.
fn parse_frontmatter(lines: &[&str], note: &mut Note) {
    let mut current: Option<&str> = None;
    for line in lines {
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            if let Some(key) = current {
                push_value(note, key, item);
            }
            continue;
        }
        current = None;
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key != "aliases" && key != "tags" {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            current = Some(key);
            continue;
        }
        let value = value
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .unwrap_or(value);
        for item in value.split(',') {
            push_value(note, key, item);
        }
    }
}

fn push_value(note: &mut Note, key: &str, raw: &str) {
    let value = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if value.is_empty() {
        return;
    }
    match key {
        "aliases" => push_unique(&mut note.aliases, value),
        "tags" => push_unique(&mut note.tags, value.trim_start_matches('#')),
        _ => {}
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
---
aliases: [Standup, \"Daily sync\"]
tags:
  - meeting
---
# Weekly meeting

Discussed #project and #road-map. Not a tag: issue#4 or #2024.

## Action items ##

- Ship the beta ^ship-it
- See [[Journal#Morning|the journal]] and ![[diagram.png]]

```
# not a heading #nope [[nope]]
```

Inline `#code` is skipped. [[Someday]]
";

    #[test]
    fn test_frontmatter() {
        let note = parse_note("Meeting.md", SAMPLE);
        assert_eq!(note.aliases, vec!["Standup", "Daily sync"]);
        assert_eq!(note.tags[0], "meeting");
    }

    #[test]
    fn test_tags() {
        let note = parse_note("Meeting.md", SAMPLE);
        assert_eq!(note.tags, vec!["meeting", "project", "road-map"]);
    }

    #[test]
    fn test_headings() {
        let note = parse_note("Meeting.md", SAMPLE);
        assert_eq!(
            note.headings,
            vec![
                HeadingRef {
                    text: "Weekly meeting".into(),
                    level: 1
                },
                HeadingRef {
                    text: "Action items".into(),
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn test_blocks() {
        let note = parse_note("Meeting.md", SAMPLE);
        assert_eq!(
            note.blocks,
            vec![BlockRef {
                id: "ship-it".into(),
                text: "Ship the beta".into(),
            }]
        );
    }

    #[test]
    fn test_wikilinks() {
        let note = parse_note("Meeting.md", SAMPLE);
        assert_eq!(note.links.len(), 3);
        assert_eq!(
            note.links[0],
            WikiLink {
                target: "Journal".into(),
                subpath: Some("#Morning".into()),
                alias: Some("the journal".into()),
                embed: false,
            }
        );
        assert!(note.links[1].embed);
        assert_eq!(note.links[2].target, "Someday");
    }

    #[test]
    fn test_heading_rules() {
        assert_eq!(parse_heading("#tag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("#"), None);
        assert_eq!(parse_heading("### Three").unwrap().level, 3);
    }

    #[test]
    fn test_empty_note() {
        let note = parse_note("empty.md", "");
        assert_eq!(note, Note {
            path: "empty.md".into(),
            ..Default::default()
        });
    }
}
