use serde::Serialize;

/// Something a wikilink can point at: an existing note, an alias of a note,
/// or a link text that no note resolves yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTarget {
    /// Vault-relative path (`notes/Meeting.md`), or the raw link text for
    /// unresolved targets.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Whether a backing file exists
    pub exists: bool,
}

impl LinkTarget {
    pub fn file(path: impl Into<String>) -> Self {
        LinkTarget {
            path: path.into(),
            alias: None,
            exists: true,
        }
    }

    pub fn aliased(path: impl Into<String>, alias: impl Into<String>) -> Self {
        LinkTarget {
            path: path.into(),
            alias: Some(alias.into()),
            exists: true,
        }
    }

    pub fn unresolved(linktext: impl Into<String>) -> Self {
        LinkTarget {
            path: linktext.into(),
            alias: None,
            exists: false,
        }
    }

    /// Name shown in the dropdown
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRef {
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRef {
    /// Block id without the leading `^`
    pub id: String,
    /// Line content with the `^id` marker removed
    pub text: String,
}

/// A `[[target#subpath|alias]]` occurrence inside a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub target: String,
    pub subpath: Option<String>,
    pub alias: Option<String>,
    pub embed: bool,
}

/// Metadata extracted from one markdown note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub path: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub headings: Vec<HeadingRef>,
    pub blocks: Vec<BlockRef>,
    pub links: Vec<WikiLink>,
}

/// Path with a trailing `.md` removed; other extensions are kept.
pub fn strip_md(path: &str) -> &str {
    path.strip_suffix(".md").unwrap_or(path)
}

/// File name of `path` without directories and without `.md`.
pub fn stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    strip_md(name)
}

/// Whether link text as typed inside `[[...]]` refers to `path`.
///
/// Matches case-insensitively against the full path or the bare file name,
/// with or without the `.md` extension.
pub fn link_matches(linktext: &str, path: &str) -> bool {
    let linktext = strip_md(linktext.trim());
    if linktext.is_empty() {
        return false;
    }
    if linktext.contains('/') {
        strip_md(path).eq_ignore_ascii_case(linktext)
    } else {
        stem(path).eq_ignore_ascii_case(linktext)
    }
}
