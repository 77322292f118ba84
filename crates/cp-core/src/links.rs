//! Wikilinks and link resolution.
//!
//! A wikilink is `[[target#subpath|alias]]`. The host decides how link text
//! maps to documents through [`LinkResolver`]; [`PathIndex`] is the standard
//! implementation over a flat list of vault paths.

/// Resolves link text to documents and back.
///
/// Implemented by each host environment:
/// - CLI: a [`PathIndex`] built from the vault directory
/// - tests: a [`PathIndex`] over a fixed list
pub trait LinkResolver {
    /// Shortest link text that unambiguously reaches `target` from `source`.
    fn link_text(&self, target: &str, source: &str) -> String;

    /// The document `link` points to when written inside `source`.
    fn resolve_link(&self, link: &str, source: &str) -> Option<String>;
}

/// Wikilink to `target` (plus optional `#subpath`) as written in `source`.
pub fn wikilink(
    resolver: &dyn LinkResolver,
    target: &str,
    subpath: Option<&str>,
    source: &str,
) -> String {
    format!(
        "[[{}{}]]",
        resolver.link_text(target, source),
        subpath.unwrap_or_default()
    )
}

/// The text between `[[` and `]]`, if `value` is a wikilink.
pub fn wikilink_inner(value: &str) -> Option<&str> {
    value.strip_prefix("[[")?.strip_suffix("]]")
}

pub fn is_wikilink(value: &str) -> bool {
    wikilink_inner(value).is_some()
}

/// `http…` with `//` somewhere, at least 8 characters long.
pub fn is_url(value: &str) -> bool {
    value.len() >= 8
        && value
            .get(..4)
            .is_some_and(|p| p.eq_ignore_ascii_case("http"))
        && value.contains("//")
}

/// Parts of a wikilink body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParts<'a> {
    pub target: &'a str,
    /// Includes the leading `#`.
    pub subpath: Option<&'a str>,
    pub alias: Option<&'a str>,
}

/// Split `target#subpath|alias`.
pub fn split_link(inner: &str) -> LinkParts<'_> {
    let (body, alias) = match inner.split_once('|') {
        Some((body, alias)) => (body, Some(alias)),
        None => (inner, None),
    };
    let (target, subpath) = match body.find('#') {
        Some(at) => (&body[..at], Some(&body[at..])),
        None => (body, None),
    };
    LinkParts {
        target,
        subpath,
        alias,
    }
}

/// Outcome of resolving a wikilink value to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Resolved document path, or the literal link body when broken.
    pub path: String,
    pub subpath: Option<String>,
    pub broken: bool,
}

/// Resolve the body of a wikilink found in `source`.
///
/// The literal body is tried first; failing that, the alias and subpath are
/// stripped and the bare target is resolved, keeping the subpath. A link that
/// still does not resolve is returned as-is and flagged broken.
pub fn resolve_wikilink(resolver: &dyn LinkResolver, inner: &str, source: &str) -> ResolvedLink {
    if let Some(path) = resolver.resolve_link(inner, source) {
        return ResolvedLink {
            path,
            subpath: None,
            broken: false,
        };
    }

    let parts = split_link(inner);
    if let Some(path) = resolver.resolve_link(parts.target, source) {
        return ResolvedLink {
            path,
            subpath: parts.subpath.map(str::to_string),
            broken: false,
        };
    }

    log::warn!("link [[{inner}]] in {source} does not resolve; keeping it as written");
    ResolvedLink {
        path: inner.to_string(),
        subpath: None,
        broken: true,
    }
}

// ─── Path index ──────────────────────────────────────────────────────────

/// Link resolution over a list of vault-relative paths.
///
/// Markdown documents are linked without their `.md` extension; other files
/// keep theirs. A bare file name is used when it is unique in the vault,
/// otherwise the full path.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    paths: Vec<String>,
}

impl PathIndex {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn folder(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

fn strip_md(path: &str) -> &str {
    path.strip_suffix(".md").unwrap_or(path)
}

impl LinkResolver for PathIndex {
    fn link_text(&self, target: &str, _source: &str) -> String {
        let name = file_name(target);
        let clashes = self.paths.iter().filter(|p| file_name(p) == name).count();
        if clashes <= 1 {
            strip_md(name).to_string()
        } else {
            strip_md(target).to_string()
        }
    }

    fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }
        let wanted = strip_md(link).to_lowercase();
        let matches_link = |path: &&String| {
            let candidate = if link.contains('/') {
                strip_md(path)
            } else {
                strip_md(file_name(path))
            };
            candidate.to_lowercase() == wanted
        };

        let candidates: Vec<&String> = self.paths.iter().filter(matches_link).collect();
        let here = folder(source);
        candidates
            .iter()
            .find(|p| folder(p) == here)
            .or_else(|| candidates.first())
            .map(|p| (*p).clone())
    }
}
