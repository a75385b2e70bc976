//! Command tree with prefix-abbreviation-aware lookup.

use std::fmt;

use thiserror::Error;

use super::keyword::Keyword;

/// Whether a command reads state or changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandKind {
    /// Path ends in `?`.
    Query,
    /// Anything else.
    Set,
}

impl CommandKind {
    /// Splits a trailing query marker off a command head.
    pub(crate) fn split(head: &str) -> (&str, Self) {
        head.strip_suffix('?')
            .map_or((head, Self::Set), |stem| (stem, Self::Query))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Query => "query",
            Self::Set => "set",
        })
    }
}

/// Errors raised while building the tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A path segment is empty or not a valid keyword template.
    #[error("malformed keyword '{segment}' in command path '{path}'")]
    MalformedKeyword {
        /// Template being registered.
        path: String,
        /// Offending segment.
        segment: String,
    },
    /// Two templates spell the same keyword with different short forms.
    #[error("keyword '{segment}' in '{path}' conflicts with registered '{existing}'")]
    ConflictingKeyword {
        /// Template being registered.
        path: String,
        /// Segment as spelled in `path`.
        segment: String,
        /// Template of the keyword already in the tree.
        existing: String,
    },
    /// The same path and kind were registered twice.
    #[error("duplicate {kind} handler for '{path}'")]
    Duplicate {
        /// Path without the query marker.
        path: String,
        /// Slot claimed twice.
        kind: CommandKind,
    },
}

/// Result of a successful lookup.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Resolved<'a, H> {
    pub(crate) handler: &'a H,
    pub(crate) kind: CommandKind,
    /// Unconsumed keywords joined by `:`, a space, then the parameter tail.
    pub(crate) residual: String,
    /// Path keywords past the resolved node that ended up in `residual`.
    pub(crate) unconsumed: usize,
}

#[derive(Debug)]
struct Node<H> {
    keyword: Option<Keyword>,
    children: Vec<Self>,
    query: Option<H>,
    set: Option<H>,
}

impl<H> Node<H> {
    const fn new(keyword: Option<Keyword>) -> Self {
        Self {
            keyword,
            children: Vec::new(),
            query: None,
            set: None,
        }
    }

    const fn slot(&self, kind: CommandKind) -> Option<&H> {
        match kind {
            CommandKind::Query => self.query.as_ref(),
            CommandKind::Set => self.set.as_ref(),
        }
    }

    const fn slot_mut(&mut self, kind: CommandKind) -> &mut Option<H> {
        match kind {
            CommandKind::Query => &mut self.query,
            CommandKind::Set => &mut self.set,
        }
    }

    /// Children accepting `input`, exact spellings first, otherwise in
    /// registration order.
    fn candidates(&self, input: &str) -> Vec<&Self> {
        let (exact, prefixed): (Vec<&Self>, Vec<&Self>) = self
            .children
            .iter()
            .filter(|child| {
                child
                    .keyword
                    .as_ref()
                    .is_some_and(|keyword| keyword.matches(input))
            })
            .partition(|child| {
                child
                    .keyword
                    .as_ref()
                    .is_some_and(|keyword| keyword.matches_exactly(input))
            });
        exact.into_iter().chain(prefixed).collect()
    }
}

/// Registry of command paths built once at startup and read-only afterwards.
#[derive(Debug)]
pub(crate) struct CommandTree<H> {
    root: Node<H>,
    len: usize,
}

impl<H> Default for CommandTree<H> {
    fn default() -> Self {
        Self {
            root: Node::new(None),
            len: 0,
        }
    }
}

impl<H> CommandTree<H> {
    /// Number of registered handlers.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Registers `handler` under a path template such as `TX:ALarm:TYPE?`.
    pub(crate) fn register(&mut self, template: &str, handler: H) -> Result<(), TreeError> {
        let (stem, kind) = CommandKind::split(template);
        let mut node = &mut self.root;
        for segment in stem.split(':') {
            let keyword = Keyword::parse(segment).ok_or_else(|| TreeError::MalformedKeyword {
                path: template.to_owned(),
                segment: segment.to_owned(),
            })?;
            node = child_for(node, keyword, template, segment)?;
        }
        let slot = node.slot_mut(kind);
        if slot.is_some() {
            return Err(TreeError::Duplicate {
                path: stem.to_owned(),
                kind,
            });
        }
        *slot = Some(handler);
        self.len += 1;
        Ok(())
    }

    /// Resolves a normalised command line to its handler.
    ///
    /// The head (text before the first whitespace) is split on `:` and walked
    /// depth first. The deepest node holding a handler of the requested kind
    /// wins; keywords past that node are handed to the handler as parameters.
    pub(crate) fn lookup(&self, line: &str) -> Option<Resolved<'_, H>> {
        let (head, tail) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(head, tail)| (head, tail.trim_start()));
        let (stem, kind) = CommandKind::split(head);
        let segments: Vec<&str> = stem.split(':').collect();
        let (handler, consumed) = walk(&self.root, &segments, kind)?;

        let leftover = segments.get(consumed..).unwrap_or_default();
        let keywords = leftover.join(":");
        let residual = match (keywords.is_empty(), tail.is_empty()) {
            (true, _) => tail.to_owned(),
            (false, true) => keywords,
            (false, false) => format!("{keywords} {tail}"),
        };
        Some(Resolved {
            handler,
            kind,
            residual,
            unconsumed: leftover.len(),
        })
    }
}

fn child_for<'a, H>(
    node: &'a mut Node<H>,
    keyword: Keyword,
    template: &str,
    segment: &str,
) -> Result<&'a mut Node<H>, TreeError> {
    let existing = node.children.iter().position(|child| {
        child
            .keyword
            .as_ref()
            .is_some_and(|known| known.spelling() == keyword.spelling())
    });
    let index = match existing {
        Some(index) => {
            let known = node.children.get(index).and_then(|child| child.keyword.as_ref());
            if let Some(known) = known
                && known.mandatory() != keyword.mandatory()
            {
                return Err(TreeError::ConflictingKeyword {
                    path: template.to_owned(),
                    segment: segment.to_owned(),
                    existing: known.to_string(),
                });
            }
            index
        }
        None => {
            node.children.push(Node::new(Some(keyword)));
            node.children.len() - 1
        }
    };
    node.children
        .get_mut(index)
        .ok_or_else(|| TreeError::MalformedKeyword {
            path: template.to_owned(),
            segment: segment.to_owned(),
        })
}

fn walk<'a, H>(node: &'a Node<H>, segments: &[&str], kind: CommandKind) -> Option<(&'a H, usize)> {
    walk_from(node, segments, 0, kind)
}

fn walk_from<'a, H>(
    node: &'a Node<H>,
    segments: &[&str],
    depth: usize,
    kind: CommandKind,
) -> Option<(&'a H, usize)> {
    if let Some(input) = segments.get(depth) {
        for child in node.candidates(input) {
            if let Some(found) = walk_from(child, segments, depth + 1, kind) {
                return Some(found);
            }
        }
    }
    node.slot(kind).map(|handler| (handler, depth))
}
