//! CSS selector subset used by `MemoryDom`.
//!
//! Supported grammar: selector lists (`a, b`), descendant (`a b`) and child
//! (`a > b`) combinators, and compounds built from `tag`, `*`, `.class` and
//! `#id`. This covers every selector the site components issue.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selector parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    DanglingCombinator(String),
    Unsupported(String),
}

impl Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "selector must not be empty"),
            Self::DanglingCombinator(value) => {
                write!(f, "selector has a dangling combinator: `{value}`")
            }
            Self::Unsupported(value) => write!(f, "unsupported selector syntax: `{value}`"),
        }
    }
}

impl Error for SelectorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// One complex selector; `parts[0]` is the leftmost compound and its
/// combinator is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

/// Parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Read access to an element tree, implemented by `MemoryDom` internals.
pub(crate) trait ElementTree {
    type Id: Copy;

    fn parent_of(&self, id: Self::Id) -> Option<Self::Id>;
    fn tag_of(&self, id: Self::Id) -> &str;
    fn id_of(&self, id: Self::Id) -> Option<&str>;
    fn has_class_of(&self, id: Self::Id, class: &str) -> bool;
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for alternative in source.split(',') {
            alternatives.push(parse_complex(alternative)?);
        }
        if alternatives.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { alternatives })
    }

    pub(crate) fn matches<T: ElementTree>(&self, tree: &T, id: T::Id) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_from(tree, complex, complex.parts.len() - 1, id))
    }
}

fn parse_complex(source: &str) -> Result<Complex, SelectorError> {
    let spaced = source.replace('>', " > ");
    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut saw_child = false;

    for token in spaced.split_whitespace() {
        if token == ">" {
            if parts.is_empty() || saw_child {
                return Err(SelectorError::DanglingCombinator(source.trim().to_string()));
            }
            pending = Combinator::Child;
            saw_child = true;
            continue;
        }
        parts.push((pending, parse_compound(token)?));
        pending = Combinator::Descendant;
        saw_child = false;
    }

    if saw_child {
        return Err(SelectorError::DanglingCombinator(source.trim().to_string()));
    }
    if parts.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(Complex { parts })
}

fn parse_compound(token: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut rest = token;

    let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    if !tag.is_empty() && tag != "*" {
        if !is_ident(tag) {
            return Err(SelectorError::Unsupported(token.to_string()));
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[tag_end..];

    while let Some(marker) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let name = &body[..end];
        if !is_ident(name) {
            return Err(SelectorError::Unsupported(token.to_string()));
        }
        match marker {
            '.' => compound.classes.push(name.to_string()),
            '#' => compound.id = Some(name.to_string()),
            _ => return Err(SelectorError::Unsupported(token.to_string())),
        }
        rest = &body[end..];
    }

    Ok(compound)
}

fn is_ident(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn compound_matches<T: ElementTree>(tree: &T, compound: &Compound, id: T::Id) -> bool {
    if let Some(tag) = &compound.tag {
        if !tree.tag_of(id).eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(expected) = &compound.id {
        if tree.id_of(id) != Some(expected.as_str()) {
            return false;
        }
    }
    compound
        .classes
        .iter()
        .all(|class| tree.has_class_of(id, class))
}

fn matches_from<T: ElementTree>(tree: &T, complex: &Complex, index: usize, id: T::Id) -> bool {
    let (combinator, compound) = &complex.parts[index];
    if !compound_matches(tree, compound, id) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match combinator {
        Combinator::Child => tree
            .parent_of(id)
            .is_some_and(|parent| matches_from(tree, complex, index - 1, parent)),
        Combinator::Descendant => {
            let mut cursor = tree.parent_of(id);
            while let Some(ancestor) = cursor {
                if matches_from(tree, complex, index - 1, ancestor) {
                    return true;
                }
                cursor = tree.parent_of(ancestor);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Selector, SelectorError};

    #[test]
    fn parses_site_selector_list() {
        let selector = Selector::parse(".card, .heritage-content > *, .section-header > *")
            .expect("site selector should parse");
        assert_eq!(selector.alternatives.len(), 3);
        assert_eq!(selector.alternatives[1].parts.len(), 2);
    }

    #[test]
    fn parses_compound_tag_class_id() {
        let selector = Selector::parse("img.hero#main").expect("compound should parse");
        let compound = &selector.alternatives[0].parts[0].1;
        assert_eq!(compound.tag.as_deref(), Some("img"));
        assert_eq!(compound.id.as_deref(), Some("main"));
        assert_eq!(compound.classes, vec!["hero".to_string()]);
    }

    #[test]
    fn rejects_dangling_child_combinator() {
        let err = Selector::parse(".a >").expect_err("dangling combinator must fail");
        assert!(matches!(err, SelectorError::DanglingCombinator(_)));
    }

    #[test]
    fn rejects_attribute_selectors() {
        let err = Selector::parse("a[href]").expect_err("attribute selectors unsupported");
        assert!(matches!(err, SelectorError::Unsupported(_)));
    }
}
