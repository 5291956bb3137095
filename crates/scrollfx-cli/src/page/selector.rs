//! Minimal CSS selector matching for the in-memory page.
//!
//! Supports type, `*`, `.class`, `#id`, `[attr]` and `[attr=value]` simple
//! selectors, descendant and `>` child combinators, and `,` selector lists.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, Option<String>)>,
}

/// Anything the matcher needs to know about a node
pub trait Element {
    fn tag(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
}

impl Compound {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(element.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match (element.attr(name), value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        })
    }
}

/// One complex selector: compounds joined by combinators, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    pub first: Compound,
    pub rest: Vec<(Combinator, Compound)>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let error = |reason| SelectorError {
            selector: input.to_string(),
            reason,
        };

        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(error("empty selector"));
            }
            alternatives.push(parse_complex(part).map_err(error)?);
        }
        Ok(Self { alternatives })
    }

    /// Match `node`, walking ancestors through `parent_of`
    pub fn matches<E, P>(&self, node: usize, element_of: &impl Fn(usize) -> E, parent_of: &P) -> bool
    where
        E: Element,
        P: Fn(usize) -> Option<usize>,
    {
        self.alternatives
            .iter()
            .any(|complex| matches_from(complex, complex.rest.len(), node, element_of, parent_of))
    }
}

/// Compound `index` (0 = `first`) of `complex`
fn compound_at(complex: &Complex, index: usize) -> &Compound {
    if index == 0 {
        &complex.first
    } else {
        &complex.rest[index - 1].1
    }
}

fn matches_from<E, P>(
    complex: &Complex,
    index: usize,
    node: usize,
    element_of: &impl Fn(usize) -> E,
    parent_of: &P,
) -> bool
where
    E: Element,
    P: Fn(usize) -> Option<usize>,
{
    if !compound_at(complex, index).matches(&element_of(node)) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match complex.rest[index - 1].0 {
        Combinator::Child => parent_of(node)
            .map_or(false, |parent| matches_from(complex, index - 1, parent, element_of, parent_of)),
        Combinator::Descendant => {
            let mut ancestor = parent_of(node);
            while let Some(candidate) = ancestor {
                if matches_from(complex, index - 1, candidate, element_of, parent_of) {
                    return true;
                }
                ancestor = parent_of(candidate);
            }
            false
        }
    }
}

fn parse_complex(input: &str) -> Result<Complex, &'static str> {
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            if pending.is_none() && !compounds.is_empty() {
                pending = Some(Combinator::Descendant);
            }
            continue;
        }
        if c == '>' {
            chars.next();
            if compounds.is_empty() || pending == Some(Combinator::Child) {
                return Err("misplaced '>'");
            }
            pending = Some(Combinator::Child);
            continue;
        }

        let compound = parse_compound(&mut chars)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().ok_or("missing combinator")?);
        }
        compounds.push(compound);
    }

    if pending == Some(Combinator::Child) {
        return Err("dangling '>'");
    }

    let mut compounds = compounds.into_iter();
    let first = compounds.next().ok_or("empty selector")?;
    Ok(Complex {
        first,
        rest: combinators.into_iter().zip(compounds).collect(),
    })
}

fn parse_compound(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Compound, &'static str> {
    let mut compound = Compound::default();
    let mut parsed_any = false;

    while let Some(&c) = chars.peek() {
        match c {
            '*' => {
                chars.next();
            }
            '.' => {
                chars.next();
                compound.classes.push(read_ident(chars).ok_or("expected class name")?);
            }
            '#' => {
                chars.next();
                compound.id = Some(read_ident(chars).ok_or("expected id")?);
            }
            '[' => {
                chars.next();
                compound.attrs.push(read_attr(chars)?);
            }
            c if is_ident_char(c) => {
                if parsed_any {
                    return Err("type selector must come first");
                }
                compound.tag = read_ident(chars);
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return Err("unsupported character"),
        }
        parsed_any = true;
    }

    if parsed_any {
        Ok(compound)
    } else {
        Err("expected simple selector")
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    (!ident.is_empty()).then_some(ident)
}

fn read_attr(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<(String, Option<String>), &'static str> {
    let name = read_ident(chars).ok_or("expected attribute name")?;
    match chars.next() {
        Some(']') => Ok((name, None)),
        Some('=') => {
            let value = match chars.peek() {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == quote => break,
                            Some(c) => value.push(c),
                            None => return Err("unterminated attribute value"),
                        }
                    }
                    value
                }
                _ => read_ident(chars).ok_or("expected attribute value")?,
            };
            match chars.next() {
                Some(']') => Ok((name, Some(value))),
                _ => Err("expected ']'"),
            }
        }
        _ => Err("expected ']' or '='"),
    }
}
