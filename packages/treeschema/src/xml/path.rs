//! Compiled path expressions for selecting elements.
//!
//! Supports the XPath subset that schemas need:
//!
//! - `a/b/c` child steps, `*` for any element
//! - `.` and `..` for the current element and its parent
//! - `//` for descendant-or-self before the next step
//! - a leading `/` to start at the document root
//! - predicates `[2]`, `[last()]`, `[@id]` and `[@id='7']`
//!
//! Selections are returned in document order without duplicates.

use std::fmt;
use std::str::FromStr;

use roxmltree::Node;

use crate::error::{DecodeError, Result};
use crate::xml::utils::{element_children, has_tag};

/// A compiled path expression.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use treeschema::xml::Path;
///
/// let doc = Document::parse("<CATALOG><CD>a</CD><CD>b</CD></CATALOG>").unwrap();
/// let path = Path::parse("CD[2]").unwrap();
/// let found = path.select(doc.root_element());
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].text(), Some("b"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    expr: String,
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    /// Preceded by `//`.
    descendant: bool,
    axis: Axis,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
enum Axis {
    Current,
    Parent,
    Child(NameTest),
}

#[derive(Debug, Clone, PartialEq)]
enum NameTest {
    Any,
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// 1-based position.
    Position(usize),
    Last,
    HasAttribute(String),
    AttributeEquals(String, String),
}

impl Path {
    /// Compile a path expression.
    ///
    /// # Errors
    /// Returns `DecodeError::Validation` for malformed expressions.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            DecodeError::validation(format!("Invalid path expression '{expr}': {reason}"))
        };

        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty expression"));
        }

        let parts = split_steps(trimmed).ok_or_else(|| invalid("unbalanced brackets or quotes"))?;
        let last = parts.len() - 1;

        let mut absolute = false;
        let mut descendant = false;
        let mut steps = Vec::new();

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                if i == 0 {
                    absolute = true;
                    continue;
                }
                if i == last {
                    return Err(invalid("trailing '/'"));
                }
                if descendant {
                    return Err(invalid("too many consecutive '/'"));
                }
                descendant = true;
                continue;
            }

            let step = parse_step(part.trim(), descendant).map_err(|reason| invalid(&reason))?;
            steps.push(step);
            descendant = false;
        }

        if steps.is_empty() {
            return Err(invalid("no steps"));
        }

        Ok(Self {
            expr: expr.to_string(),
            absolute,
            steps,
        })
    }

    /// The expression this path was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Select the nodes matched by this path, relative to `node`.
    pub fn select<'a, 'input>(&self, node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        let start = if self.absolute {
            node.document().root()
        } else {
            node
        };

        let mut current = vec![start];
        for step in &self.steps {
            let mut next = Vec::new();
            for context in &current {
                if step.descendant {
                    for descendant in context
                        .descendants()
                        .filter(|d| d.is_element() || d.is_root())
                    {
                        next.extend(step.apply(descendant));
                    }
                } else {
                    next.extend(step.apply(*context));
                }
            }

            // Steps like `..` and `//` can reach the same node twice
            next.sort_by_key(|n| n.id().get());
            next.dedup_by_key(|n| n.id().get());

            current = next;
            if current.is_empty() {
                break;
            }
        }

        current
    }
}

impl Step {
    fn apply<'a, 'input>(&self, context: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        let mut nodes: Vec<Node<'a, 'input>> = match &self.axis {
            Axis::Current => vec![context],
            Axis::Parent => context.parent().into_iter().collect(),
            Axis::Child(test) => element_children(context)
                .filter(|child| test.matches(*child))
                .collect(),
        };

        for predicate in &self.predicates {
            nodes = predicate.filter(nodes);
        }
        nodes
    }
}

impl NameTest {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::Any => true,
            // Plain names never match namespaced elements
            Self::Name(name) => node.tag_name().namespace().is_none() && has_tag(node, name),
        }
    }
}

impl Predicate {
    fn filter<'a, 'input>(&self, nodes: Vec<Node<'a, 'input>>) -> Vec<Node<'a, 'input>> {
        match self {
            Self::Position(position) => nodes.into_iter().nth(position - 1).into_iter().collect(),
            Self::Last => nodes.last().copied().into_iter().collect(),
            Self::HasAttribute(name) => nodes
                .into_iter()
                .filter(|n| n.attribute(name.as_str()).is_some())
                .collect(),
            Self::AttributeEquals(name, value) => nodes
                .into_iter()
                .filter(|n| n.attribute(name.as_str()) == Some(value.as_str()))
                .collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

impl FromStr for Path {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split on `/` outside of predicates and quoted strings.
fn split_steps(expr: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in expr.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    parts.push(&expr[start..]);
    Some(parts)
}

fn parse_step(part: &str, descendant: bool) -> std::result::Result<Step, String> {
    match part {
        "." => {
            return Ok(Step {
                descendant,
                axis: Axis::Current,
                predicates: Vec::new(),
            })
        }
        ".." => {
            return Ok(Step {
                descendant,
                axis: Axis::Parent,
                predicates: Vec::new(),
            })
        }
        _ => {}
    }

    let (name, mut rest) = match part.find('[') {
        Some(pos) => (part[..pos].trim(), &part[pos..]),
        None => (part, ""),
    };

    let test = if name == "*" {
        NameTest::Any
    } else if is_valid_name(name) {
        NameTest::Name(name.to_string())
    } else {
        return Err(format!("invalid step '{part}'"));
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let close = find_predicate_end(rest).ok_or_else(|| format!("unclosed predicate in '{part}'"))?;
        predicates.push(parse_predicate(rest[1..close].trim())?);
        rest = rest[close + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(format!("unexpected '{rest}' after predicate"));
        }
    }

    Ok(Step {
        descendant,
        axis: Axis::Child(test),
        predicates,
    })
}

/// Index of the `]` closing the predicate that opens at `rest[0]`.
fn find_predicate_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(inner: &str) -> std::result::Result<Predicate, String> {
    if inner == "last()" {
        return Ok(Predicate::Last);
    }

    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        return match inner.parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("invalid position [{inner}]")),
            Ok(position) => Ok(Predicate::Position(position)),
        };
    }

    let Some(attr) = inner.strip_prefix('@') else {
        return Err(format!("unsupported predicate [{inner}]"));
    };

    match attr.split_once('=') {
        None => {
            let name = attr.trim();
            if is_valid_name(name) {
                Ok(Predicate::HasAttribute(name.to_string()))
            } else {
                Err(format!("invalid attribute name in [{inner}]"))
            }
        }
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            if !is_valid_name(name) {
                return Err(format!("invalid attribute name in [{inner}]"));
            }
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .ok_or_else(|| format!("attribute value must be quoted in [{inner}]"))?;
            Ok(Predicate::AttributeEquals(
                name.to_string(),
                unquoted.to_string(),
            ))
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
