//! Text encodings shared by [`Tree`](crate::Tree) and [`Heap`](crate::Heap).
//!
//! There are three of them:
//!
//! 1. The fixed listing, `[v1,v2,...]`. Trees list in order, heaps list level by level. This is
//!    what `Display` writes and `FromStr` reads.
//! 2. A [`Format`] token picking one of the six [`Traversal`]s. A bare token (`NLR`, `КЛП`) gives
//!    a listing in that order. A bracketed token (`{N}(L)[R]`, `{К}(Л)[П]`) wraps every value in
//!    the brackets of the role its node holds (the root, a left child or a right child) instead.
//! 3. A pair list, `[(child:parent),...]`, with the root written as its own parent.
//!
//! Every character the encodings use as structure (`\`, `,`, `:` and the bracket pairs) is
//! escaped with a backslash when it shows up inside a value's text, so any `Display` output
//! survives the trip. Whitespace around a value is not significant and is trimmed on decode.
//!
//! Decoding the first two only recovers *which* values were stored and feeds them back through
//! `insert`, so the decoded container satisfies its invariant but generally has a different shape
//! than the one that was encoded. Only the pair list describes positions.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::node::{Link, Node, Side};
use crate::traversal::{Role, Traversal, Walk};

/// Characters escaped inside encoded values.
const RESERVED: &[char] = &['\\', ',', ':', '(', ')', '[', ']', '{', '}', '<', '>'];

/// Bracket pairs a format token may wrap a role letter in.
const BRACKETS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

/// A traversal order plus, optionally, the brackets each role's values are wrapped in.
///
/// # Examples
///
/// ```
/// use bintree::{Format, Traversal, Tree};
///
/// let tree: Tree<i32> = [2, 1, 3].into_iter().collect();
///
/// let plain: Format = "КЛП".parse().unwrap();
/// assert_eq!(plain.order(), Traversal::PreOrder);
/// assert_eq!(tree.to_formatted(&plain), "[2,1,3]");
///
/// let bracketed: Format = "{К}(Л)[П]".parse().unwrap();
/// assert_eq!(tree.to_formatted(&bracketed), "{2}(1)[3]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    order: Traversal,
    /// Root, left and right brackets, in that order.
    brackets: Option<[(char, char); 3]>,
}

impl Format {
    /// A format listing values comma separated in `order`.
    pub fn plain(order: Traversal) -> Self {
        Self {
            order,
            brackets: None,
        }
    }

    /// A format wrapping each value in the bracket pair of its node's role.
    pub fn bracketed(
        order: Traversal,
        root: (char, char),
        left: (char, char),
        right: (char, char),
    ) -> Self {
        Self {
            order,
            brackets: Some([root, left, right]),
        }
    }

    /// The traversal this format lists values in.
    pub fn order(&self) -> Traversal {
        self.order
    }

    /// The brackets values of `role` are wrapped in, `None` for plain formats.
    pub fn brackets(&self, role: Role) -> Option<(char, char)> {
        self.brackets.map(|brackets| brackets[role_slot(role)])
    }
}

impl From<Traversal> for Format {
    fn from(order: Traversal) -> Self {
        Self::plain(order)
    }
}

fn role_slot(role: Role) -> usize {
    match role {
        Role::Root => 0,
        Role::Left => 1,
        Role::Right => 2,
    }
}

/// Cyrillic letters (Корень, Левое, Правое) and their Latin look-alikes or initials.
fn role_of(letter: char) -> Option<Role> {
    match letter {
        'К' | 'K' | 'N' => Some(Role::Root),
        'Л' | 'L' => Some(Role::Left),
        'П' | 'P' | 'R' => Some(Role::Right),
        _ => None,
    }
}

fn letter_of(role: Role) -> char {
    match role {
        Role::Root => 'N',
        Role::Left => 'L',
        Role::Right => 'R',
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownFormat(token.to_string());

        let mut roles = Vec::with_capacity(3);
        let mut brackets = Vec::with_capacity(3);
        let mut chars = token.trim().chars();
        while let Some(c) = chars.next() {
            match BRACKETS.iter().find(|(open, _)| *open == c) {
                Some(&(open, close)) => {
                    roles.push(chars.next().and_then(role_of).ok_or_else(unknown)?);
                    if chars.next() != Some(close) {
                        return Err(unknown());
                    }
                    brackets.push((open, close));
                }
                None => roles.push(role_of(c).ok_or_else(unknown)?),
            }
        }

        let steps: [Role; 3] = roles.try_into().map_err(|_| unknown())?;
        let order = Traversal::from_steps(steps).ok_or_else(unknown)?;
        match brackets.len() {
            0 => Ok(Self::plain(order)),
            3 => {
                let mut by_role = [BRACKETS[0]; 3];
                for (role, pair) in steps.iter().zip(brackets) {
                    by_role[role_slot(*role)] = pair;
                }
                Ok(Self {
                    order,
                    brackets: Some(by_role),
                })
            }
            // Some roles bracketed, some not.
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for role in self.order.steps() {
            match self.brackets(role) {
                Some((open, close)) => write!(f, "{}{}{}", open, letter_of(role), close)?,
                None => write!(f, "{}", letter_of(role))?,
            }
        }
        Ok(())
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(RESERVED) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    Cow::Owned(unescaped)
}

/// Byte offset of the first `target` in `text` that isn't escaped.
fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

/// Splits `text` at every unescaped `separator`.
fn split_unescaped(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(at) = find_unescaped(rest, separator) {
        parts.push(&rest[..at]);
        rest = &rest[at + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Parses one encoded token, trimming it and removing escapes first.
pub(crate) fn parse_value<T>(token: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let text = unescape(token.trim());
    text.parse().map_err(|e: T::Err| Error::InvalidValue {
        token: text.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn write_listing<'a, T, I>(f: &mut fmt::Formatter<'_>, values: I) -> fmt::Result
where
    T: fmt::Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    f.write_str("[")?;
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        f.write_str(&escape(&value.to_string()))?;
    }
    f.write_str("]")
}

fn listing<'a, T, I>(values: I) -> String
where
    T: fmt::Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let values: Vec<String> = values
        .into_iter()
        .map(|value| escape(&value.to_string()).into_owned())
        .collect();
    format!("[{}]", values.join(","))
}

/// The part of `input` between its outer `[` and `]`, and the byte offset where that part starts.
fn strip_brackets(input: &str) -> Result<(&str, usize), Error> {
    let trimmed = input.trim();
    let start = input.len() - input.trim_start().len() + 1;
    trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        // An odd run of backslashes escapes the closing bracket itself.
        .filter(|inner| inner.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0)
        .map(|inner| (inner, start))
        .ok_or_else(|| Error::UnbalancedBrackets(input.to_string()))
}

pub(crate) fn parse_listing<T>(input: &str) -> Result<Vec<T>, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let (inner, _) = strip_brackets(input)?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_unescaped(inner, ',').into_iter().map(parse_value).collect()
}

/// The bodies of consecutive bracketed items in `input`. Between items only whitespace and
/// `separator` are allowed. `base` is added to reported offsets.
fn bracketed_items<'s>(
    input: &'s str,
    pairs: &[(char, char)],
    separator: Option<char>,
    base: usize,
) -> Result<Vec<&'s str>, Error> {
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some(c) = input[pos..].chars().next() {
        let offset = pos;
        pos += c.len_utf8();
        if c.is_whitespace() || Some(c) == separator {
            continue;
        }
        let Some(&(_, close)) = pairs.iter().find(|(open, _)| *open == c) else {
            return Err(Error::UnexpectedChar {
                found: c,
                offset: base + offset,
            });
        };
        let len = find_unescaped(&input[pos..], close)
            .ok_or_else(|| Error::UnbalancedBrackets(input.to_string()))?;
        items.push(&input[pos..pos + len]);
        pos += len + close.len_utf8();
    }
    Ok(items)
}

pub(crate) fn encode_formatted<T: fmt::Display>(root: &Link<T>, format: &Format) -> String {
    let walk = Walk::new(root, format.order);
    match format.brackets {
        None => listing(walk.map(|(_, node)| &node.value)),
        Some(brackets) => {
            let mut out = String::new();
            for (role, node) in walk {
                let (open, close) = brackets[role_slot(role)];
                out.push(open);
                out.push_str(&escape(&node.value.to_string()));
                out.push(close);
            }
            out
        }
    }
}

/// The values of a formatted encoding in the order they were written.
pub(crate) fn decode_formatted<T>(input: &str, format: &Format) -> Result<Vec<T>, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match format.brackets {
        None => parse_listing(input),
        Some(brackets) => bracketed_items(input, &brackets, None, 0)?
            .into_iter()
            .map(parse_value)
            .collect(),
    }
}

/// Pre-order `(child:parent)` pairs, the root paired with itself.
pub(crate) fn encode_pairs<T: fmt::Display>(root: &Link<T>) -> String {
    let mut pairs = Vec::new();
    let mut stack: Vec<(&Node<T>, &T)> =
        root.as_deref().map(|n| (n, &n.value)).into_iter().collect();
    while let Some((node, parent)) = stack.pop() {
        pairs.push(format!(
            "({}:{})",
            escape(&node.value.to_string()),
            escape(&parent.to_string())
        ));
        stack.extend(node.right.as_deref().map(|n| (n, &node.value)));
        stack.extend(node.left.as_deref().map(|n| (n, &node.value)));
    }
    format!("[{}]", pairs.join(","))
}

pub(crate) fn parse_pairs<T>(input: &str) -> Result<Vec<(T, T)>, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let (inner, base) = strip_brackets(input)?;
    bracketed_items(inner, &[('(', ')')], Some(','), base)?
        .into_iter()
        .map(|body| {
            let at = find_unescaped(body, ':')
                .ok_or_else(|| Error::InvalidPair(body.to_string()))?;
            let (child, parent) = (&body[..at], &body[at + 1..]);
            Ok((parse_value(child)?, parse_value(parent)?))
        })
        .collect()
}

/// How a pair list names its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootRule {
    /// The root is listed as its own parent.
    SelfParent,
    /// As above, or else the one parent that never shows up as a child.
    SelfParentOrOrphan,
}

/// Slot indices of a node's left and right child.
pub(crate) type Slots = [Option<usize>; 2];

/// A pair list resolved into node ids. Each id is a node value, its parent edges have been
/// resolved, but nothing has been placed in a left or right slot yet.
#[derive(Debug)]
pub(crate) struct PairGraph<T> {
    values: Vec<T>,
    /// Children of every node, in the order they were listed.
    children: Vec<Vec<usize>>,
    root: usize,
}

impl<T> PairGraph<T>
where
    T: Ord + fmt::Display,
{
    pub(crate) fn new(pairs: Vec<(T, T)>, rule: RootRule) -> Result<Self, Error> {
        let (mut values, mut parents): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();
        let n = values.len();

        let (root, orphan, parent_of) = {
            let mut ids: BTreeMap<&T, usize> = BTreeMap::new();
            for (id, value) in values.iter().enumerate() {
                if ids.insert(value, id).is_some() {
                    return Err(Error::DuplicateValue(value.to_string()));
                }
            }

            let self_root = values.iter().zip(&parents).position(|(c, p)| c == p);
            let orphan = match (self_root, rule) {
                (Some(_), _) => None,
                (None, RootRule::SelfParent) => return Err(Error::MissingRoot),
                (None, RootRule::SelfParentOrOrphan) => {
                    let mut orphans = parents
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| !ids.contains_key(p));
                    let (first, value) = orphans.next().ok_or(Error::MissingRoot)?;
                    if orphans.any(|(_, other)| other != value) {
                        return Err(Error::MissingRoot);
                    }
                    Some(first)
                }
            };
            // An implicit root takes the id after the last listed child.
            let root = self_root.unwrap_or(n);

            let parent_of: Vec<Option<usize>> = parents
                .iter()
                .enumerate()
                .map(|(id, parent)| match ids.get(parent) {
                    _ if Some(id) == self_root => None,
                    Some(&parent_id) => Some(parent_id),
                    None => orphan.map(|_| n),
                })
                .collect();
            (root, orphan, parent_of)
        };

        if let Some(first) = orphan {
            values.push(parents.swap_remove(first));
        }

        let mut children = vec![Vec::new(); values.len()];
        for (id, parent) in parent_of.into_iter().enumerate() {
            if let Some(parent) = parent {
                children[parent].push(id);
            }
        }

        Ok(Self {
            values,
            children,
            root,
        })
    }

    /// The first listed child goes left, the second right.
    pub(crate) fn slots_in_listed_order(&self) -> Result<Vec<Slots>, Error> {
        self.children
            .iter()
            .enumerate()
            .map(|(id, children)| match children.as_slice() {
                [] => Ok([None, None]),
                [left] => Ok([Some(*left), None]),
                [left, right] => Ok([Some(*left), Some(*right)]),
                _ => Err(Error::TooManyChildren(self.values[id].to_string())),
            })
            .collect()
    }

    /// Children smaller than their parent go left, larger ones right.
    pub(crate) fn slots_by_order(&self) -> Result<Vec<Slots>, Error> {
        let mut slots = vec![[None, None]; self.values.len()];
        for (parent, children) in self.children.iter().enumerate() {
            if children.len() > 2 {
                return Err(Error::TooManyChildren(self.values[parent].to_string()));
            }
            for &child in children {
                let side = if self.values[child] < self.values[parent] {
                    Side::Left
                } else {
                    Side::Right
                };
                let slot = &mut slots[parent][side as usize];
                if slot.is_some() {
                    return Err(Error::SlotTaken {
                        parent: self.values[parent].to_string(),
                        side,
                    });
                }
                *slot = Some(child);
            }
        }
        Ok(slots)
    }

    /// Builds the node graph, checking every listed node hangs off the root. Returns the root and
    /// the node count.
    pub(crate) fn assemble(self, slots: Vec<Slots>) -> Result<(Box<Node<T>>, usize), Error> {
        let expected = self.values.len();

        // Breadth-first ids from the root: every id appears once since each has one parent.
        let mut order = vec![self.root];
        let mut next = 0;
        while let Some(&id) = order.get(next) {
            next += 1;
            order.extend(slots[id].iter().flatten());
        }
        if order.len() != expected {
            return Err(Error::CountMismatch {
                expected,
                found: order.len(),
            });
        }

        // Children are built before parents by walking the order backwards.
        let mut values: Vec<Option<T>> = self.values.into_iter().map(Some).collect();
        let mut built: Vec<Link<T>> = (0..expected).map(|_| None).collect();
        for &id in order.iter().rev() {
            let [left, right] = slots[id];
            let value = values[id].take().ok_or(Error::MissingRoot)?;
            let left = left.and_then(|child| built[child].take());
            let right = right.and_then(|child| built[child].take());
            built[id] = Some(Box::new(Node { value, left, right }));
        }

        built[self.root]
            .take()
            .map(|root| (root, expected))
            .ok_or(Error::MissingRoot)
    }
}
