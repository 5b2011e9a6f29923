//! The single error type shared by both containers and the codecs.

use thiserror::Error;

use crate::node::Side;

/// Everything that can go wrong while inspecting a container or decoding one
/// from text. Missing values are never errors: `contains` and `remove` report
/// them as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `top` or `extract_max` was called on an empty heap.
    #[error("container is empty")]
    Empty,

    /// A listing was not wrapped in `[` `]`, or a role bracket was never closed.
    #[error("unbalanced brackets in {0:?}")]
    UnbalancedBrackets(String),

    /// Text that belongs to no encoded item.
    #[error("unexpected {found:?} at byte {offset}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset of `found` in the input.
        offset: usize,
    },

    /// A token could not be parsed into a value.
    #[error("cannot parse value {token:?}: {reason}")]
    InvalidValue {
        /// The token as it appeared in the input.
        token: String,
        /// The value type's own parse error.
        reason: String,
    },

    /// A pair-list entry without the `child:parent` separator.
    #[error("pair {0:?} is not of the form (child:parent)")]
    InvalidPair(String),

    /// A format token that is not one of the six traversal permutations.
    #[error("unknown format token {0:?}")]
    UnknownFormat(String),

    /// No value in a pair list can be identified as the root.
    #[error("pair list has no identifiable root")]
    MissingRoot,

    /// A parent was given a third child.
    #[error("node {0} has more than two children")]
    TooManyChildren(String),

    /// Two children of one parent claim the same side.
    #[error("node {parent} already has a {side} child")]
    SlotTaken {
        /// The parent's value.
        parent: String,
        /// The side both children want.
        side: Side,
    },

    /// The same value appears as a child more than once.
    #[error("value {0} appears more than once")]
    DuplicateValue(String),

    /// Fewer nodes are reachable from the root than the pair list declares.
    #[error("pair list declares {expected} nodes but {found} are reachable from the root")]
    CountMismatch {
        /// Nodes declared by the input.
        expected: usize,
        /// Nodes actually connected to the root.
        found: usize,
    },

    /// The decoded structure breaks the container's invariant.
    #[error("decoded structure violates the {0} invariant")]
    InvariantViolated(&'static str),
}
