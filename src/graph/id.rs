use std::fmt::{Debug, Display};

use crate::Show;

/// Stable identity of a state. Identities are handed out by a [`super::TransitionGraph`] in
/// increasing order and never reused, not even after the state was merged away, so that a state
/// can be tracked across the graphs produced by successive merges.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct StateId(pub u32);

impl Debug for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl Show for StateId {
    fn show(&self) -> String {
        format!("q{}", self.0)
    }
}
