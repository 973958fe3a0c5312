//! Explicit-stack building blocks for the depth-first walks over an [`Hsm`].
//!
//! Every walk distinguishes the *open ancestors* of the state being visited
//! (states whose structural children are being explored) from the plain
//! chain of in-progress visits. Sibling edges share their caller's
//! ancestors, structural edges push a new one.
//!
//! [`Hsm`]: crate::state_machine::Hsm

use crate::state_machine::Hsm;
use crate::state_machine::graph::OutgoingTransition;
use petgraph::stable_graph::NodeIndex;
use std::collections::HashMap;

/// Ordered stack of open ancestors with O(1) membership.
#[derive(Debug, Default)]
pub(crate) struct AncestorStack {
    order: Vec<NodeIndex>,
    members: HashMap<NodeIndex, usize>,
}

impl AncestorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: NodeIndex) {
        self.order.push(state);
        *self.members.entry(state).or_default() += 1;
    }

    pub fn pop(&mut self) -> Option<NodeIndex> {
        let state = self.order.pop()?;
        if let Some(count) = self.members.get_mut(&state) {
            *count -= 1;
            if *count == 0 {
                self.members.remove(&state);
            }
        }
        Some(state)
    }

    pub fn contains(&self, state: NodeIndex) -> bool {
        self.members.contains_key(&state)
    }

    pub fn top(&self) -> Option<NodeIndex> {
        self.order.last().copied()
    }
}

/// What a [`Frame`] wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Follow a sibling edge at the frame's own level
    Sibling(OutgoingTransition),
    /// All siblings handled; push the frame's state as an open ancestor
    Open,
    /// Follow a structural edge one level down
    Structural(OutgoingTransition),
    /// Frame exhausted; pop it (and its ancestor entry, if opened)
    Close,
}

/// One in-progress visit of a state.
///
/// The edge lists are snapshotted when the frame is created, the same way a
/// recursive visit would read them on entry.
#[derive(Debug)]
pub(crate) struct Frame {
    pub state: NodeIndex,
    pub rank: Option<u32>,
    pub opened: bool,
    siblings: Vec<OutgoingTransition>,
    structural: Vec<OutgoingTransition>,
    cursor: usize,
}

impl Frame {
    pub fn new(hsm: &Hsm, state: NodeIndex, rank: Option<u32>) -> Self {
        Self {
            state,
            rank,
            opened: false,
            siblings: hsm.legal_siblings(state),
            structural: hsm.legal_structural(state),
            cursor: 0,
        }
    }

    /// Rank given to states entered through this frame's structural edges
    pub fn child_rank(&self) -> u32 {
        self.rank.map_or(0, |rank| rank + 1)
    }

    pub fn next_step(&mut self) -> Step {
        if self.cursor < self.siblings.len() {
            self.cursor += 1;
            return Step::Sibling(self.siblings[self.cursor - 1]);
        }
        if !self.opened {
            self.opened = true;
            return Step::Open;
        }
        let index = self.cursor - self.siblings.len();
        if index < self.structural.len() {
            self.cursor += 1;
            return Step::Structural(self.structural[index]);
        }
        Step::Close
    }
}
