//! Parent/child forest and the reverse sibling index.

use crate::state_machine::topology::TopologyWarning;
use crate::state_machine::walk::{AncestorStack, Frame, Step};
use crate::state_machine::Hsm;
use crate::{Error, Result};
use petgraph::stable_graph::NodeIndex;
use std::collections::HashSet;

impl Hsm {
    /// Links every state reached over a legal structural edge to the open
    /// ancestor above it. Sibling targets share their caller's parent.
    ///
    /// Needs final ranks: illegal cycle edges must already be disabled.
    pub(crate) fn assign_parents_and_children(&mut self) -> Result<()> {
        for root in self.roots() {
            let mut ancestors = AncestorStack::new();
            let mut unparented = HashSet::from([root]);
            let mut frames = vec![Frame::new(self, root, self.state(root).rank)];

            while let Some(frame) = frames.last_mut() {
                match frame.next_step() {
                    Step::Sibling(transition) | Step::Structural(transition) => {
                        let target = transition.target;
                        let descend = match ancestors.top() {
                            Some(parent) => self.link_parent(parent, target)?,
                            None => unparented.insert(target),
                        };
                        if descend {
                            frames.push(Frame::new(self, target, self.state(target).rank));
                        }
                    }
                    Step::Open => ancestors.push(frame.state),
                    Step::Close => {
                        if frames.pop().is_some_and(|done| done.opened) {
                            ancestors.pop();
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Records `parent` -> `child` once. Returns whether the child is new
    /// under this parent and its own edges still need walking.
    fn link_parent(&mut self, parent: NodeIndex, child: NodeIndex) -> Result<bool> {
        let listed_as_child = self.state(parent).children.contains(&child);
        let listed_as_parent = self.state(child).parents.contains(&parent);

        match (listed_as_child, listed_as_parent) {
            (true, true) => Ok(false),
            (true, false) | (false, true) => Err(Error::InconsistentHierarchy {
                parent: self.name_of(parent).to_string(),
                child: self.name_of(child).to_string(),
            }),
            (false, false) if parent == child => {
                self.warn(TopologyWarning::SelfParent {
                    state: self.name_of(child).to_string(),
                });
                Ok(false)
            }
            (false, false) => {
                self.state_mut(child).parents.push(parent);
                self.state_mut(parent).children.push(child);
                Ok(true)
            }
        }
    }

    /// Fills the reverse index of legal sibling edges.
    pub(crate) fn assign_incoming_siblings(&mut self) {
        for source in self.state_indices() {
            for transition in self.legal_siblings(source) {
                let target = self.state_mut(transition.target);
                if !target.incoming_siblings.contains(&source) {
                    target.incoming_siblings.push(source);
                }
            }
        }
    }
}
