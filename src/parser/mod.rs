//! Parser module - Extract state machine declarations from source text

use crate::Result;
use crate::state_machine::{Hsm, TransitionKind};
use petgraph::stable_graph::NodeIndex;

pub mod source;

// Re-export key types
pub use source::SourceScanner;

/// One construct found in source text.
///
/// Transitions belong to the most recent `State` declaration before them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    State {
        name: String,
        base: Option<String>,
        reusable: bool,
    },
    Transition {
        kind: TransitionKind,
        target: String,
    },
    Alias {
        alias: String,
        canonical: String,
    },
}

/// Feed a declaration stream into the graph builder.
///
/// Transitions that precede every state declaration of the stream have no
/// owner and are dropped.
pub fn apply_declarations(
    declarations: impl IntoIterator<Item = Declaration>,
    hsm: &mut Hsm,
) -> Result<()> {
    let mut current: Option<NodeIndex> = None;

    for declaration in declarations {
        match declaration {
            Declaration::State {
                name,
                base,
                reusable,
            } => {
                let state = hsm.add_state(&name, base.as_deref())?;
                if reusable {
                    hsm.state_mut(state).is_reusable = true;
                }
                current = Some(state);
            }
            Declaration::Transition { kind, target } => match current {
                Some(state) => hsm.add_transition(state, kind, target),
                None => tracing::debug!("Ignoring {} transition to {} outside of a state", kind.name(), target),
            },
            Declaration::Alias { alias, canonical } => hsm.register_alias(&alias, &canonical),
        }
    }
    Ok(())
}
