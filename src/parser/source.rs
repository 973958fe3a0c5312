//! Line-oriented scanner for C++ state machine sources.
//!
//! Recognized constructs, matched case-insensitively:
//! - `struct Name : public Base` opens a state
//! - `InnerTransition<T>(`, `InnerEntryTransition<T>(`, `SiblingTransition<T>(`
//! - `typedef ... StateName Alias;` declares an alias
//!
//! Everything after `//` is ignored, except for alias statements and the
//! reusable tag, which are matched against the whole line.

use crate::config::ParserConfig;
use crate::parser::{Declaration, apply_declarations};
use crate::state_machine::{Hsm, TransitionKind};
use crate::{Error, Result};
use regex::Regex;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct SourceScanner {
    comment_re: Regex,
    state_re: Regex,
    transition_res: [(TransitionKind, Regex); 3],
    alias_re: Regex,
    reusable_tag: String,
    ignored_states: Vec<String>,
}

impl SourceScanner {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let transition_re =
            |call: &str| Regex::new(&format!(r"(?i){}\s*<\s*([^\s]*?)\s*>\s*\(", call));

        Ok(Self {
            comment_re: Regex::new(r"//.*")?,
            state_re: Regex::new(r"(?i)struct\s+(\w+)\s*:\s*(?:public)?\s*(\w+)")?,
            transition_res: [
                (TransitionKind::Inner, transition_re("InnerTransition")?),
                (TransitionKind::InnerEntry, transition_re("InnerEntryTransition")?),
                (TransitionKind::Sibling, transition_re("SiblingTransition")?),
            ],
            alias_re: Regex::new(r"(?i)typedef.*\s+(?P<statename>\w+)\s+(?P<alias>\w+)\s*;")?,
            reusable_tag: config.reusable_tag.clone(),
            ignored_states: config.ignored_states.clone(),
        })
    }

    /// Declarations found in `text`, in source order.
    pub fn scan(&self, text: &str) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        let mut in_state = false;

        for line in text.lines() {
            let code = self.comment_re.replace(line, "");

            if let Some(captures) = self.alias_re.captures(line) {
                declarations.push(Declaration::Alias {
                    alias: captures["alias"].to_string(),
                    canonical: captures["statename"].to_string(),
                });
            }

            if let Some(captures) = self.state_re.captures(&code) {
                let name = &captures[1];
                if self.ignored_states.iter().any(|ignored| ignored == name) {
                    tracing::trace!("Skipping helper struct {}", name);
                } else {
                    declarations.push(Declaration::State {
                        name: name.to_string(),
                        base: Some(captures[2].to_string()),
                        reusable: line.contains(&self.reusable_tag),
                    });
                    in_state = true;
                }
            }

            if !in_state {
                continue;
            }
            for (kind, transition_re) in &self.transition_res {
                for captures in transition_re.captures_iter(&code) {
                    declarations.push(Declaration::Transition {
                        kind: *kind,
                        target: captures[1].to_string(),
                    });
                }
            }
        }

        declarations
    }

    /// Scan `text` and feed the result into `hsm`.
    pub fn apply(&self, text: &str, hsm: &mut Hsm) -> Result<()> {
        apply_declarations(self.scan(text), hsm)
    }

    /// Read one source file into `hsm`.
    pub fn parse_file(&self, path: impl AsRef<Path>, hsm: &mut Hsm) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Scanning {:?}", path);
        self.apply(&text, hsm)
    }
}
