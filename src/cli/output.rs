//! Output formatting module
//!
//! This module handles formatting a finalized state machine for the
//! non-diagram output formats.

use crate::Result;
use crate::state_machine::{Hsm, HsmReport, State};
use petgraph::stable_graph::NodeIndex;
use serde_json::json;

fn names(hsm: &Hsm, indices: &[NodeIndex]) -> Vec<String> {
    indices
        .iter()
        .map(|&index| hsm.name_of(index).to_string())
        .collect()
}

fn flags(state: &State) -> Vec<&'static str> {
    [
        (state.is_root, "root"),
        (state.is_hidden, "hidden"),
        (state.is_base, "base"),
        (state.is_reusable, "reusable"),
        (state.is_proxy, "proxy"),
    ]
    .into_iter()
    .filter_map(|(set, flag)| set.then_some(flag))
    .collect()
}

/// Output the graph and its report as JSON
pub fn output_json(w: &mut impl std::io::Write, hsm: &Hsm, report: &HsmReport) -> Result<()> {
    let states: Vec<_> = hsm
        .state_indices()
        .into_iter()
        .map(|index| {
            let state = hsm.state(index);
            json!({
                "name": state.name,
                "display_name": state.display_name,
                "base": state.base_name,
                "rank": state.rank,
                "flags": flags(state),
                "visible": state.is_visible(),
                "parents": names(hsm, &state.parents),
                "children": names(hsm, &state.children),
                "clusters": state.clusters,
                "proxy_of": state.proxy_of.map(|target| hsm.name_of(target)),
                "transitions": hsm.transitions(index).iter().map(|t| {
                    json!({
                        "kind": t.kind,
                        "target": hsm.name_of(t.target),
                        "legal": t.is_legal,
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = json!({
        "summary": report,
        "states": states,
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output the report and one row per state as a text table
pub fn output_table(w: &mut impl std::io::Write, hsm: &Hsm, report: &HsmReport) -> Result<()> {
    writeln!(w, "Hierarchical State Machine - Analysis Results")?;
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  Shape:               {}", report.shape.display_name())?;
    writeln!(w, "  Total States:        {}", report.total_states)?;
    writeln!(w, "  Visible States:      {}", report.visible_states)?;
    writeln!(w, "  Proxies:             {}", report.proxies)?;
    writeln!(w, "  Transitions:         {}", report.transitions)?;
    writeln!(w, "  Illegal Transitions: {}", report.illegal_transitions)?;
    match report.max_rank {
        Some(rank) => writeln!(w, "  Max Rank:            {}", rank)?,
        None => writeln!(w, "  Max Rank:            -")?,
    }
    writeln!(w, "  Clusters:            {}", report.clusters)?;
    writeln!(w)?;

    let visible: Vec<_> = hsm.states().filter(|state| state.is_visible()).collect();
    if !visible.is_empty() {
        writeln!(w, "States:")?;
        writeln!(w, "{:-<80}", "")?;
        writeln!(
            w,
            "{:<28} {:>5} {:<24} {:<20}",
            "Name", "Rank", "Parent", "Cluster"
        )?;
        writeln!(w, "{:-<80}", "")?;

        for state in visible {
            let rank = state
                .rank
                .map(|rank| rank.to_string())
                .unwrap_or_else(|| "-".to_string());
            let parent = state
                .parents
                .iter()
                .map(|&parent| hsm.state(parent))
                .find(|parent| !parent.is_hidden)
                .map(|parent| parent.name.as_str())
                .unwrap_or("-");
            let cluster = state.clusters.last().map(String::as_str).unwrap_or("-");

            writeln!(
                w,
                "{:<28} {:>5} {:<24} {:<20}",
                state.display_name, rank, parent, cluster
            )?;
        }
        writeln!(w)?;
    }

    if !report.warnings.is_empty() {
        writeln!(w, "Warnings:")?;
        for warning in &report.warnings {
            writeln!(w, "  {}", warning)?;
        }
        writeln!(w)?;
    }

    Ok(())
}
