//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::parser::SourceScanner;
use crate::state_machine::Hsm;
use crate::{Config, Result};
use std::path::PathBuf;

/// Scan every file into one shared graph and finalize it
pub fn build_hsm(files: &[PathBuf], config: &Config) -> Result<Hsm> {
    let scanner = SourceScanner::new(&config.parser)?;
    let mut hsm = Hsm::new();

    for file in files {
        scanner.parse_file(file, &mut hsm)?;
    }
    tracing::info!(
        "Parsed {} states from {} file(s)",
        hsm.state_count(),
        files.len()
    );

    hsm.finalize()?;
    Ok(hsm)
}

/// Render command implementation
pub mod render {
    use super::*;
    use crate::cli::{OutputFormat, output};
    use crate::render::{RenderOptions, dot::render_dot};
    use crate::state_machine::analyze;
    use std::io::Write;

    /// Execute the render command
    ///
    /// The whole output is produced before anything is written, so a fatal
    /// error leaves `w` untouched.
    pub fn execute(
        files: &[PathBuf],
        format: OutputFormat,
        config: &Config,
        w: &mut impl Write,
    ) -> Result<()> {
        let hsm = build_hsm(files, config)?;

        for warning in hsm.warnings() {
            tracing::debug!("Rendering despite: {}", warning);
        }

        let mut buffer = Vec::new();
        match format {
            OutputFormat::Dot => {
                let options = RenderOptions::from_config(config);
                buffer.extend_from_slice(render_dot(&hsm, &options).as_bytes());
            }
            OutputFormat::Json => {
                output::output_json(&mut buffer, &hsm, &analyze(&hsm))?;
            }
            OutputFormat::Table => {
                output::output_table(&mut buffer, &hsm, &analyze(&hsm))?;
            }
        }

        w.write_all(&buffer)?;
        w.flush()?;
        Ok(())
    }
}
