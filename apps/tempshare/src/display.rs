//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::io;
use tempshare_config::Config;

use crate::error::CliError;
use crate::scenario::{FanoutReport, ReleaseMethod};

/// Output renderer for CLI results
#[derive(Clone, Copy)]
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render a fan-out report
    pub fn render_fanout(self, report: &FanoutReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        println!("File: {}", report.path);
        if report.compressed {
            println!("Compressed suffix preserved");
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Manager", "Release", "Detached", "Remaining", "File exists"]);

        for step in &report.steps {
            let method = match step.method {
                ReleaseMethod::ReleaseOne => "release_one",
                ReleaseMethod::ReleaseAll => "release_all",
                ReleaseMethod::Drop => "drop",
            };
            table.add_row(vec![
                Cell::new(step.manager),
                Cell::new(method),
                Cell::new(step.detached),
                Cell::new(step.remaining),
                Cell::new(if step.exists { "yes" } else { "no" }),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    /// Render the effective configuration
    pub fn render_config(self, config: &Config) -> Result<(), CliError> {
        if self.json_output {
            let json = serde_json::to_string_pretty(config).map_err(io::Error::other)?;
            println!("{json}");
        } else {
            print!("{}", config.to_toml_string()?);
        }
        Ok(())
    }
}
