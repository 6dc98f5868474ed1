//! Printing the final state of a replay.

use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::script::Replay;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per block with geometry and formatting.
    #[default]
    Summary,
    /// The full editor view as JSON.
    Json,
    /// Stored note content.
    Content,
}

pub fn render_output(replay: &Replay, format: OutputFormat) -> Result<String> {
    let session = replay.session();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&session.view())?),
        OutputFormat::Content => Ok(session.to_content()),
        OutputFormat::Summary => {
            let mut out = String::new();
            let focused = session.focused_index();
            writeln!(
                out,
                "revision {}, {} blocks, {}ms, focused {}",
                session.revision(),
                session.blocks().len(),
                session.now(),
                focused.map_or("none".to_string(), |ix| ix.to_string()),
            )?;

            for (ix, block) in session.blocks().iter().enumerate() {
                let marker = if focused == Some(ix) { '>' } else { ' ' };
                let geometry = match replay.host().rect(block.id) {
                    Some(r) => format!("{:>6.1}+{:<5.1}", r.y, r.height),
                    None => "     -      ".to_string(),
                };
                let format = session.format().effective_format(ix, block);
                let mut flags = String::new();
                if let Some(level) = format.heading {
                    flags.push_str(level.as_str());
                }
                if format.bold {
                    flags.push('b');
                }
                if format.italic {
                    flags.push('i');
                }
                writeln!(
                    out,
                    "{marker}{ix:>3} {:<10} {:<11} {geometry} {:?}",
                    block.kind.as_str(),
                    block.layout_mode().as_str(),
                    block.content,
                )?;
                if !flags.is_empty() {
                    writeln!(out, "        [{flags}]")?;
                }
            }
            Ok(out)
        }
    }
}
