use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::models::{AgentType, Diagnostic, SessionTimeline};
use crate::{detect_agent, load_timeline};

#[derive(Parser)]
#[command(name = "session-replay")]
#[command(version = "0.1.0")]
#[command(about = "Convert coding-agent session logs into playback timelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a session file and print its timeline as JSON
    Timeline {
        /// Path to the session file
        file: PathBuf,
        /// Agent type (claude, codex, gemini); detected when omitted
        #[arg(long)]
        agent: Option<String>,
    },
    /// Show frame statistics for a session file
    Stats {
        /// Path to the session file
        file: PathBuf,
        /// Agent type (claude, codex, gemini); detected when omitted
        #[arg(long)]
        agent: Option<String>,
    },
    /// Print the detected agent type for a session file
    Detect {
        /// Path to the session file
        file: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Timeline { file, agent }) => {
            let (timeline, diagnostics) = load_timeline(file, parse_agent(agent.as_deref())?)?;
            report_diagnostics(&diagnostics);
            println!("{}", serde_json::to_string_pretty(&timeline)?);
        }
        Some(Commands::Stats { file, agent }) => {
            let (timeline, diagnostics) = load_timeline(file, parse_agent(agent.as_deref())?)?;
            report_diagnostics(&diagnostics);
            show_stats(&timeline, &diagnostics);
        }
        Some(Commands::Detect { file }) => {
            println!("{}", detect_agent(file)?);
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn parse_agent(agent: Option<&str>) -> Result<Option<AgentType>> {
    agent.map(|s| s.parse::<AgentType>().map_err(|e| anyhow!(e))).transpose()
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }
}

fn show_stats(timeline: &SessionTimeline, diagnostics: &[Diagnostic]) {
    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for frame in &timeline.frames {
        *by_kind.entry(frame.kind_tag()).or_insert(0) += 1;
    }
    let compressed = timeline.frames.iter().filter(|f| f.is_compressed).count();
    let playback_ms: i64 = timeline.frames.iter().map(|f| f.duration).sum();

    println!("Session {}", timeline.session_id);
    println!("================================");
    println!("Agent: {}", timeline.agent);
    if let Some(project) = &timeline.project_name {
        println!("Project: {}", project);
    }
    println!("Total frames: {}", timeline.total_frames);
    for (kind, count) in &by_kind {
        println!("  {}: {}", kind, count);
    }
    println!("Compressed frames: {}", compressed);
    println!("Wall time: {} ms", timeline.ended_at - timeline.started_at);
    println!("Playback time: {} ms", playback_ms);
    println!("Skipped records: {}", diagnostics.len());
}
