//! freq - terminal tone generator
//!
//! # Usage
//!
//! ```bash
//! freq
//! freq path/to/song.freq.json
//! freq --state-dir /tmp/freq --autosave-ms 5000
//! ```

mod app;
mod ui;

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use app::Freq;
use freq::config::Config;

#[derive(Parser, Debug)]
#[command(name = "freq")]
#[command(version, about = "Multi-track tone generator with keyboard pitch offsets")]
struct Args {
    /// Project file to open after restoring the previous session
    project: Option<PathBuf>,

    /// Directory for the session slot and log file
    #[arg(long, env = "FREQ_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Directory projects are saved to
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Autosave interval in milliseconds
    #[arg(long, env = "FREQ_AUTOSAVE_MS", value_parser = clap::value_parser!(u64).range(1..))]
    autosave_ms: Option<u64>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        if let Some(dir) = &self.project_dir {
            config.project_dir = dir.clone();
        }
        if let Some(ms) = self.autosave_ms {
            config.autosave_interval = Duration::from_millis(ms);
        }
        config
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut freq = Freq::from_config(args.config());
    if let Some(path) = args.project {
        freq = freq.project(path);
    }
    freq.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "freq",
            "song.freq.json",
            "--state-dir",
            "/tmp/freq-state",
            "--autosave-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(args.project, Some(PathBuf::from("song.freq.json")));

        let config = args.config();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/freq-state"));
        assert_eq!(config.autosave_interval, Duration::from_millis(250));
    }

    #[test]
    fn bad_interval_is_rejected() {
        assert!(Args::try_parse_from(["freq", "--autosave-ms", "0"]).is_err());
        assert!(Args::try_parse_from(["freq", "--autosave-ms", "soon"]).is_err());
    }

    #[test]
    fn unknown_flags_are_not_project_paths() {
        assert!(Args::try_parse_from(["freq", "--bogus"]).is_err());
    }
}
