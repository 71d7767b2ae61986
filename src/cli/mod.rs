//! Command-line argument parsing for ragcheck
//!
//! Single-purpose binary: running with no arguments performs the full
//! diagnostic. Flags only tune the model id, skip the download phase, or
//! adjust verbosity.

use clap::Parser;

use crate::retrieval::engine::DEFAULT_MODEL_ID;

/// ragcheck - Verify a local ColPali retrieval stack is ready to use
#[derive(Parser, Debug)]
#[command(name = "ragcheck")]
#[command(version = "0.1.0")]
#[command(about = "Sanity-check accelerator, hub access and model download", long_about = None)]
pub struct Args {
    /// Pretrained model repository id
    #[arg(short, long, default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Run only the capability checks (no model download)
    #[arg(long)]
    pub skip_model: bool,

    /// Verbosity level: -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except check lines)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Check if the download spinner should be shown
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verbose: u8, quiet: bool) -> Args {
        Args {
            model: DEFAULT_MODEL_ID.to_string(),
            skip_model: false,
            verbose,
            quiet,
        }
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(args(0, true).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(args(0, false).verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(args(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(args(2, false).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_default_model_id_used() {
        let parsed = Args::parse_from(["ragcheck"]);
        assert_eq!(parsed.model, DEFAULT_MODEL_ID);
        assert!(!parsed.skip_model);
    }

    #[test]
    fn test_show_progress() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
    }
}
