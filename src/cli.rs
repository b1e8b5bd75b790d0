use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::gallery::Sources;
use crate::lightbox::{self, ClosePolicy};

pub const HELP_KEYS: &str = "\
Gallery:
  Click / Tap     : Open item in the lightbox
  Wheel / Up/Down : Scroll
  PageUp/PageDown : Scroll one page
  Home / End      : Jump to top / bottom
  q               : Quit

Lightbox:
  Esc             : Close
  Left / Right    : Previous / next image
  Swipe           : Left for next, right for previous
  Click backdrop  : Close
";

#[derive(Parser, Debug)]
#[command(name = "lightbox", about = "Thumbnail gallery with a lightbox viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// Image files or directories to show
    #[arg(required_unless_present = "manifest")]
    pub paths: Vec<PathBuf>,

    /// Gallery manifest: one `SOURCE<TAB>CAPTION` per line
    #[arg(short = 'L', long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Follow symbolic links (default: false)
    #[arg(long)]
    pub follow_links: bool,

    /// Open/close transition length in milliseconds
    #[arg(long, default_value = "300")]
    pub transition_ms: u64,

    /// Minimum horizontal travel in logical pixels for a swipe
    #[arg(long, default_value = "50")]
    pub swipe_threshold: f64,

    /// Thumbnail edge length in pixels
    #[arg(long, default_value = "200")]
    pub thumb_size: u32,

    /// Font size scaling factor
    #[arg(long, default_value = "2")]
    pub font_size: u32,

    /// Let every close schedule its own uncancelled cleanup, even across a reopen
    #[arg(long)]
    pub unguarded_close: bool,
}

impl Cli {
    pub fn sources(&self) -> Sources {
        Sources {
            manifest: self.manifest.clone(),
            paths: self.paths.clone(),
            recursive: self.recursive,
            follow_links: self.follow_links,
        }
    }

    pub fn lightbox_config(&self) -> lightbox::Config {
        lightbox::Config {
            transition: Duration::from_millis(self.transition_ms),
            swipe_threshold: self.swipe_threshold,
            close_policy: if self.unguarded_close {
                ClosePolicy::Unguarded
            } else {
                ClosePolicy::Replace
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_lightbox_defaults() {
        let cli = Cli::parse_from(["lightbox", "photos"]);
        assert_eq!(cli.lightbox_config(), lightbox::Config::default());
        assert_eq!(cli.thumb_size, 200);
        assert_eq!(cli.sources().paths, vec![PathBuf::from("photos")]);
    }

    #[test]
    fn manifest_alone_is_enough() {
        let cli = Cli::try_parse_from(["lightbox", "-L", "list.tsv"]).unwrap();
        assert_eq!(cli.manifest, Some(PathBuf::from("list.tsv")));
        assert!(Cli::try_parse_from(["lightbox"]).is_err());
    }

    #[test]
    fn unguarded_close_selects_policy() {
        let cli = Cli::parse_from(["lightbox", "--unguarded-close", "--transition-ms", "120", "x"]);
        let config = cli.lightbox_config();
        assert_eq!(config.close_policy, ClosePolicy::Unguarded);
        assert_eq!(config.transition, Duration::from_millis(120));
    }
}
