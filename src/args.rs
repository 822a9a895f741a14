use crate::config::Config;
use clap::{ArgAction, Args};
use std::path::PathBuf;

// Global flags accepted by every subcommand.
//
//   -c / --config      Explicit config.toml location
//   --settings-dir     Move all state somewhere else
//   --profile <name>   Shorthand for --settings-dir ~/.promocast-<name>
//   --no-color         Plain output
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Config file location
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        env = "PROMOCAST_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Settings directory (default: ~/.promocast)
    #[arg(
        long,
        value_name = "DIR",
        env = "PROMOCAST_SETTINGS_DIR",
        global = true
    )]
    pub settings_dir: Option<PathBuf>,

    /// Isolate state under ~/.promocast-<PROFILE>
    #[arg(long, value_name = "PROFILE", env = "PROMOCAST_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Disable coloured terminal output
    #[arg(long = "no-color", action = ArgAction::SetTrue, env = "NO_COLOR", global = true)]
    pub no_color: bool,

    /// Directory containing group ledger files
    #[arg(
        long = "groups-dir",
        value_name = "DIR",
        env = "PROMOCAST_GROUPS",
        global = true
    )]
    pub groups_dir: Option<PathBuf>,

    /// Directory containing campaign catalogues
    #[arg(
        long = "campaigns-dir",
        value_name = "DIR",
        env = "PROMOCAST_CAMPAIGNS",
        global = true
    )]
    pub campaigns_dir: Option<PathBuf>,

    /// Caption label catalogue file
    #[arg(long, value_name = "PATH", env = "PROMOCAST_LABELS", global = true)]
    pub labels: Option<PathBuf>,

    /// Attach product videos instead of images when available
    #[arg(long = "include-video", action = ArgAction::SetTrue, global = true)]
    pub include_video: bool,

    /// Verbose logging (same as PROMOCAST_LOG=promocast=debug)
    #[arg(short = 'v', long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Settings directory override: `--settings-dir` wins, then `--profile`
    /// selects `~/.promocast-<profile>`.
    pub fn effective_settings_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.settings_dir {
            return Some(dir.clone());
        }
        let profile = self.profile.as_ref()?;
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Some(home.join(format!(".promocast-{profile}")))
    }

    /// Where to look for config.toml, when any location was given at all.
    pub fn config_path(&self) -> Option<PathBuf> {
        match (&self.config, self.effective_settings_dir()) {
            (Some(config), _) => Some(config.clone()),
            (None, Some(dir)) => Some(dir.join("config.toml")),
            (None, None) => None,
        }
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        // A rebased settings dir moves the state subdirectories with it;
        // explicit --groups-dir / --campaigns-dir flags still win below.
        if let Some(settings_dir) = self.effective_settings_dir() {
            config.groups_dir = settings_dir.join("groups");
            config.campaigns_dir = settings_dir.join("campaigns");
            config.settings_dir = settings_dir;
        }

        if let Some(groups_dir) = &self.groups_dir {
            config.groups_dir = groups_dir.clone();
        }

        if let Some(campaigns_dir) = &self.campaigns_dir {
            config.campaigns_dir = campaigns_dir.clone();
        }

        if let Some(labels) = &self.labels {
            config.labels_path = Some(labels.clone());
        }

        if self.include_video {
            config.include_video = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> CommonArgs {
        CommonArgs {
            config: None,
            settings_dir: None,
            profile: None,
            no_color: false,
            groups_dir: None,
            campaigns_dir: None,
            labels: None,
            include_video: false,
            verbose: false,
        }
    }

    #[test]
    fn profile_rebases_state_directories() {
        let mut args = bare_args();
        args.settings_dir = Some(PathBuf::from("/tmp/promocast-test"));
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.settings_dir, PathBuf::from("/tmp/promocast-test"));
        assert_eq!(config.groups_dir, PathBuf::from("/tmp/promocast-test/groups"));
        assert_eq!(
            config.campaigns_dir,
            PathBuf::from("/tmp/promocast-test/campaigns")
        );
    }

    #[test]
    fn explicit_dirs_win_over_the_rebase() {
        let mut args = bare_args();
        args.settings_dir = Some(PathBuf::from("/tmp/promocast-test"));
        args.groups_dir = Some(PathBuf::from("/data/ledgers"));
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.groups_dir, PathBuf::from("/data/ledgers"));
        assert_eq!(
            config.campaigns_dir,
            PathBuf::from("/tmp/promocast-test/campaigns")
        );
    }
}
