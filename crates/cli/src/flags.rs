use clap::Args;

use crate::config::Config;
use context_changes::ApplyOptions;

/// Safety switches shared by every command that writes files
#[derive(Args, Debug, Clone, Copy, Default)]
pub(crate) struct ApplyFlags {
    /// Apply without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Do not write `<file>.bak` backups before overwriting
    #[arg(long)]
    pub no_backup: bool,
}

impl ApplyFlags {
    pub(crate) fn options(self, config: &Config) -> ApplyOptions {
        config.apply_options(self.no_backup, self.yes)
    }
}
