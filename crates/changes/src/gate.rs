use crate::diff::FileDiff;

/// Decides whether an existing file may be overwritten
pub trait OverwriteGate {
    fn allow_overwrite(&mut self, path: &str, diff: &FileDiff) -> bool;
}

/// Approves every overwrite
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl OverwriteGate for AllowAll {
    fn allow_overwrite(&mut self, _path: &str, _diff: &FileDiff) -> bool {
        true
    }
}

/// Declines every overwrite
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl OverwriteGate for DenyAll {
    fn allow_overwrite(&mut self, _path: &str, _diff: &FileDiff) -> bool {
        false
    }
}

impl<F> OverwriteGate for F
where
    F: FnMut(&str, &FileDiff) -> bool,
{
    fn allow_overwrite(&mut self, path: &str, diff: &FileDiff) -> bool {
        self(path, diff)
    }
}
