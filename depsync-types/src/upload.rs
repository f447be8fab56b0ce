use crate::command::{CommandSpec, shell_quote};
use crate::descriptor::PackageDescriptor;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// A generated package and whether the remote store already has its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCandidate {
    pub descriptor: PackageDescriptor,
    pub exists_remotely: bool,
}

/// Idempotent "create if still missing" command for one package.
///
/// Renders as `(cd <dir>; <describe> || <create>)`, so running it after
/// someone else uploaded the package is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCommand {
    pub package: String,
    pub package_dir: Utf8PathBuf,
    pub describe: CommandSpec,
    pub create: CommandSpec,
}

impl UploadCommand {
    pub fn render(&self) -> String {
        format!(
            "(cd {}; {} || {})",
            shell_quote(self.package_dir.as_str()),
            self.describe.display(),
            self.create.display()
        )
    }
}
