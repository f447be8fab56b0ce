use crate::RemoteStore;
use anyhow::Context;
use camino::Utf8Path;
use depsync_core_runtime::CommandRunner;
use depsync_types::{CommandSpec, DESCRIPTOR_FILE_NAME, PackageDescriptor, UploadCommand};
use std::sync::Arc;
use tracing::debug;

/// [`RemoteStore`] backed by the `cipd` command line client.
#[derive(Clone)]
pub struct CipdCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl CipdCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_program(runner, "cipd")
    }

    pub fn with_program(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn describe_command(&self, descriptor: &PackageDescriptor) -> CommandSpec {
        CommandSpec::new(&self.program).args([
            "describe",
            descriptor.name.as_str(),
            "-version",
            descriptor.tag.as_str(),
        ])
    }

    pub fn create_command(&self, descriptor: &PackageDescriptor) -> CommandSpec {
        CommandSpec::new(&self.program).args([
            "create",
            "--pkg-def",
            DESCRIPTOR_FILE_NAME,
            "-tag",
            descriptor.tag.as_str(),
        ])
    }
}

impl std::fmt::Debug for CipdCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipdCli")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl RemoteStore for CipdCli {
    fn exists(&self, descriptor: &PackageDescriptor) -> anyhow::Result<bool> {
        let spec = self.describe_command(descriptor);
        let out = self
            .runner
            .run(&spec)
            .with_context(|| format!("probe {}@{}", descriptor.name, descriptor.tag))?;
        debug!(package = %descriptor.name, tag = %descriptor.tag, status = ?out.status, "probed");
        Ok(out.success())
    }

    fn creation_command(
        &self,
        package_dir: &Utf8Path,
        descriptor: &PackageDescriptor,
    ) -> UploadCommand {
        UploadCommand {
            package: descriptor.name.clone(),
            package_dir: package_dir.to_path_buf(),
            describe: self.describe_command(descriptor),
            create: self.create_command(descriptor),
        }
    }
}
