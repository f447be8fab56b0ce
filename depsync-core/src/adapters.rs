//! Default process-backed port implementations.

use crate::ports::{BuildInterpreter, BuildRequest, Ports};
use crate::settings::SyncSettings;
use anyhow::Context;
use camino::Utf8PathBuf;
use depsync_core_runtime::{CommandRunner, ProcessRunner};
use depsync_remote::CipdCli;
use depsync_types::CommandSpec;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs `gradlew ... setupRepository`, then optionally `gn format`.
#[derive(Clone)]
pub struct GradleInterpreter {
    runner: Arc<dyn CommandRunner>,
    gradle_wrapper: Utf8PathBuf,
    gn: Option<String>,
}

impl GradleInterpreter {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        gradle_wrapper: impl Into<Utf8PathBuf>,
        gn: Option<String>,
    ) -> Self {
        Self {
            runner,
            gradle_wrapper: gradle_wrapper.into(),
            gn,
        }
    }

    pub fn build_command(&self, request: &BuildRequest) -> CommandSpec {
        let mut spec = CommandSpec::new(self.gradle_wrapper.as_str())
            .arg("-b")
            .arg(request.build_file.as_str())
            .args(["setupRepository", "--stacktrace"]);
        if request.debug {
            spec = spec.arg("--debug");
        }
        if request.skip_licenses {
            spec = spec.arg("-PskipLicenses=true");
        }
        spec
    }

    pub fn format_command(&self, request: &BuildRequest) -> Option<CommandSpec> {
        self.gn.as_ref().map(|gn| {
            CommandSpec::new(gn)
                .arg("format")
                .arg(request.build_gn.as_str())
        })
    }
}

impl BuildInterpreter for GradleInterpreter {
    fn build(&self, request: &BuildRequest) -> anyhow::Result<()> {
        info!("running build interpreter");
        let spec = self.build_command(request);
        let out = self.runner.run_checked(&spec).context("build interpreter failed")?;
        debug!(output = %out.output, "build interpreter output");

        if let Some(spec) = self.format_command(request) {
            info!(path = %request.build_gn, "reformatting build file");
            self.runner
                .run_checked(&spec)
                .with_context(|| format!("format {}", request.build_gn))?;
        }
        Ok(())
    }
}

impl Ports {
    /// Wire the real external tools described by `settings`.
    pub fn system(settings: &SyncSettings) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
        let interpreter = GradleInterpreter::new(
            runner.clone(),
            settings.resolve(&settings.tools.gradle_wrapper),
            settings.tools.gn.clone(),
        );
        let remote = CipdCli::with_program(runner.clone(), settings.tools.cipd.clone());
        Self {
            runner,
            interpreter: Arc::new(interpreter),
            remote: Arc::new(remote),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsync_core_runtime::{CommandOutput, ExecError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CommandRunner for Recorder {
        fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
            self.0.lock().unwrap().push(spec.display());
            Ok(CommandOutput {
                status: Some(0),
                output: String::new(),
            })
        }
    }

    fn request(debug: bool, skip_licenses: bool) -> BuildRequest {
        BuildRequest {
            staging_root: "/b".into(),
            build_file: "/b/deps/build.gradle".into(),
            build_gn: "/b/deps/BUILD.gn".into(),
            debug,
            skip_licenses,
        }
    }

    #[test]
    fn gradle_command_flags() {
        let gradle = GradleInterpreter::new(Arc::new(Recorder::default()), "/src/gradlew", None);
        assert_eq!(
            gradle.build_command(&request(false, false)).display(),
            "/src/gradlew -b /b/deps/build.gradle setupRepository --stacktrace"
        );
        assert_eq!(
            gradle.build_command(&request(true, true)).display(),
            "/src/gradlew -b /b/deps/build.gradle setupRepository --stacktrace --debug -PskipLicenses=true"
        );
    }

    #[test]
    fn build_then_format() {
        let recorder = Arc::new(Recorder::default());
        let gradle = GradleInterpreter::new(recorder.clone(), "gradlew", Some("gn".into()));
        gradle.build(&request(false, false)).unwrap();
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "gradlew -b /b/deps/build.gradle setupRepository --stacktrace".to_string(),
                "gn format /b/deps/BUILD.gn".to_string(),
            ]
        );
    }

    #[test]
    fn system_ports_resolve_wrapper_against_repo_root() {
        let settings = SyncSettings {
            repo_root: "/src".into(),
            ..SyncSettings::default()
        };
        let ports = Ports::system(&settings);
        let ok = ports.interpreter.build(&request(false, false));
        // The wrapper does not exist here, so the spawn error names it.
        let msg = format!("{:#}", ok.unwrap_err());
        assert!(msg.contains("/src/third_party/gradle_wrapper/gradlew"), "{msg}");
    }
}
