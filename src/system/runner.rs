//! Backend command execution
//!
//! Every category goes through the same path: spawn the argv with the
//! terminal's stdio inherited (so password prompts and progress bars stay
//! visible), wait for it, and map the exit status to a result.

use crate::error::InstallError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Something that can run a fully built backend argv to completion
pub trait CommandRunner {
    fn run(&mut self, argv: &[String]) -> Result<(), InstallError>;
}

/// Runs commands for real, blocking until each one exits
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, argv: &[String]) -> Result<(), InstallError> {
        let (program, args) = split_argv(argv)?;
        log::debug!("running {:?}", argv);

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| InstallError::ExecutionFailed {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            log::debug!("{} exited with {:?}", program, status.code());
            Err(InstallError::NonZeroExit {
                program: program.to_string(),
                code: status.code(),
            })
        }
    }
}

/// Prints what would run instead of running it
pub struct DryRunRunner<W: Write> {
    out: W,
}

impl<W: Write> DryRunRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CommandRunner for DryRunRunner<W> {
    fn run(&mut self, argv: &[String]) -> Result<(), InstallError> {
        split_argv(argv)?;
        // A closed stdout should not turn a dry run into a failed install
        let _ = writeln!(self.out, "Dry run: would execute {}", super::preview(argv));
        Ok(())
    }
}

/// Run a command and capture its stdout; used for read-only queries
pub fn capture(argv: &[&str]) -> Result<String, InstallError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(empty_argv());
    };

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|source| InstallError::ExecutionFailed {
            program: program.to_string(),
            source,
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(InstallError::NonZeroExit {
            program: program.to_string(),
            code: output.status.code(),
        })
    }
}

fn split_argv(argv: &[String]) -> Result<(&str, &[String]), InstallError> {
    argv.split_first()
        .map(|(program, args)| (program.as_str(), args))
        .ok_or_else(empty_argv)
}

fn empty_argv() -> InstallError {
    InstallError::ExecutionFailed {
        program: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
    }
}

/// Records every argv and answers with scripted exit codes
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub calls: Vec<Vec<String>>,
    /// Exit codes returned in call order; missing entries mean success
    pub exit_codes: Vec<i32>,
    /// Package names whose command fails whenever they appear in the argv
    pub failing: Vec<String>,
    /// Package names whose command cannot be launched at all
    pub unlaunchable: Vec<String>,
}

#[cfg(test)]
impl RecordingRunner {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unlaunchable_on(names: &[&str]) -> Self {
        Self {
            unlaunchable: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&mut self, argv: &[String]) -> Result<(), InstallError> {
        let call = self.calls.len();
        self.calls.push(argv.to_vec());

        if argv.iter().any(|arg| self.unlaunchable.contains(arg)) {
            return Err(InstallError::ExecutionFailed {
                program: argv[0].clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        let scripted = self.exit_codes.get(call).copied().unwrap_or(0);
        let hits_failing = argv.iter().any(|arg| self.failing.contains(arg));
        if scripted == 0 && !hits_failing {
            Ok(())
        } else {
            Err(InstallError::NonZeroExit {
                program: argv[0].clone(),
                code: Some(if scripted == 0 { 1 } else { scripted }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_system_runner_exit_status() {
        let mut runner = SystemRunner;
        assert!(runner.run(&argv(&["true"])).is_ok());
        assert!(matches!(
            runner.run(&argv(&["false"])),
            Err(InstallError::NonZeroExit { code: Some(1), .. })
        ));
    }

    #[test]
    fn test_spawn_failure_is_execution_failed() {
        let mut runner = SystemRunner;
        let result = runner.run(&argv(&["pkgport-definitely-not-a-binary"]));
        assert!(matches!(result, Err(InstallError::ExecutionFailed { .. })));
        assert!(matches!(runner.run(&[]), Err(InstallError::ExecutionFailed { .. })));
    }

    #[test]
    fn test_dry_run_prints_command() {
        let mut out = Vec::new();
        DryRunRunner::new(&mut out)
            .run(&argv(&["sudo", "apt-get", "-y", "install", "htop"]))
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Dry run: would execute sudo apt-get -y install htop\n"
        );
    }

    #[test]
    fn test_capture_stdout() {
        assert_eq!(capture(&["echo", "htop"]).unwrap(), "htop\n");
        assert!(capture(&[]).is_err());
    }

    #[test]
    fn test_recording_runner_scripts_failures() {
        let mut runner = RecordingRunner::failing_on(&["broken"]);
        assert!(runner.run(&argv(&["apt-get", "install", "ok"])).is_ok());
        assert!(runner.run(&argv(&["apt-get", "install", "broken"])).is_err());
        assert_eq!(runner.calls.len(), 2);

        let mut runner = RecordingRunner::unlaunchable_on(&["ghost"]);
        assert!(matches!(
            runner.run(&argv(&["apt-get", "install", "ghost"])),
            Err(InstallError::ExecutionFailed { .. })
        ));
    }
}
