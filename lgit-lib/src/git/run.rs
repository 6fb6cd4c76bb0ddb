use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt::Write;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use eyre::Context;
use itertools::Itertools;
use tracing::{instrument, warn};

use crate::core::effects::Effects;
use crate::util::{ExitCode, EyreExitOr};

/// Path to the `git` executable on disk to be executed.
#[derive(Clone)]
pub struct GitRunInfo {
    /// The path to the Git executable on disk.
    pub path_to_git: PathBuf,

    /// The working directory that the Git executable should be run in.
    pub working_directory: PathBuf,

    /// The environment variables that should be passed to the Git process.
    pub env: HashMap<OsString, OsString>,
}

impl std::fmt::Debug for GitRunInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<GitRunInfo path_to_git={:?} working_directory={:?} env=not shown>",
            self.path_to_git, self.working_directory
        )
    }
}

/// Options for invoking Git.
pub struct GitRunOpts {
    /// If set, a non-zero exit code will be treated as an error.
    pub treat_git_failure_as_error: bool,

    /// Environment variables to set for this invocation only, on top of
    /// `GitRunInfo::env`.
    pub env: Vec<(OsString, OsString)>,
}

impl Default for GitRunOpts {
    fn default() -> Self {
        Self {
            treat_git_failure_as_error: true,
            env: Default::default(),
        }
    }
}

/// The result of invoking Git.
#[must_use]
pub struct GitRunResult {
    /// The exit code of the process.
    pub exit_code: ExitCode,

    /// The stdout contents written by the invocation.
    pub stdout: Vec<u8>,

    /// The stderr contents written by the invocation.
    pub stderr: Vec<u8>,
}

impl std::fmt::Debug for GitRunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<GitRunResult exit_code={:?} stdout={:?} stderr={:?}>",
            self.exit_code,
            String::from_utf8_lossy(&self.stdout),
            String::from_utf8_lossy(&self.stderr),
        )
    }
}

/// Render the arguments of a Git invocation the way a user would type them.
fn render_args(args: &[&OsStr]) -> String {
    shell_words::join(args.iter().map(|arg| arg.to_string_lossy()))
}

impl GitRunInfo {
    fn spawn_writer_thread<
        InputStream: Read + Send + 'static,
        OutputStream: Write + Send + 'static,
    >(
        &self,
        stream: Option<InputStream>,
        mut output: OutputStream,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let stream = match stream {
                Some(stream) => stream,
                None => return,
            };
            let reader = BufReader::new(stream);
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(?err, "Could not read line from subprocess");
                        return;
                    }
                };
                if writeln!(output, "{line}").is_err() {
                    return;
                }
            }
        })
    }

    fn make_command(&self, args: &[&OsStr]) -> Command {
        let GitRunInfo {
            path_to_git,
            working_directory,
            env,
        } = self;

        let mut command = Command::new(path_to_git);
        command.current_dir(working_directory);
        command.args(args);
        command.env_clear();
        command.envs(env.iter());
        command
    }

    fn wait_for_exit_code(mut child: std::process::Child) -> eyre::Result<ExitCode> {
        let exit_status = child
            .wait()
            .wrap_err("Waiting for Git subprocess to complete")?;
        let exit_code: ExitCode = exit_status
            .try_into()
            .wrap_err("Converting exit code from i32 to isize")?;
        Ok(exit_code)
    }

    fn run_inner(&self, effects: &Effects, args: &[&OsStr]) -> EyreExitOr<()> {
        writeln!(
            effects.get_output_stream(),
            "{}",
            effects
                .get_glyphs()
                .render_dim(format!("lgit: running command: git {}", render_args(args)))
        )?;

        let mut command = self.make_command(args);
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().wrap_err("Spawning Git subprocess")?;

        let stdout = child.stdout.take();
        let stdout_thread = self.spawn_writer_thread(stdout, effects.get_output_stream());
        let stderr = child.stderr.take();
        let stderr_thread = self.spawn_writer_thread(stderr, effects.get_error_stream());

        let exit_code = Self::wait_for_exit_code(child)?;
        if stdout_thread.join().is_err() || stderr_thread.join().is_err() {
            eyre::bail!("Output thread for Git subprocess panicked");
        }

        if exit_code.is_success() {
            Ok(Ok(()))
        } else {
            Ok(Err(exit_code))
        }
    }

    /// Run Git in a subprocess, and inform the user.
    ///
    /// This is suitable for commands which affect the working copy. The
    /// output of Git is forwarded to the user through `effects`.
    ///
    /// `args` contains the list of arguments to pass to Git, not including the Git
    /// executable itself.
    ///
    /// Returns the exit code of Git (non-zero signifies error).
    #[instrument]
    #[must_use = "The return code for `GitRunInfo::run` must be checked"]
    pub fn run<S: AsRef<OsStr> + std::fmt::Debug>(
        &self,
        effects: &Effects,
        args: &[S],
    ) -> EyreExitOr<()> {
        self.run_inner(
            effects,
            args.iter().map(AsRef::as_ref).collect_vec().as_slice(),
        )
    }

    /// Run the provided command attached directly to the user's terminal,
    /// without capturing its output. This is necessary for commands like `git
    /// diff`, which may start a pager; usually, see [`GitRunInfo::run`]
    /// instead.
    #[instrument]
    #[must_use = "The return code for `GitRunInfo::run_direct_no_wrapping` must be checked"]
    pub fn run_direct_no_wrapping(
        &self,
        args: &[impl AsRef<OsStr> + std::fmt::Debug],
    ) -> EyreExitOr<()> {
        let args: Vec<&OsStr> = args.iter().map(AsRef::as_ref).collect();
        let command = self.make_command(&args).spawn();
        let child = command.wrap_err("Spawning Git subprocess")?;
        let exit_code = Self::wait_for_exit_code(child)?;
        if exit_code.is_success() {
            Ok(Ok(()))
        } else {
            Ok(Err(exit_code))
        }
    }

    fn run_silent_inner(&self, args: &[&str], opts: GitRunOpts) -> eyre::Result<GitRunResult> {
        let GitRunOpts {
            treat_git_failure_as_error,
            env,
        } = opts;

        let os_args = args.iter().map(OsStr::new).collect_vec();
        let mut command = self.make_command(&os_args);
        command.envs(env);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let child = command.spawn().wrap_err("Spawning Git subprocess")?;
        let output = child
            .wait_with_output()
            .wrap_err("Spawning Git subprocess")?;
        let exit_code: ExitCode = output
            .status
            .try_into()
            .wrap_err("Converting exit code from i32 to isize")?;
        let result = GitRunResult {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        };
        if treat_git_failure_as_error && !exit_code.is_success() {
            eyre::bail!(
                "Git subprocess failed:\nArgs: {:?}\nResult: {:?}",
                &args,
                result
            );
        }
        Ok(result)
    }

    /// Run Git silently (don't display output to the user).
    ///
    /// This is used for commands whose output we parse, such as `git status`
    /// and `git reflog`.
    ///
    /// Returns the stdout of the Git invocation.
    #[instrument(skip(opts))]
    pub fn run_silent<S: AsRef<str> + std::fmt::Debug>(
        &self,
        args: &[S],
        opts: GitRunOpts,
    ) -> eyre::Result<GitRunResult> {
        self.run_silent_inner(
            args.iter().map(AsRef::as_ref).collect_vec().as_slice(),
            opts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_quotes_paths_with_spaces() {
        let args = [
            OsStr::new("add"),
            OsStr::new("--"),
            OsStr::new("a file.txt"),
            OsStr::new("plain.txt"),
        ];
        assert_eq!(render_args(&args), "add -- 'a file.txt' plain.txt");
    }
}
