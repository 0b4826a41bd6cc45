use crate::config::OracleConfig;
use anyhow::{anyhow, Context, Result};
use std::io::{self, BufRead, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

#[derive(Debug)]
pub struct CommandOracle {
    config: OracleConfig,
    timeout: Option<Duration>,
    timeouts: AtomicU64,
}

impl CommandOracle {
    pub fn new(config: OracleConfig, timeout_ms: Option<u64>) -> Self {
        let timeout = timeout_ms.or(config.timeout_ms).map(Duration::from_millis);
        Self {
            config,
            timeout,
            timeouts: AtomicU64::new(0),
        }
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    #[instrument(skip_all, fields(len = candidate.len()))]
    pub fn test(&self, candidate: &[String]) -> Result<bool> {
        let cmd = &self.config.cmd;
        let mut command = Command::new(&cmd[0]);
        command.args(&cmd[1..]);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }
        command.envs(&self.config.env);
        command.env("DDMIN_CANDIDATE_SIZE", candidate.len().to_string());
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!("spawning oracle command");
        let mut child = command
            .spawn()
            .with_context(|| format!("spawn oracle command: {}", cmd.join(" ")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        let payload = candidate_payload(candidate);
        let writer = thread::spawn(move || write_candidate(stdin, &payload));

        let status = match self.wait(&mut child) {
            Ok(status) => status,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        // A grandchild holding the inherited stdin can keep the writer blocked past the
        // timeout, so a timed-out trial leaves the writer detached.
        if status.is_some() {
            match writer.join() {
                Ok(result) => result.context("write candidate to oracle stdin")?,
                Err(_) => anyhow::bail!("stdin writer thread panicked"),
            }
        } else if !writer.is_finished() {
            debug!("leaving stdin writer detached after timeout");
        }

        let Some(status) = status else {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        };
        let reproduces = self.reproduces(status);
        debug!(exit_code = ?status.code(), reproduces, "oracle command finished");
        Ok(reproduces)
    }

    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return Ok(Some(child.wait().context("wait for oracle command")?));
        };
        if let Some(status) = child
            .wait_timeout(timeout)
            .context("wait for oracle command")?
        {
            return Ok(Some(status));
        }
        warn!(
            timeout_ms = timeout.as_millis() as u64,
            "oracle command timed out, killing"
        );
        child.kill().context("kill oracle command")?;
        child.wait().context("wait oracle command after kill")?;
        Ok(None)
    }

    fn reproduces(&self, status: ExitStatus) -> bool {
        reproduces_with(self.config.reproduces_exit_codes.as_deref(), status.code())
    }
}

// Without an explicit list any non-zero exit, or death by signal, counts as a crash.
fn reproduces_with(expected: Option<&[i32]>, code: Option<i32>) -> bool {
    match expected {
        Some(codes) => code.is_some_and(|code| codes.contains(&code)),
        None => code != Some(0),
    }
}

fn candidate_payload(candidate: &[String]) -> Vec<u8> {
    let mut payload = String::new();
    for element in candidate {
        payload.push_str(element);
        payload.push('\n');
    }
    payload.into_bytes()
}

fn write_candidate(mut stdin: ChildStdin, payload: &[u8]) -> io::Result<()> {
    match stdin.write_all(payload) {
        // The oracle may exit without reading its input.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

pub struct InteractiveOracle<R, W> {
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> InteractiveOracle<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }

    pub fn test(&mut self, candidate: &[String]) -> Result<bool> {
        writeln!(self.prompt, "\nTesting ({} elements):", candidate.len())?;
        for element in candidate {
            writeln!(self.prompt, "  {element}")?;
        }
        write!(self.prompt, "Reproduces? (y/n): ")?;
        self.prompt.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).context("read answer")? == 0 {
            anyhow::bail!("interactive oracle: unexpected end of input");
        }
        Ok(matches!(line.trim_start().chars().next(), Some('y' | 'Y')))
    }
}
