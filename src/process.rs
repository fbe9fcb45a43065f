use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::error::{Error, Result};
use crate::output::{self, OutputStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Service,
	Tunnel,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Service => write!(f, "service"),
			Role::Tunnel => write!(f, "tunnel"),
		}
	}
}

/// One running child process. Either running or terminated; once
/// terminated it is never reused.
pub struct ProcessHandle {
	pub role: Role,
	pub lines: OutputStream,
	child: Child,
	pid: u32,
	terminated: bool,
}

/// Spawns `command` under `sh -c` in its own process group, with an
/// output reader attached before returning.
pub fn spawn(command: &str, dir: &Path, role: Role) -> Result<ProcessHandle> {
	let mut cmd = Command::new("sh");
	cmd.args(["-c", command])
		.current_dir(dir)
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.process_group(0)
		.kill_on_drop(true);

	let mut child = cmd.spawn().map_err(|source| Error::Spawn { role, source })?;
	let pid = child.id().unwrap_or(0);
	let lines = output::attach(&mut child);
	tracing::info!("{} started (pid {})", role, pid);

	Ok(ProcessHandle {
		role,
		lines,
		child,
		pid,
		terminated: false,
	})
}

impl ProcessHandle {
	pub fn pid(&self) -> u32 {
		self.pid
	}

	/// True until the process has exited for any reason.
	pub fn is_alive(&mut self) -> bool {
		if self.terminated {
			return false;
		}
		matches!(self.child.try_wait(), Ok(None))
	}

	/// Graceful stop: SIGTERM to the process group, wait up to `grace`,
	/// SIGKILL if still alive. Idempotent, never an error.
	pub async fn terminate(&mut self, grace: Duration) {
		if self.terminated {
			return;
		}
		self.terminated = true;

		signal_group(self.pid, nix::sys::signal::Signal::SIGTERM);
		if tokio::time::timeout(grace, self.child.wait()).await.is_err() {
			tracing::warn!("{} (pid {}) ignored SIGTERM, killing", self.role, self.pid);
			signal_group(self.pid, nix::sys::signal::Signal::SIGKILL);
			let _ = self.child.wait().await;
		}
		tracing::info!("{} (pid {}) terminated", self.role, self.pid);
	}
}

fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
	use nix::sys::signal::killpg;
	use nix::unistd::Pid;
	let _ = killpg(Pid::from_raw(pid as i32), signal);
}
