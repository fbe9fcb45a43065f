use std::fmt;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::Result;
use crate::health;
use crate::notify::{Message, Notifier};
use crate::process::{self, ProcessHandle, Role};
use crate::tunnel;

/// What a monitoring poll decided, in priority order: a due refresh or a
/// dead service ends the cycle, a dead tunnel is replaced in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
	ScheduledRefresh,
	ServiceCrashed,
	TunnelCrashed,
}

impl fmt::Display for CycleEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CycleEvent::ScheduledRefresh => write!(f, "scheduled refresh"),
			CycleEvent::ServiceCrashed => write!(f, "service crash"),
			CycleEvent::TunnelCrashed => write!(f, "tunnel crash"),
		}
	}
}

/// Cycle-ending conditions are checked before the tunnel-only one: once
/// the service is gone (or a refresh is due) the tunnel's state is
/// irrelevant. Deterministic regardless of which became true first
/// within the same poll.
pub fn poll_event(refresh_due: bool, service_alive: bool, tunnel_alive: bool) -> Option<CycleEvent> {
	if refresh_due {
		return Some(CycleEvent::ScheduledRefresh);
	}
	if !service_alive {
		return Some(CycleEvent::ServiceCrashed);
	}
	if !tunnel_alive {
		return Some(CycleEvent::TunnelCrashed);
	}
	None
}

enum CycleEnd {
	Restart(CycleEvent),
	StartupFailed,
	Shutdown,
}

enum MonitorExit {
	Event(CycleEvent),
	Shutdown,
}

/// Owns the outer restart cycle: spawn the service, wait for readiness,
/// spawn the tunnel, report its URL, then watch both until a restart or
/// operator shutdown.
pub struct Supervisor {
	config: Config,
	notifier: Notifier,
	url_pattern: Regex,
	restarts: u32,
}

impl Supervisor {
	pub fn new(config: Config) -> Result<Self> {
		let url_pattern = Regex::new(&config.tunnel.url_pattern)?;
		let notifier = Notifier::new(config.notify.webhook_url.clone())?;
		Ok(Self {
			config,
			notifier,
			url_pattern,
			restarts: 0,
		})
	}

	pub fn restarts(&self) -> u32 {
		self.restarts
	}

	/// Runs supervision cycles until `cancel` flips or startup fails
	/// terminally. Child-process and network errors never escape this
	/// loop; they become restart decisions or logged notices.
	pub async fn run(&mut self, mut cancel: watch::Receiver<bool>) {
		loop {
			if *cancel.borrow() {
				return;
			}
			match self.run_cycle(&mut cancel).await {
				Ok(CycleEnd::Restart(event)) => {
					self.restarts += 1;
					tracing::info!("restart cycle {} complete ({})", self.restarts, event);
					self.notifier
						.notify(&Message::new(format!("Restart {}", self.restarts)))
						.await;
				}
				Ok(CycleEnd::StartupFailed) => {
					tracing::error!("service never became ready, giving up");
					return;
				}
				Ok(CycleEnd::Shutdown) => {
					tracing::info!("supervisor shutting down");
					return;
				}
				Err(e) => {
					tracing::error!("cycle failed: {}", e);
					sleep(Duration::from_secs(1)).await;
				}
			}
		}
	}

	async fn run_cycle(&mut self, cancel: &mut watch::Receiver<bool>) -> Result<CycleEnd> {
		let grace = Duration::from_secs(self.config.supervisor.grace_secs);
		let cycle_start = Instant::now();

		tracing::info!("starting service");
		let mut service = process::spawn(
			&self.config.service.command,
			&self.config.service.dir,
			Role::Service,
		)?;

		let probe_interval = Duration::from_secs(self.config.service.probe_interval_secs);
		let max_ready = self.config.service.max_ready_wait_secs.map(Duration::from_secs);
		tokio::select! {
			res = health::wait_ready(&self.config.service.health_url, probe_interval, max_ready) => {
				if let Err(e) = res {
					tracing::error!("{}", e);
					self.notifier
						.notify(&Message::new(format!("Startup failed: {}", e)))
						.await;
					service.terminate(grace).await;
					return Ok(CycleEnd::StartupFailed);
				}
			}
			_ = cancel.changed() => {
				service.terminate(grace).await;
				return Ok(CycleEnd::Shutdown);
			}
		}

		let mut tunnel = tokio::select! {
			res = self.start_tunnel(false) => match res {
				Ok(handle) => handle,
				Err(e) => {
					service.terminate(grace).await;
					return Err(e);
				}
			},
			_ = cancel.changed() => {
				service.terminate(grace).await;
				return Ok(CycleEnd::Shutdown);
			}
		};

		let refresh = Duration::from_secs(self.config.supervisor.refresh_secs);
		let poll = Duration::from_secs(self.config.supervisor.poll_interval_secs);

		let exit = loop {
			tokio::select! {
				_ = sleep(poll) => {}
				_ = cancel.changed() => break MonitorExit::Shutdown,
			}

			let refresh_due = cycle_start.elapsed() >= refresh;
			match poll_event(refresh_due, service.is_alive(), tunnel.is_alive()) {
				Some(CycleEvent::TunnelCrashed) => {
					tracing::warn!("tunnel crashed, restarting tunnel only");
					tunnel.terminate(grace).await;
					tokio::select! {
						res = self.start_tunnel(true) => match res {
							Ok(handle) => tunnel = handle,
							Err(e) => {
								// Escalate a failed tunnel respawn to a
								// full-cycle restart.
								tracing::error!("tunnel restart failed: {}", e);
								break MonitorExit::Event(CycleEvent::TunnelCrashed);
							}
						},
						_ = cancel.changed() => break MonitorExit::Shutdown,
					}
				}
				Some(event) => {
					tracing::warn!("{}, restarting both processes", event);
					break MonitorExit::Event(event);
				}
				None => {}
			}
		};

		// The tunnel forwards to the service, so it goes down first.
		tunnel.terminate(grace).await;
		service.terminate(grace).await;

		match exit {
			MonitorExit::Event(event) => Ok(CycleEnd::Restart(event)),
			MonitorExit::Shutdown => Ok(CycleEnd::Shutdown),
		}
	}

	/// Spawns the tunnel and waits (bounded) for its public URL. A
	/// missing URL is degraded but not fatal: the handle is returned
	/// anyway and the cycle continues with the tunnel unreachable.
	async fn start_tunnel(&self, restarted: bool) -> Result<ProcessHandle> {
		tracing::info!("starting tunnel");
		let mut tunnel = process::spawn(
			&self.config.tunnel.command,
			&self.config.tunnel.dir,
			Role::Tunnel,
		)?;

		let timeout = Duration::from_secs(self.config.tunnel.url_timeout_secs);
		match tunnel::extract_url(&mut tunnel.lines, &self.url_pattern, timeout).await {
			Ok(url) => {
				tracing::info!("tunnel URL: {}", url);
				let verb = if restarted { "restarted" } else { "started" };
				self.notifier
					.notify(&Message::new(format!("Tunnel {}: {}", verb, url)))
					.await;
			}
			Err(e) => {
				tracing::warn!("{}", e);
				self.notifier
					.notify(&Message::new(format!("Tunnel URL not found: {}", e)))
					.await;
			}
		}

		Ok(tunnel)
	}
}
