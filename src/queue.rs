use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

/// Unbounded FIFO job queue whose `pop` suspends until a job arrives.
/// Single producer / single consumer is the expected usage, but nothing
/// here depends on it.
pub struct JobQueue<T> {
	items: Mutex<VecDeque<T>>,
	available: Notify,
}

impl<T> JobQueue<T> {
	pub fn new() -> Self {
		Self {
			items: Mutex::new(VecDeque::new()),
			available: Notify::new(),
		}
	}

	pub async fn push(&self, job: T) {
		self.items.lock().await.push_back(job);
		self.available.notify_one();
	}

	pub async fn pop(&self) -> T {
		loop {
			// Register for a wakeup before checking, so a push between
			// the check and the await is not missed.
			let notified = self.available.notified();
			if let Some(job) = self.items.lock().await.pop_front() {
				return job;
			}
			notified.await;
		}
	}

	pub async fn len(&self) -> usize {
		self.items.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.items.lock().await.is_empty()
	}
}

impl<T> Default for JobQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}
