use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

/// Fan-out registry for live updates to connected clients. Constructed
/// explicitly and owned by whatever component broadcasts; its lifetime
/// follows the service's own startup and shutdown.
pub struct UpdateRegistry {
	subscribers: Mutex<Vec<mpsc::UnboundedSender<Value>>>,
}

impl UpdateRegistry {
	pub fn new() -> Self {
		Self {
			subscribers: Mutex::new(Vec::new()),
		}
	}

	pub async fn register(&self) -> mpsc::UnboundedReceiver<Value> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.subscribers.lock().await.push(tx);
		rx
	}

	/// Best-effort fan-out. Subscribers that can no longer receive are
	/// pruned. Returns how many remain.
	pub async fn broadcast(&self, message: &Value) -> usize {
		let mut subscribers = self.subscribers.lock().await;
		subscribers.retain(|tx| tx.send(message.clone()).is_ok());
		tracing::debug!("broadcast to {} subscribers", subscribers.len());
		subscribers.len()
	}

	pub async fn len(&self) -> usize {
		self.subscribers.lock().await.len()
	}
}

impl Default for UpdateRegistry {
	fn default() -> Self {
		Self::new()
	}
}
