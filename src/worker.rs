use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::queue::JobQueue;

/// Caller-supplied overrides applied to a downloaded track's tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackMeta {
	pub title: Option<String>,
	pub artist: Option<String>,
}

/// A download request, tagged by how the track is located. Jobs arrive
/// as JSON with a `type` discriminator; anything unrecognized lands in
/// `Unknown` and is skipped with a warning rather than failing the
/// worker.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DownloadJob {
	Id {
		id: String,
		#[serde(default)]
		metadata: Option<TrackMeta>,
		#[serde(default)]
		playlists: Vec<String>,
	},
	Query {
		query: String,
		#[serde(default)]
		metadata: Option<TrackMeta>,
		#[serde(default)]
		playlists: Vec<String>,
	},
	/// Stops the worker loop; queued by [`Worker::shutdown`].
	Shutdown,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
	pub id: String,
	pub title: String,
	pub artist: String,
	pub duration_secs: u64,
}

/// Fetches tracks from the outside world. Errors are per-job and never
/// stop the worker.
#[async_trait]
pub trait Downloader: Send + Sync {
	async fn fetch_by_id(&self, id: &str, metadata: Option<&TrackMeta>) -> Result<Track, String>;
	async fn fetch_by_query(&self, query: &str, metadata: Option<&TrackMeta>)
		-> Result<Track, String>;
}

/// Persists downloaded tracks and their playlist membership.
#[async_trait]
pub trait TrackStore: Send + Sync {
	async fn log_track(&self, track: &Track);
	async fn log_download(&self, track_id: &str);
	async fn update_playlists(&self, track_id: &str, playlists: &[String]);
}

/// Pops jobs off the queue and dispatches them until told to stop.
pub struct Worker<D, S> {
	queue: Arc<JobQueue<DownloadJob>>,
	downloader: D,
	store: S,
}

impl<D: Downloader, S: TrackStore> Worker<D, S> {
	pub fn new(queue: Arc<JobQueue<DownloadJob>>, downloader: D, store: S) -> Self {
		Self {
			queue,
			downloader,
			store,
		}
	}

	pub async fn run(&self) {
		loop {
			let job = self.queue.pop().await;
			match job {
				DownloadJob::Id {
					id,
					metadata,
					playlists,
				} => match self.downloader.fetch_by_id(&id, metadata.as_ref()).await {
					Ok(track) => self.persist(&track, &playlists).await,
					Err(e) => tracing::error!("download by id {} failed: {}", id, e),
				},
				DownloadJob::Query {
					query,
					metadata,
					playlists,
				} => match self.downloader.fetch_by_query(&query, metadata.as_ref()).await {
					Ok(track) => self.persist(&track, &playlists).await,
					Err(e) => tracing::error!("download for query {:?} failed: {}", query, e),
				},
				DownloadJob::Shutdown => {
					tracing::info!("download worker stopping");
					return;
				}
				DownloadJob::Unknown => {
					tracing::warn!("unknown download job type, skipping");
				}
			}
		}
	}

	async fn persist(&self, track: &Track, playlists: &[String]) {
		self.store.log_track(track).await;
		self.store.log_download(&track.id).await;
		if !playlists.is_empty() {
			self.store.update_playlists(&track.id, playlists).await;
		}
	}

	pub async fn shutdown(&self) {
		self.queue.push(DownloadJob::Shutdown).await;
	}
}
