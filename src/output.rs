use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// Ordered stream of lines from one child process, stdout and stderr merged.
pub type OutputStream = mpsc::UnboundedReceiver<String>;

/// Takes the child's piped stdout/stderr and forwards every line onto an
/// unbounded channel. Reading happens on separate tasks, so the child is
/// never slowed down and no line is lost while the consumer is blocked
/// elsewhere. The readers exit quietly when the stream closes or the
/// receiver is dropped.
pub fn attach(child: &mut Child) -> OutputStream {
	let (tx, rx) = mpsc::unbounded_channel();

	if let Some(stdout) = child.stdout.take() {
		tokio::spawn(pipe_lines(stdout, tx.clone()));
	}
	if let Some(stderr) = child.stderr.take() {
		tokio::spawn(pipe_lines(stderr, tx));
	}

	rx
}

async fn pipe_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
	R: AsyncRead + Unpin,
{
	let mut lines = BufReader::new(reader).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		if tx.send(line).is_err() {
			break;
		}
	}
}
