//! Execution contexts the authorizer routes work onto.
//!
//! Two contexts matter to an authorizer: the UI-owning context that runs authentication
//! challenges (never concurrently with itself) and the callback context on which every
//! `perform_authorized` completion is delivered. Both are modelled by [`ExecutionContext`];
//! [`SerialContext`] is the built-in implementation, a single consumer draining a job queue one
//! job at a time.

// crates.io
use tokio::{runtime::Handle, sync::mpsc};
// self
use crate::_prelude::*;

/// Unit of work scheduled on an [`ExecutionContext`].
pub type Job = Pin<Box<dyn Future<Output = ()> + 'static + Send>>;

/// Returned when a context no longer accepts work.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Execution context `{label}` is closed.")]
pub struct ContextClosed {
	/// Label of the closed context.
	pub label: String,
}

/// Destination for jobs that must run on a designated context.
///
/// Implementations must drive every accepted job to completion; dropping an accepted job breaks
/// the authorizer's exactly-once completion guarantee.
pub trait ExecutionContext
where
	Self: Send + Sync,
{
	/// Schedules `job`, or reports that the context is closed.
	fn execute(&self, job: Job) -> Result<(), ContextClosed>;
}

/// Serial job queue backed by a Tokio task.
///
/// Jobs run in submission order and never overlap: the next job starts only after the previous
/// one finished, even if it awaited in between.
#[derive(Clone)]
pub struct SerialContext {
	label: Arc<str>,
	sender: mpsc::UnboundedSender<Job>,
}
impl SerialContext {
	/// Spawns the queue's worker on `runtime`.
	///
	/// The worker exits once every clone of the returned context has been dropped and the queue
	/// has drained.
	pub fn spawn(runtime: &Handle, label: impl Into<Arc<str>>) -> Self {
		let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

		runtime.spawn(async move {
			while let Some(job) = receiver.recv().await {
				job.await;
			}
		});

		Self { label: label.into(), sender }
	}

	/// Label used in diagnostics.
	pub fn label(&self) -> &str {
		&self.label
	}
}
impl ExecutionContext for SerialContext {
	fn execute(&self, job: Job) -> Result<(), ContextClosed> {
		self.sender.send(job).map_err(|_| ContextClosed { label: self.label.to_string() })
	}
}
impl Debug for SerialContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SerialContext")
			.field("label", &self.label)
			.field("closed", &self.sender.is_closed())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::time::Duration;
	// crates.io
	use tokio::sync::oneshot;
	// self
	use super::*;

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn jobs_run_in_order_without_overlap() {
		let context = SerialContext::spawn(&Handle::current(), "ui");
		let log = Arc::new(Mutex::new(Vec::new()));
		let (done_tx, done_rx) = oneshot::channel();

		for idx in 0..5_u64 {
			let log = log.clone();

			context
				.execute(Box::pin(async move {
					log.lock().push(format!("start-{idx}"));
					tokio::time::sleep(Duration::from_millis(5 - idx)).await;
					log.lock().push(format!("end-{idx}"));
				}))
				.expect("Serial context should accept jobs.");
		}

		context
			.execute(Box::pin(async move {
				let _ = done_tx.send(());
			}))
			.expect("Serial context should accept the sentinel job.");
		done_rx.await.expect("Sentinel job should run.");

		let expected = (0..5).flat_map(|idx| [format!("start-{idx}"), format!("end-{idx}")]);

		assert_eq!(*log.lock(), expected.collect::<Vec<_>>());
	}

	#[test]
	fn closed_context_rejects_jobs() {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.build()
			.expect("Failed to build Tokio runtime for context test.");
		let context = SerialContext::spawn(runtime.handle(), "callbacks");

		drop(runtime);

		let err = context
			.execute(Box::pin(async {}))
			.expect_err("Context whose runtime shut down should be closed.");

		assert_eq!(err.label, "callbacks");
		assert_eq!(context.label(), "callbacks");
	}
}
