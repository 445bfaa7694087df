//! Fire-and-join helper.

use std::thread;

use tracing::error;

/// A unit of concurrent work; may borrow from the caller's stack.
pub type Task<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Run every task on its own thread and block until all have finished.
///
/// Tasks report their own failures (typically through a [`Reporter`]); this
/// helper returns nothing. No ordering holds between tasks. If any task
/// panicked, the first panic is resumed here once every task has joined.
///
/// [`Reporter`]: crate::Reporter
pub fn run_concurrent(tasks: Vec<Task<'_>>) {
    if tasks.is_empty() {
        return;
    }

    let total = tasks.len();
    let panics: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = tasks.into_iter().map(|task| s.spawn(task)).collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().err())
            .collect()
    });

    if let Some(payload) = panics.into_iter().next() {
        error!(tasks = total, "concurrent task panicked");
        std::panic::resume_unwind(payload);
    }
}

/// Run closures concurrently and wait for all of them.
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let hits = AtomicUsize::new(0);
/// kvprobe::concurrently!(
///     || { hits.fetch_add(1, Ordering::SeqCst); },
///     || { hits.fetch_add(1, Ordering::SeqCst); },
/// );
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// ```
#[macro_export]
macro_rules! concurrently {
    ($($task:expr),* $(,)?) => {
        $crate::concurrent::run_concurrent(vec![
            $(Box::new($task) as $crate::concurrent::Task<'_>),*
        ])
    };
}
