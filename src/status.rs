//! Rotating progress messages shown while a flyer is generating.
//!
//! Purely cosmetic: the messages are not tied to actual progress.

use std::time::Duration;

/// Canned messages, shown in order.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Applying institutional colors...",
    "Formatting typography for print...",
    "Positioning university logo...",
    "Optimizing layout for academic standards...",
    "Generating final flyer design...",
    "Polishing visual hierarchy...",
];

/// Time each message stays on screen.
pub const MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

/// Cursor over [`LOADING_MESSAGES`] that wraps after the last one.
#[derive(Debug, Clone, Default)]
pub struct StatusCycle {
    index: usize,
}

impl StatusCycle {
    /// Starts at the first message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message currently shown.
    pub fn current(&self) -> &'static str {
        LOADING_MESSAGES[self.index]
    }

    /// Moves to the next message and returns it.
    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % LOADING_MESSAGES.len();
        self.current()
    }
}

/// Runs `work` while calling `show` with a new message every [`MESSAGE_INTERVAL`].
///
/// `show` receives the first message immediately.
pub async fn with_status<F, T>(work: F, mut show: impl FnMut(&'static str)) -> T
where
    F: std::future::Future<Output = T>,
{
    let mut cycle = StatusCycle::new();
    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + MESSAGE_INTERVAL,
        MESSAGE_INTERVAL,
    );
    show(cycle.current());

    tokio::pin!(work);
    loop {
        tokio::select! {
            output = &mut work => return output,
            _ = ticker.tick() => show(cycle.advance()),
        }
    }
}
