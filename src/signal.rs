//! # Completion notification
//!
//! The completion watcher reports every terminal event through a [`Notify`]
//! implementation handed to the driver at creation. [`CompletionSignal`] is a
//! ready-made counting notification a caller task can `.await` while another
//! task drives the poll loop:
//!
//! ```rust,ignore
//! static SIGNAL: CompletionSignal = CompletionSignal::new();
//!
//! let mut radio = Sx1278::new(spi, &SIGNAL);
//! // task A
//! radio.wait_for_completion(&mut delay).await?;
//! // task B
//! let events = SIGNAL.wait().await;
//! ```

use core::cell::Cell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::AtomicWaker;

/// Receiver of completion events
pub trait Notify {
    /// Signal one completion event
    fn notify(&self);
}

/// Notifications are dropped
impl Notify for () {
    fn notify(&self) {}
}

impl<T: Notify + ?Sized> Notify for &T {
    fn notify(&self) {
        T::notify(self)
    }
}

/// Counting single-slot notification
///
/// `notify` increments a pending count and wakes the waiter; `wait` and
/// `take` consume every pending signal at once and return how many there
/// were. Signalling more often than the waiter consumes is harmless.
pub struct CompletionSignal {
    count: Mutex<CriticalSectionRawMutex, Cell<u32>>,
    waker: AtomicWaker,
}

impl CompletionSignal {
    /// Create a signal with no pending notification
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
            waker: AtomicWaker::new(),
        }
    }

    /// Consume pending notifications without waiting
    pub fn take(&self) -> u32 {
        self.count.lock(|count| count.replace(0))
    }

    /// Number of notifications not consumed yet
    pub fn pending(&self) -> u32 {
        self.count.lock(|count| count.get())
    }

    /// Wait until at least one notification is pending, then consume all of them
    pub async fn wait(&self) -> u32 {
        poll_fn(|cx| {
            let count = self.take();
            if count > 0 {
                return Poll::Ready(count);
            }
            self.waker.register(cx.waker());
            // a notification may have landed between take and register
            match self.take() {
                0 => Poll::Pending,
                count => Poll::Ready(count),
            }
        })
        .await
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Notify for CompletionSignal {
    fn notify(&self) {
        self.count
            .lock(|count| count.set(count.get().saturating_add(1)));
        self.waker.wake();
    }
}
