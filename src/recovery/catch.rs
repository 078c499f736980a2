//! `catch_unwind` boundary for handler futures.
//!
//! [`CatchUnwind`] polls the inner future inside `catch_unwind` and turns
//! an unwind into a [`Panic`]. The stack at the panic site is gone once
//! unwinding reaches us, so a process-wide hook records it first: while a
//! guarded poll is on the stack of the current thread, the hook stores
//! the location and a backtrace in a thread-local slot that the catching
//! poll then takes. Panics outside a guarded poll go to the previous hook.
//! Recovered panics reach it only after [`forward_recovered_panics`] is
//! enabled.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::task::{Context, Poll};

use super::{panic_message, Panic};

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();
static FORWARD_RECOVERED: AtomicBool = AtomicBool::new(false);

/// Also run the hook that was installed before ours for panics that are
/// recovered, e.g. a crash reporter's own panic integration. Off by
/// default, which keeps recovered panics out of stderr.
pub fn forward_recovered_panics(enabled: bool) {
    FORWARD_RECOVERED.store(enabled, Ordering::Relaxed);
}

/// Install the trace-recording panic hook. Idempotent.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let guarded = GUARD_DEPTH.try_with(Cell::get).unwrap_or(0) > 0;
            if !guarded {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            let trace = format!("panicked at {location}\n{}", Backtrace::force_capture());
            let _ = LAST_TRACE.try_with(|slot| *slot.borrow_mut() = Some(trace));
            if FORWARD_RECOVERED.load(Ordering::Relaxed) {
                previous(info);
            }
        }));
    });
}

fn take_trace() -> Option<String> {
    LAST_TRACE.try_with(|slot| slot.borrow_mut().take()).ok().flatten()
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|depth| {
            if depth.get() == 0 {
                // Drop anything left by a panic some inner code caught itself.
                LAST_TRACE.with(|slot| slot.borrow_mut().take());
            }
            depth.set(depth.get() + 1);
        });
        Self
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let _ = GUARD_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Future adapter resolving to `Err(Panic)` if the inner future panics.
#[must_use = "futures do nothing unless polled"]
pub struct CatchUnwind<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> CatchUnwind<F> {
    pub fn new(future: F) -> Self {
        Self {
            inner: Box::pin(future),
        }
    }
}

impl<F: Future> Future for CatchUnwind<F> {
    type Output = Result<F::Output, Panic>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = {
            let _depth = DepthGuard::enter();
            panic::catch_unwind(AssertUnwindSafe(|| this.inner.as_mut().poll(cx)))
        };

        match outcome {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let trace = take_trace()
                    .unwrap_or_else(|| Backtrace::force_capture().to_string());
                // A payload whose Drop panics must not escape the boundary.
                let _ = panic::catch_unwind(AssertUnwindSafe(move || drop(payload)));
                Poll::Ready(Err(Panic { message, trace }))
            }
        }
    }
}
