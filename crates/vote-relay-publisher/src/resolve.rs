//! Single-resolution outcome slot.
//!
//! A connection produces many lifecycle events (open, write, error, close,
//! timeout) but only the first terminal one decides the publish outcome.
//! [`Resolver::resolve`] hands the value to the waiting [`Outcome`] exactly
//! once; every later call is a no-op that returns `false`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Create a connected resolver/outcome pair.
#[must_use]
pub fn channel<T>() -> (Resolver<T>, Outcome<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Resolver {
            slot: Mutex::new(Some(tx)),
        },
        Outcome { rx },
    )
}

/// Write side: resolves at most once.
#[derive(Debug)]
pub struct Resolver<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Resolver<T> {
    /// Resolve the outcome with `value`.
    ///
    /// Returns `true` if this call decided the outcome, `false` if it was
    /// already decided.
    pub fn resolve(&self, value: T) -> bool {
        let Some(tx) = self.slot.lock().take() else {
            return false;
        };
        // A dropped receiver still counts as resolved.
        let _ = tx.send(value);
        true
    }

    /// Returns `true` once the outcome has been decided.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Read side: completes with the first resolved value.
#[derive(Debug)]
pub struct Outcome<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Outcome<T> {
    /// `None` if the resolver was dropped without resolving.
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_resolution_wins() {
        let (resolver, outcome) = channel::<&str>();

        assert!(!resolver.is_resolved());
        assert!(resolver.resolve("written"));
        assert!(resolver.is_resolved());
        assert!(!resolver.resolve("closed 1011"));

        assert_eq!(outcome.await, Some("written"));
    }

    #[tokio::test]
    async fn dropped_resolver_yields_none() {
        let (resolver, outcome) = channel::<u8>();
        drop(resolver);
        assert_eq!(outcome.await, None);
    }

    #[test]
    fn resolve_after_receiver_dropped() {
        let (resolver, outcome) = channel::<u8>();
        drop(outcome);
        assert!(resolver.resolve(1));
        assert!(!resolver.resolve(2));
    }

    #[tokio::test]
    async fn concurrent_resolvers_produce_one_outcome() {
        let (resolver, outcome) = channel::<usize>();
        let resolver = std::sync::Arc::new(resolver);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let resolver = std::sync::Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve(i) })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }

        assert_eq!(wins, 1);
        assert!(outcome.await.is_some());
    }
}
