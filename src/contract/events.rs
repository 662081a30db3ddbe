//! Scoped mint-event subscription.
//!
//! Events are delivered over a bounded channel fed by a background log-poll
//! task. The subscription owns that task: dropping the `MintEvents` handle
//! aborts polling, so replacing a contract handle can never leak a listener
//! that keeps firing for a stale account.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::eth::Filter;
use alloy::sol_types::SolEvent;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::contract::gateway::NewEpicNFTMinted;
use crate::contract::types::{ContractError, ContractResult, MintEvent};

/// Capacity of the event delivery channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// A live mint-event subscription.
///
/// Also usable as a [`futures_util::Stream`] of [`MintEvent`]s.
pub struct MintEvents {
    rx: mpsc::Receiver<MintEvent>,
    task: Option<JoinHandle<()>>,
}

impl MintEvents {
    /// Subscription backed by a background poll task; the task is aborted
    /// when the subscription is dropped.
    pub(crate) fn with_task(rx: mpsc::Receiver<MintEvent>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Subscription fed directly by the caller, with no background task.
    ///
    /// Intended for in-memory wallet providers and tests.
    pub fn from_receiver(rx: mpsc::Receiver<MintEvent>) -> Self {
        Self { rx, task: None }
    }

    /// Receive the next event. Returns `None` once the feeding side is gone.
    pub async fn recv(&mut self) -> Option<MintEvent> {
        self.rx.recv().await
    }
}

impl Stream for MintEvents {
    type Item = MintEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for MintEvents {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for MintEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintEvents")
            .field("polled", &self.task.is_some())
            .finish()
    }
}

/// Start the log-poll task feeding a new subscription.
pub(crate) fn spawn_poll_task(
    provider: DynProvider,
    address: Address,
    poll_interval: Duration,
    confirmation_blocks: u64,
) -> MintEvents {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        poll_mint_events(provider, address, poll_interval, confirmation_blocks, tx).await;
    });
    MintEvents::with_task(rx, task)
}

async fn poll_mint_events(
    provider: DynProvider,
    address: Address,
    poll_interval: Duration,
    confirmation_blocks: u64,
    tx: mpsc::Sender<MintEvent>,
) {
    tracing::debug!(contract = %address, "mint event subscription started");

    // Only events after subscription time are delivered; the window start is
    // established on the first successful block query.
    let mut last_block: Option<u64> = None;

    loop {
        if tx.is_closed() {
            break;
        }

        if let Err(e) =
            poll_once(&provider, address, confirmation_blocks, &mut last_block, &tx).await
        {
            tracing::warn!(error = %e, "mint event poll failed");
            crate::observability::metrics::record_rpc_error("get_logs");
        }

        tokio::time::sleep(poll_interval).await;
    }

    tracing::debug!(contract = %address, "mint event subscription stopped");
}

async fn poll_once(
    provider: &DynProvider,
    address: Address,
    confirmation_blocks: u64,
    last_block: &mut Option<u64>,
    tx: &mpsc::Sender<MintEvent>,
) -> ContractResult<()> {
    let current = provider
        .get_block_number()
        .await
        .map_err(|e| ContractError::Rpc(e.to_string()))?;
    let target = current.saturating_sub(confirmation_blocks);

    let Some(last) = *last_block else {
        *last_block = Some(target);
        return Ok(());
    };
    if target <= last {
        return Ok(());
    }

    let filter = Filter::new()
        .address(address)
        .from_block(last + 1)
        .to_block(target)
        .event(NewEpicNFTMinted::SIGNATURE);

    let logs = provider
        .get_logs(&filter)
        .await
        .map_err(|e| ContractError::Rpc(e.to_string()))?;

    for log in logs {
        let Ok(decoded) = log.log_decode::<NewEpicNFTMinted>() else {
            continue;
        };
        let event = decoded.inner;
        let Ok(token_id) = u64::try_from(event.tokenId) else {
            tracing::warn!(token_id = %event.tokenId, "token id out of range, skipping event");
            continue;
        };

        let mint = MintEvent {
            minter: event.sender,
            token_id,
        };
        if tx.send(mint).await.is_err() {
            // subscriber gone, shut down on the next loop turn
            return Ok(());
        }
    }

    *last_block = Some(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_receiver_delivers_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut events = MintEvents::from_receiver(rx);

        for id in [1u64, 2, 3] {
            tx.send(MintEvent {
                minter: Address::ZERO,
                token_id: id,
            })
            .await
            .unwrap();
        }

        assert_eq!(events.recv().await.unwrap().token_id, 1);
        assert_eq!(events.recv().await.unwrap().token_id, 2);
        assert_eq!(events.recv().await.unwrap().token_id, 3);
    }

    #[tokio::test]
    async fn recv_ends_when_sender_dropped() {
        let (tx, rx) = mpsc::channel::<MintEvent>(1);
        let mut events = MintEvents::from_receiver(rx);
        drop(tx);
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_subscription_aborts_the_task() {
        let (_tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async {
            std::future::pending::<()>().await;
        });
        let events = MintEvents::with_task(rx, task);

        let handle = events.task.as_ref().unwrap().abort_handle();
        drop(events);
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }
}
