//! Lock lifecycle controller
//!
//! Drives `approve`, `lockTokens` and `withdraw` through
//! `Idle → Submitted → Confirmed | Failed`. At most one call is in flight.
//! Submitting returns as soon as the wallet accepts the call; a spawned
//! continuation waits for finality, refreshes the registry view on success
//! and then settles the state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chain_client::{ContractGateway, Finality, WalletSession};
use locker_core::{Address, Amount, LockError, TokenTable, TxHash, UnixSeconds};
use locker_tx::ContractCall;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::form::{resolve_token, FormStatus, LockForm, LockIntent};
use crate::maturity::unix_now;
use crate::registry::LockRegistry;
use crate::state::{Lock, LockView, RegistrySnapshot};
use crate::tx_builder::{build_approve, build_lock, build_withdraw};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Lock,
    Withdraw,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Lock => "lock",
            Self::Withdraw => "withdraw",
        }
    }
}

/// A call accepted by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: u64,
    pub action: ActionKind,
    pub tx_hash: TxHash,
    pub token: Option<Address>,
    /// Integer amount as a string
    pub amount: Option<String>,
    pub lock_index: Option<usize>,
    pub submitted_at: UnixSeconds,
}

/// User-visible failure of the last action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub code: String,
    pub message: String,
}

impl From<&LockError> for ActionFailure {
    fn from(err: &LockError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    Idle,
    Submitted {
        submission: Submission,
    },
    Confirmed {
        submission: Submission,
    },
    Failed {
        action: ActionKind,
        tx_hash: Option<TxHash>,
        failure: ActionFailure,
    },
}

impl ActionState {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }

    fn submission_id(&self) -> Option<u64> {
        match self {
            Self::Submitted { submission } => Some(submission.id),
            _ => None,
        }
    }
}

/// What to do once a call is final
#[derive(Debug, Clone, Copy)]
enum FollowUp {
    /// Record the approved allowance, then re-read it
    Approved { token: Address, amount: Amount },
    /// Re-read locks and the allowance the lock consumed
    Locked { token: Address },
    /// Re-read locks
    Withdrawn,
}

struct InFlight {
    id: u64,
    task: JoinHandle<()>,
    /// Final on-chain; the continuation is refreshing and must not be aborted
    finalizing: bool,
}

struct Inner<G, W> {
    gateway: G,
    session: W,
    tokens: TokenTable,
    registry: LockRegistry,
    state: watch::Sender<ActionState>,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
    clock: fn() -> UnixSeconds,
}

/// Serializes state-changing calls for one wallet session.
///
/// Cloning yields another handle onto the same controller.
pub struct LockController<G, W> {
    inner: Arc<Inner<G, W>>,
}

impl<G, W> Clone for LockController<G, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, W> LockController<G, W>
where
    G: ContractGateway + 'static,
    W: WalletSession + 'static,
{
    pub fn new(gateway: G, session: W, escrow: Address, tokens: TokenTable) -> Self {
        Self::with_clock(gateway, session, escrow, tokens, unix_now)
    }

    /// Controller evaluating maturity against a custom clock
    pub fn with_clock(
        gateway: G,
        session: W,
        escrow: Address,
        tokens: TokenTable,
        clock: fn() -> UnixSeconds,
    ) -> Self {
        let (state, _) = watch::channel(ActionState::Idle);
        Self {
            inner: Arc::new(Inner {
                gateway,
                session,
                tokens,
                registry: LockRegistry::new(escrow),
                state,
                in_flight: Mutex::new(None),
                next_id: AtomicU64::new(1),
                clock,
            }),
        }
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.inner.tokens
    }

    pub fn escrow(&self) -> Address {
        self.inner.registry.escrow()
    }

    pub fn now(&self) -> UnixSeconds {
        (self.inner.clock)()
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> ActionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActionState> {
        self.inner.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.state.borrow().is_submitted()
    }

    /// Wait until no call is in flight and return the settled state
    pub async fn settled(&self) -> ActionState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|s| !s.is_submitted()).await;
        match settled {
            Ok(state) => state.clone(),
            // The sender lives in `inner`, which `self` keeps alive
            Err(_) => self.state(),
        }
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.inner.registry.snapshot().await
    }

    /// Cached locks evaluated for display at the current time
    pub async fn lock_views(&self) -> Vec<LockView> {
        let snapshot = self.snapshot().await;
        snapshot.views(&self.inner.tokens, self.now(), self.is_busy())
    }

    pub async fn form_status(&self, form: &LockForm) -> FormStatus {
        let snapshot = self.snapshot().await;
        form.status(&self.inner.tokens, &snapshot, self.is_busy())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Drop the cached view (wallet disconnected)
    pub async fn clear(&self) {
        self.inner.registry.clear().await;
    }

    /// Re-read the connected account's locks
    pub async fn refresh(&self) -> Result<Vec<Lock>, LockError> {
        let account = self.inner.session.account().await;
        Ok(self
            .inner
            .registry
            .refresh(&self.inner.gateway, account)
            .await?)
    }

    /// Re-read the allowance for a token symbol
    pub async fn refresh_allowance(&self, symbol: &str) -> Result<Option<Amount>, LockError> {
        let token = resolve_token(&self.inner.tokens, symbol)?;
        let account = self.inner.session.account().await;
        Ok(self
            .inner
            .registry
            .refresh_allowance(&self.inner.gateway, account, token)
            .await?)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Approve the escrow for exactly `amount` of `symbol`
    pub async fn approve(&self, symbol: &str, amount: Amount) -> Result<Submission, LockError> {
        let token = resolve_token(&self.inner.tokens, symbol)?;
        let mut in_flight = self.inner.in_flight.lock().await;
        self.ensure_idle()?;
        let account = self.account().await?;

        let call = build_approve(self.escrow(), token, amount)?;
        let follow_up = FollowUp::Approved { token, amount };
        let details = SubmissionDetails {
            action: ActionKind::Approve,
            token: Some(token),
            amount: Some(amount),
            lock_index: None,
        };
        self.submit(&mut in_flight, account, call, details, follow_up)
            .await
    }

    /// Validate a lock form and submit it
    pub async fn lock_form(&self, form: &LockForm) -> Result<Submission, LockError> {
        let intent = form.validate(&self.inner.tokens)?;
        self.lock(&intent).await
    }

    /// Create a lock of `intent.amount` for `intent.days` days
    pub async fn lock(&self, intent: &LockIntent) -> Result<Submission, LockError> {
        let mut in_flight = self.inner.in_flight.lock().await;
        self.ensure_idle()?;
        let account = self.account().await?;

        // Cheap check against the cache before touching the gateway
        let cached = self.snapshot().await.allowance(&intent.token);
        build_lock(self.escrow(), intent, cached)?;

        // Re-read so a stale cache never fires a lock that would revert
        let fresh = self
            .inner
            .registry
            .refresh_allowance(&self.inner.gateway, Some(account), intent.token)
            .await?;
        let call = build_lock(self.escrow(), intent, fresh)?;

        let details = SubmissionDetails {
            action: ActionKind::Lock,
            token: Some(intent.token),
            amount: Some(intent.amount),
            lock_index: None,
        };
        let follow_up = FollowUp::Locked {
            token: intent.token,
        };
        self.submit(&mut in_flight, account, call, details, follow_up)
            .await
    }

    /// Withdraw the matured lock at `index`
    pub async fn withdraw(&self, index: usize) -> Result<Submission, LockError> {
        let mut in_flight = self.inner.in_flight.lock().await;
        self.ensure_idle()?;
        let account = self.account().await?;

        let snapshot = self.snapshot().await;
        if snapshot.account != Some(account) {
            return Err(LockError::precondition("Locks have not been loaded"));
        }
        let lock = snapshot
            .lock(index)
            .ok_or_else(|| LockError::precondition(format!("No lock at index {}", index)))?;
        let call = build_withdraw(self.escrow(), index, lock, self.now())?;

        let details = SubmissionDetails {
            action: ActionKind::Withdraw,
            token: Some(lock.token),
            amount: Some(lock.amount),
            lock_index: Some(index),
        };
        self.submit(&mut in_flight, account, call, details, FollowUp::Withdrawn)
            .await
    }

    /// Give up on the call in flight. The state resolves to `Failed`.
    ///
    /// Refused once the call is known to be final, since the view is then
    /// already being refreshed.
    pub async fn abandon(&self) -> Result<ActionState, LockError> {
        let mut in_flight = self.inner.in_flight.lock().await;
        let current = self.state();
        let ActionState::Submitted { submission } = current else {
            return Err(LockError::precondition("No call in flight"));
        };

        if in_flight
            .as_ref()
            .is_some_and(|f| f.id == submission.id && f.finalizing)
        {
            return Err(LockError::precondition(
                "Call is already final, refreshing the view",
            ));
        }
        if let Some(flight) = in_flight.take() {
            if flight.id == submission.id {
                flight.task.abort();
            }
        }

        let err = LockError::SubmissionRejected {
            message: "abandoned by user".to_string(),
        };
        tracing::warn!(
            action = submission.action.as_str(),
            tx_hash = %submission.tx_hash,
            "Submission abandoned"
        );
        let failed = ActionState::Failed {
            action: submission.action,
            tx_hash: Some(submission.tx_hash),
            failure: ActionFailure::from(&err),
        };
        self.settle(submission.id, failed.clone());
        Ok(failed)
    }

    /// Return a settled controller to `Idle`
    pub async fn reset(&self) -> Result<(), LockError> {
        let _in_flight = self.inner.in_flight.lock().await;
        self.ensure_idle()?;
        self.inner.state.send_replace(ActionState::Idle);
        Ok(())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn ensure_idle(&self) -> Result<(), LockError> {
        if self.is_busy() {
            return Err(LockError::precondition("Another call is in flight"));
        }
        Ok(())
    }

    async fn account(&self) -> Result<Address, LockError> {
        self.inner
            .session
            .account()
            .await
            .ok_or(LockError::WalletDisconnected)
    }

    /// Submit `call`; on acceptance move to `Submitted` and spawn the
    /// finality continuation. Caller holds the in-flight lock.
    async fn submit(
        &self,
        in_flight: &mut Option<InFlight>,
        account: Address,
        call: ContractCall,
        details: SubmissionDetails,
        follow_up: FollowUp,
    ) -> Result<Submission, LockError> {
        tracing::info!(action = details.action.as_str(), call = %call, "Submitting");

        let tx_hash = match self.inner.gateway.submit(&account, &call).await {
            Ok(hash) => hash,
            Err(e) => {
                let err = LockError::SubmissionRejected {
                    message: e.to_string(),
                };
                tracing::warn!(action = details.action.as_str(), error = %err, "Submission rejected");
                self.inner.state.send_replace(ActionState::Failed {
                    action: details.action,
                    tx_hash: None,
                    failure: ActionFailure::from(&err),
                });
                return Err(err);
            }
        };

        let submission = Submission {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            action: details.action,
            tx_hash,
            token: details.token,
            amount: details.amount.map(|a| a.to_string()),
            lock_index: details.lock_index,
            submitted_at: self.now(),
        };
        tracing::info!(
            action = submission.action.as_str(),
            tx_hash = %tx_hash,
            "Submitted, awaiting finality"
        );
        self.inner.state.send_replace(ActionState::Submitted {
            submission: submission.clone(),
        });

        let controller = self.clone();
        let watched = submission.clone();
        let task = tokio::spawn(async move {
            controller.finalize(account, watched, follow_up).await;
        });
        *in_flight = Some(InFlight {
            id: submission.id,
            task,
            finalizing: false,
        });

        Ok(submission)
    }

    /// Continuation: wait for finality, refresh on success, settle
    async fn finalize(&self, account: Address, submission: Submission, follow_up: FollowUp) {
        let outcome = self.inner.gateway.await_finality(&submission.tx_hash).await;

        let next = match outcome {
            Ok(Finality::Success) => {
                if !self.mark_finalizing(submission.id).await {
                    return;
                }
                self.after_success(account, follow_up).await;
                tracing::info!(
                    action = submission.action.as_str(),
                    tx_hash = %submission.tx_hash,
                    "Confirmed"
                );
                ActionState::Confirmed {
                    submission: submission.clone(),
                }
            }
            Ok(Finality::Reverted) => self.failed(&submission, "reverted on-chain".to_string()),
            Err(e) => self.failed(&submission, e.to_string()),
        };

        self.settle(submission.id, next);
        let mut in_flight = self.inner.in_flight.lock().await;
        if in_flight.as_ref().is_some_and(|f| f.id == submission.id) {
            *in_flight = None;
        }
    }

    /// Flag the call as final so `abandon` leaves it alone. False when the
    /// call is no longer the one in flight.
    async fn mark_finalizing(&self, id: u64) -> bool {
        let mut in_flight = self.inner.in_flight.lock().await;
        match in_flight.as_mut() {
            Some(flight) if flight.id == id => {
                flight.finalizing = true;
                true
            }
            _ => false,
        }
    }

    async fn session_is(&self, account: Address) -> bool {
        self.inner.session.account().await == Some(account)
    }

    fn failed(&self, submission: &Submission, message: String) -> ActionState {
        let err = LockError::FinalityFailure {
            tx_hash: submission.tx_hash.to_string(),
            message,
        };
        tracing::warn!(action = submission.action.as_str(), error = %err, "Call failed");
        ActionState::Failed {
            action: submission.action,
            tx_hash: Some(submission.tx_hash),
            failure: ActionFailure::from(&err),
        }
    }

    /// Refresh the view for the submitting account, unless the session has
    /// moved on since the call was submitted
    async fn after_success(&self, account: Address, follow_up: FollowUp) {
        let registry = &self.inner.registry;
        let gateway = &self.inner.gateway;

        if !self.session_is(account).await {
            tracing::info!(account = %account, "Session changed before confirmation, view not refreshed");
            return;
        }

        match follow_up {
            FollowUp::Approved { token, amount } => {
                registry.record_allowance(account, token, amount).await;
                if let Err(e) = registry.refresh_allowance(gateway, Some(account), token).await {
                    tracing::warn!(token = %token, error = %e, "Allowance re-read failed, keeping approved amount");
                }
            }
            FollowUp::Locked { token } => {
                if let Err(e) = registry.refresh(gateway, Some(account)).await {
                    tracing::warn!(error = %e, "Lock refresh after confirmation failed");
                }
                if let Err(e) = registry.refresh_allowance(gateway, Some(account), token).await {
                    tracing::warn!(token = %token, error = %e, "Allowance refresh after lock failed");
                }
            }
            FollowUp::Withdrawn => {
                if let Err(e) = registry.refresh(gateway, Some(account)).await {
                    tracing::warn!(error = %e, "Lock refresh after withdrawal failed");
                }
            }
        }

        // The session may have changed while the reads were in flight
        if !self.session_is(account).await {
            registry.release(account).await;
        }
    }

    /// Replace the state only if `id` is still the call in flight
    fn settle(&self, id: u64, next: ActionState) {
        self.inner.state.send_if_modified(|state| {
            if state.submission_id() == Some(id) {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

struct SubmissionDetails {
    action: ActionKind,
    token: Option<Address>,
    amount: Option<Amount>,
    lock_index: Option<usize>,
}
