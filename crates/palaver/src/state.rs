//! The conversation state store.
//!
//! [`ConversationState`] is the authoritative view of a conversation:
//! identity, ordered history, the pending submission, and the busy flag.
//! All writes go through a fixed set of transitions: [`submit`] from the
//! caller side, and the crate-private turn transitions the orchestrator
//! applies. Observers can read between transitions but never see a partially
//! applied one.
//!
//! [`submit`]: StateCell::submit

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use palaver_common::{ChatMessage, Context, ConversationId, PendingMessage};

use crate::error::SubmitError;

/// What to do with a submission that arrives while a turn is in flight.
///
/// The default is [`Reject`](Self::Reject): the submission fails with
/// [`SubmitError::Busy`] and no state changes. [`Replace`](Self::Replace)
/// overwrites a pending message the orchestrator has not yet consumed; the
/// earlier text is silently lost, which is exactly the hazard the policy makes
/// explicit. A turn already in flight (pending consumed) rejects under either
/// policy, so at most one turn runs at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitPolicy {
    /// Reject submissions while busy.
    #[default]
    Reject,
    /// Overwrite a not-yet-consumed pending message; reject if the turn has
    /// already started.
    Replace,
}

/// Authoritative conversation state.
///
/// Fields are private; reads go through the accessors and writes through the
/// transition methods on [`StateCell`].
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    conversation_id: Option<ConversationId>,
    history: Vec<ChatMessage>,
    pending: Option<PendingMessage>,
    busy: bool,
}

impl ConversationState {
    /// The session identity, once the gateway has assigned one.
    #[must_use]
    pub const fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// The ordered, append-only message history.
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Whether a turn is currently in flight.
    #[must_use]
    pub const fn busy(&self) -> bool {
        self.busy
    }

    /// Whether a submission is waiting to be consumed by the orchestrator.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Shared handle to a [`ConversationState`].
///
/// Locks are held only for the duration of one synchronous transition, never
/// across an await point, so every mutation is atomic with respect to
/// observers.
#[derive(Clone, Default)]
pub struct StateCell {
    inner: Arc<RwLock<ConversationState>>,
}

impl StateCell {
    /// Creates a cell holding a fresh conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ConversationState> {
        // Writers cannot panic while holding the lock (no panics in this
        // crate), but recover from poisoning rather than propagate it.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConversationState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts a user submission.
    ///
    /// On acceptance the user message is appended to history, the pending
    /// message is set, and `busy` becomes true, all in one transition, so
    /// the effect is observable before any network activity begins.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Busy`] when a turn is in flight and the policy
    /// does not allow replacement.
    pub fn submit(
        &self,
        text: impl Into<String>,
        context: Context,
        policy: SubmitPolicy,
    ) -> Result<(), SubmitError> {
        let text = text.into();
        let mut state = self.write();

        if state.busy {
            match policy {
                SubmitPolicy::Replace if state.pending.is_some() => {
                    warn!("replacing an unconsumed pending message; earlier input is dropped");
                }
                _ => return Err(SubmitError::Busy),
            }
        }

        state.history.push(ChatMessage::user(text.clone()));
        state.pending = Some(PendingMessage::new(text, context));
        state.busy = true;
        Ok(())
    }

    /// Consumes the pending message at the start of a turn.
    pub(crate) fn take_pending(&self) -> Option<PendingMessage> {
        self.write().pending.take()
    }

    /// Records the gateway-assigned identity after the first response.
    ///
    /// Once set the identity is immutable; a later mismatching id from the
    /// gateway is ignored.
    pub(crate) fn adopt_conversation_id(&self, id: &ConversationId) {
        let mut state = self.write();
        match &state.conversation_id {
            None => state.conversation_id = Some(id.clone()),
            Some(existing) if existing != id => {
                debug!("gateway reported conversation id {id} but session is {existing}; keeping the original");
            }
            Some(_) => {}
        }
    }

    /// Commits a successful turn: appends the buffered assistant messages in
    /// arrival order and clears `busy`.
    pub(crate) fn complete_turn(&self, assistant_contents: Vec<String>) {
        let mut state = self.write();
        state
            .history
            .extend(assistant_contents.into_iter().map(ChatMessage::assistant));
        state.busy = false;
    }

    /// Aborts a failed turn: clears `busy` without touching history, leaving
    /// the user's message recorded and nothing else.
    pub(crate) fn abort_turn(&self) {
        self.write().busy = false;
    }

    /// A point-in-time copy of the full state.
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.read().clone()
    }

    /// A copy of the current history.
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.read().history.clone()
    }

    /// Whether a turn is currently in flight.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.read().busy
    }

    /// The session identity, once assigned.
    #[must_use]
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.read().conversation_id.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use palaver_common::Role;

    #[test]
    fn submit_is_immediately_observable() {
        let cell = StateCell::new();
        cell.submit("hello", Context::new(), SubmitPolicy::Reject)
            .unwrap();

        assert!(cell.busy());
        let state = cell.snapshot();
        assert!(state.has_pending());
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].role, Role::User);
        assert_eq!(state.history()[0].content, "hello");
    }

    #[test]
    fn submit_while_busy_is_rejected_by_default() {
        let cell = StateCell::new();
        cell.submit("first", Context::new(), SubmitPolicy::Reject)
            .unwrap();

        let err = cell
            .submit("second", Context::new(), SubmitPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Busy));
        // History keeps only the accepted submission.
        assert_eq!(cell.history().len(), 1);
    }

    #[test]
    fn replace_overwrites_unconsumed_pending() {
        let cell = StateCell::new();
        cell.submit("first", Context::new(), SubmitPolicy::Replace)
            .unwrap();
        cell.submit("second", Context::new(), SubmitPolicy::Replace)
            .unwrap();

        let pending = cell.take_pending().unwrap();
        assert_eq!(pending.text, "second");
        // Both user messages stay in history; history is append-only.
        assert_eq!(cell.history().len(), 2);
    }

    #[test]
    fn replace_rejects_once_turn_started() {
        let cell = StateCell::new();
        cell.submit("first", Context::new(), SubmitPolicy::Replace)
            .unwrap();
        cell.take_pending().unwrap();

        let err = cell
            .submit("second", Context::new(), SubmitPolicy::Replace)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Busy));
    }

    #[test]
    fn conversation_id_is_set_once() {
        let cell = StateCell::new();
        cell.adopt_conversation_id(&ConversationId::new("c1"));
        cell.adopt_conversation_id(&ConversationId::new("c2"));
        assert_eq!(cell.conversation_id().unwrap().as_str(), "c1");
    }

    #[test]
    fn complete_turn_appends_and_clears_busy() {
        let cell = StateCell::new();
        cell.submit("hello", Context::new(), SubmitPolicy::Reject)
            .unwrap();
        cell.take_pending().unwrap();

        cell.complete_turn(vec!["hi".to_string(), "anything else?".to_string()]);

        assert!(!cell.busy());
        let history = cell.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "hi");
        assert_eq!(history[2].content, "anything else?");
    }

    #[test]
    fn abort_turn_keeps_user_message() {
        let cell = StateCell::new();
        cell.submit("hello", Context::new(), SubmitPolicy::Reject)
            .unwrap();
        cell.take_pending().unwrap();

        cell.abort_turn();

        assert!(!cell.busy());
        assert_eq!(cell.history().len(), 1);
        assert_eq!(cell.history()[0].content, "hello");
    }
}
