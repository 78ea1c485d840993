use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// The Telegram user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    /// Label shown to support staff.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    Start,
    AwaitingConsent,
    SelectPlan,
    SelectMethod,
    EnterCardNumber,
    GiftRecipient,
    GiftPlan,
    GiftMethod,
    GiftCardNumber,
    TopUpMethod,
    TopUpAmount,
    TopUpTransactionId,
    SupportFaq,
    SupportChat,
    Materials,
    CardName,
    CardAge,
    CardGoals,
    CardChallenges,
    Feedback,
    Chatbots,
    /// The conversation is over and its context is discarded.
    Ended,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCardDraft {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub goals: Option<String>,
}

/// Per-chat conversation state. Lives only as long as the conversation.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub telegram_id: String,
    pub username: Option<String>,
    pub state: DialogueState,
    pub plan_id: Option<i32>,
    pub method_id: Option<i32>,
    pub recipient: Option<String>,
    pub amount: Option<Decimal>,
    pub support_session_id: Option<i32>,
    pub card: ClientCardDraft,
}

impl ConversationContext {
    pub fn new(sender: &Sender) -> Self {
        Self {
            telegram_id: sender.telegram_id.to_string(),
            username: sender.username.clone(),
            state: DialogueState::Start,
            plan_id: None,
            method_id: None,
            recipient: None,
            amount: None,
            support_session_id: None,
            card: ClientCardDraft::default(),
        }
    }

    /// Forgets every in-progress selection; identity is kept.
    pub fn reset_selections(&mut self) {
        self.plan_id = None;
        self.method_id = None;
        self.recipient = None;
        self.amount = None;
        self.support_session_id = None;
        self.card = ClientCardDraft::default();
    }
}

/// Contexts keyed by chat id. A context is taken out while its update is
/// being handled and put back afterwards unless the conversation ended.
/// Updates for one chat run one at a time under [`ConversationStore::lock_chat`].
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<HashMap<i64, ConversationContext>>,
    chat_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other update for `chat_id` is in flight.
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = self.chat_locks.lock().await.entry(chat_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Releases the chat and forgets its lock once nobody is waiting on it.
    pub async fn unlock_chat(&self, chat_id: i64, guard: OwnedMutexGuard<()>) {
        let mut locks = self.chat_locks.lock().await;
        drop(guard);
        if let Some(lock) = locks.get(&chat_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(&chat_id);
        }
    }

    pub async fn take(&self, chat_id: i64) -> Option<ConversationContext> {
        self.inner.lock().await.remove(&chat_id)
    }

    pub async fn put(&self, chat_id: i64, context: ConversationContext) {
        self.inner.lock().await.insert(chat_id, context);
    }

    pub async fn remove(&self, chat_id: i64) {
        self.inner.lock().await.remove(&chat_id);
    }

    pub async fn state(&self, chat_id: i64) -> Option<DialogueState> {
        self.inner.lock().await.get(&chat_id).map(|c| c.state)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(id: i64) -> Sender {
        Sender {
            telegram_id: id,
            username: Some(format!("user{id}")),
            first_name: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_take_put_remove() {
        let store = ConversationStore::new();
        assert!(store.take(1).await.is_none());

        let mut ctx = ConversationContext::new(&sender(1));
        ctx.state = DialogueState::TopUpAmount;
        store.put(1, ctx).await;
        store.put(2, ConversationContext::new(&sender(2))).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.state(1).await, Some(DialogueState::TopUpAmount));

        let taken = store.take(1).await.unwrap();
        assert_eq!(taken.telegram_id, "1");
        assert!(store.state(1).await.is_none());

        store.remove(2).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_lock_chat_serializes_one_chat() {
        let store = Arc::new(ConversationStore::new());
        let guard = store.lock_chat(1).await;

        // other chats are not blocked
        let other = store.lock_chat(2).await;
        store.unlock_chat(2, other).await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                let guard = store.lock_chat(1).await;
                store.put(1, ConversationContext::new(&sender(1))).await;
                store.unlock_chat(1, guard).await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        assert!(store.is_empty().await);

        store.unlock_chat(1, guard).await;
        waiter.await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.chat_locks.lock().await.is_empty());
    }

    #[test]
    fn test_reset_selections_keeps_identity() {
        let mut ctx = ConversationContext::new(&sender(7));
        ctx.plan_id = Some(3);
        ctx.recipient = Some("@bob".to_string());
        ctx.card.name = Some("Alice".to_string());
        ctx.reset_selections();

        assert_eq!(ctx.telegram_id, "7");
        assert_eq!(ctx.username.as_deref(), Some("user7"));
        assert!(ctx.plan_id.is_none());
        assert!(ctx.recipient.is_none());
        assert_eq!(ctx.card, ClientCardDraft::default());
    }

    #[test]
    fn test_display_name_falls_back_to_first_name() {
        let mut s = sender(1);
        assert_eq!(s.display_name(), "user1");
        s.username = None;
        assert_eq!(s.display_name(), "Test");
    }
}
