//! The host container the engine renders into.
//!
//! `Mount` models the one designated element of the host page: a title, at
//! most one rendered list of cards, an optional reload affordance and an
//! optional notice. Structural changes inside the container are published
//! as [`Mutation`]s to explicit subscribers. The notice sits next to the
//! container rather than inside it, so notices are never published.
//!
//! Anything may mutate a mount, not only the controller. `clear_list` and
//! `remove_list` exist for agents that wipe the list behind its back.

pub mod card;

pub use card::{Card, Notice, NoticeKind};

use tokio::sync::mpsc;
use tracing::debug;

/// Identity of one rendered list node. A full re-render always yields a
/// new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListHandle(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedList {
    handle: ListHandle,
    cards: Vec<Card>,
}

impl RenderedList {
    pub fn handle(&self) -> ListHandle {
        self.handle
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Structural change inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ListInserted(ListHandle),
    ListRemoved(ListHandle),
    CardsInserted { list: ListHandle, count: usize },
    CardsRemoved { list: ListHandle, count: usize },
    ReloadInserted,
    ReloadRemoved,
}

pub type SubscriptionId = u64;

/// Receiving end of a mount subscription.
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<Mutation>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Everything published since the last drain.
    pub fn drain(&mut self) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        while let Ok(m) = self.rx.try_recv() {
            mutations.push(m);
        }
        mutations
    }
}

#[derive(Default)]
pub struct Mount {
    title: Option<String>,
    list: Option<RenderedList>,
    reload_visible: bool,
    notice: Option<Notice>,
    next_handle: u64,
    next_subscription: SubscriptionId,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<Mutation>)>,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Container =====

    /// Tear down everything the engine put in the container and detach
    /// every subscriber. Nothing is published.
    pub fn reset(&mut self) {
        self.subscribers.clear();
        self.title = None;
        self.list = None;
        self.reload_visible = false;
        self.notice = None;
    }

    pub fn build(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    // ===== Subscriptions =====

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.subscribers.push((id, tx));
        debug!(subscription = id, "Mount subscriber attached");
        Subscription { id, rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self, mutation: Mutation) {
        // Dropped receivers are pruned as we go
        self.subscribers.retain(|(_, tx)| tx.send(mutation).is_ok());
    }

    // ===== Rendered list =====

    pub fn list(&self) -> Option<&RenderedList> {
        self.list.as_ref()
    }

    pub fn cards(&self) -> &[Card] {
        self.list.as_ref().map(|l| l.cards.as_slice()).unwrap_or(&[])
    }

    pub fn card_count(&self) -> usize {
        self.cards().len()
    }

    /// Ids of the rendered cards, in display order.
    pub fn visible_ids(&self) -> Vec<i64> {
        self.cards().iter().map(|c| c.id).collect()
    }

    /// Discard the current list node and insert a fresh one.
    pub fn replace_list(&mut self, cards: Vec<Card>) -> ListHandle {
        if let Some(old) = self.list.take() {
            self.publish(Mutation::ListRemoved(old.handle));
        }
        let handle = self.new_handle();
        self.list = Some(RenderedList { handle, cards });
        self.publish(Mutation::ListInserted(handle));
        handle
    }

    /// The current list node, inserting an empty one if there is none.
    pub fn ensure_list(&mut self) -> ListHandle {
        if let Some(list) = &self.list {
            return list.handle;
        }
        self.replace_list(Vec::new())
    }

    /// Drop cards that fail `keep`. Returns how many were removed.
    pub fn retain_cards(&mut self, mut keep: impl FnMut(&Card) -> bool) -> usize {
        let Some(list) = self.list.as_mut() else {
            return 0;
        };
        let before = list.cards.len();
        list.cards.retain(|c| keep(c));
        let count = before - list.cards.len();
        let handle = list.handle;
        if count > 0 {
            self.publish(Mutation::CardsRemoved { list: handle, count });
        }
        count
    }

    /// Overwrite the content of existing cards by position. Not structural,
    /// so nothing is published.
    pub fn update_cards(&mut self, cards: &[Card]) {
        if let Some(list) = self.list.as_mut() {
            for (slot, card) in list.cards.iter_mut().zip(cards) {
                *slot = card.clone();
            }
        }
    }

    pub fn append_cards(&mut self, cards: Vec<Card>) {
        let list_handle = self.ensure_list();
        let count = cards.len();
        if let Some(list) = self.list.as_mut() {
            list.cards.extend(cards);
        }
        if count > 0 {
            self.publish(Mutation::CardsInserted {
                list: list_handle,
                count,
            });
        }
    }

    /// Empty the list node but keep it mounted.
    pub fn clear_list(&mut self) {
        self.retain_cards(|_| false);
    }

    /// Remove the list node entirely.
    pub fn remove_list(&mut self) {
        if let Some(old) = self.list.take() {
            self.publish(Mutation::ListRemoved(old.handle));
        }
    }

    fn new_handle(&mut self) -> ListHandle {
        self.next_handle += 1;
        ListHandle(self.next_handle)
    }

    // ===== Reload affordance =====

    pub fn reload_visible(&self) -> bool {
        self.reload_visible
    }

    /// Show the reload affordance. Returns false if it was already visible.
    pub fn show_reload(&mut self) -> bool {
        if self.reload_visible {
            return false;
        }
        self.reload_visible = true;
        self.publish(Mutation::ReloadInserted);
        true
    }

    pub fn remove_reload(&mut self) {
        if self.reload_visible {
            self.reload_visible = false;
            self.publish(Mutation::ReloadRemoved);
        }
    }

    // ===== Notice =====

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Replace any current notice.
    pub fn show_notice(&mut self, kind: NoticeKind) {
        self.notice = Some(Notice::new(kind));
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
