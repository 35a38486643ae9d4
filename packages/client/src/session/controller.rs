//! Room Session Controller.
//!
//! Owns everything shown for the open room: the message list, the typing
//! set, the draft and both realtime channels. Background work (history
//! fetch, feed and typing forwarders, expiry timers, sends) runs in tasks
//! that report back through one queue; [`RoomSessionController::next_update`]
//! applies those events one at a time and drops any that belong to an
//! earlier session generation.

use std::{collections::VecDeque, sync::Arc};

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::Instant,
};

use studyhall_server::domain::{
    DEFAULT_HISTORY_LIMIT, MessageText, MessageWithSender, Profile, RoomId, TypingAnnouncement,
    ValueObjectError,
};

use crate::{
    error::ChatError,
    port::{ChangeFeed, MessageStore, ReleaseHandle, TypingAnnouncer, TypingBroadcast},
};

use super::{
    event::{ChannelKind, Generation, SessionEvent},
    history::load_history,
    live::{spawn_feed_forwarder, spawn_typing_forwarder},
    state::MessageList,
    typing::{TYPING_TIMEOUT, TypingThrottle, TypingTracker},
};

/// Ports a session talks to
#[derive(Clone)]
pub struct SessionPorts {
    pub store: Arc<dyn MessageStore>,
    pub feed: Arc<dyn ChangeFeed>,
    pub typing: Arc<dyn TypingBroadcast>,
}

impl SessionPorts {
    /// Use one backend for every port
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: MessageStore + ChangeFeed + TypingBroadcast + 'static,
    {
        Self {
            store: backend.clone(),
            feed: backend.clone(),
            typing: backend,
        }
    }
}

/// Lifecycle of the room view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    /// Room selected, history not loaded yet
    Opening(RoomId),
    Open(RoomId),
}

/// What changed after applying a queued event.
///
/// One event can produce several updates; a live message from someone who
/// was typing yields `MessageAdded` followed by `TypingChanged`.
#[derive(Debug)]
pub enum SessionUpdate {
    HistoryLoaded { room_id: RoomId, count: usize },
    MessageAdded(MessageWithSender),
    TypingChanged(Option<String>),
    SendFailed { draft: String, error: ChatError },
    ChannelClosed(ChannelKind),
}

struct AttachedChannel {
    handle: ReleaseHandle,
    forwarder: JoinHandle<()>,
}

impl AttachedChannel {
    fn release(mut self) {
        self.forwarder.abort();
        if let Err(e) = self.handle.release() {
            tracing::warn!("Failed to release {}: {}", self.handle.label(), e);
        }
    }
}

pub struct RoomSessionController {
    ports: SessionPorts,
    me: Profile,
    history_limit: usize,
    phase: SessionPhase,
    generation: Generation,
    messages: MessageList,
    typing_state: TypingTracker,
    throttle: TypingThrottle,
    draft: String,
    history_task: Option<JoinHandle<()>>,
    feed_channel: Option<AttachedChannel>,
    typing_channel: Option<AttachedChannel>,
    announcer: Option<TypingAnnouncer>,
    pending: VecDeque<SessionUpdate>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl RoomSessionController {
    /// Create a controller acting as `me`
    pub fn new(ports: SessionPorts, me: Profile) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            ports,
            me,
            history_limit: DEFAULT_HISTORY_LIMIT,
            phase: SessionPhase::Closed,
            generation: 0,
            messages: MessageList::new(),
            typing_state: TypingTracker::new(),
            throttle: TypingThrottle::default(),
            draft: String::new(),
            history_task: None,
            feed_channel: None,
            typing_channel: None,
            announcer: None,
            pending: VecDeque::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn me(&self) -> &Profile {
        &self.me
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.phase {
            SessionPhase::Closed => None,
            SessionPhase::Opening(room_id) | SessionPhase::Open(room_id) => Some(room_id),
        }
    }

    pub fn messages(&self) -> &[MessageWithSender] {
        self.messages.as_slice()
    }

    pub fn typing_indicator(&self) -> Option<String> {
        self.typing_state.indicator()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn has_live_feed(&self) -> bool {
        self.feed_channel.is_some()
    }

    pub fn has_typing_channel(&self) -> bool {
        self.typing_channel.is_some()
    }

    /// Enter a room, leaving the current one first.
    ///
    /// Channel attachment failures leave the session in degraded mode
    /// (history only); they are logged, not returned.
    pub async fn open_room(&mut self, room_id: RoomId) {
        self.close();
        self.generation += 1;
        let generation = self.generation;
        self.phase = SessionPhase::Opening(room_id.clone());
        self.throttle.reset();
        tracing::info!("Opening room '{}' (session {})", room_id, generation);

        match self.ports.feed.subscribe(&room_id).await {
            Ok(subscription) => {
                let forwarder = spawn_feed_forwarder(
                    self.ports.store.clone(),
                    subscription.events,
                    generation,
                    self.events_tx.clone(),
                );
                self.feed_channel = Some(AttachedChannel {
                    handle: subscription.handle,
                    forwarder,
                });
            }
            Err(e) => {
                tracing::warn!("Live messages unavailable for room '{}': {}", room_id, e);
            }
        }

        match self.ports.typing.join(&room_id).await {
            Ok(channel) => {
                let forwarder =
                    spawn_typing_forwarder(channel.events, generation, self.events_tx.clone());
                self.announcer = Some(channel.announcer);
                self.typing_channel = Some(AttachedChannel {
                    handle: channel.handle,
                    forwarder,
                });
            }
            Err(e) => {
                tracing::warn!("Typing indicators unavailable for room '{}': {}", room_id, e);
            }
        }

        // started after the feed is attached so no insert falls in between
        let store = self.ports.store.clone();
        let events = self.events_tx.clone();
        let limit = self.history_limit;
        self.history_task = Some(tokio::spawn(async move {
            let messages = load_history(store.as_ref(), &room_id, limit).await;
            let _ = events.send(SessionEvent::HistoryLoaded {
                generation,
                messages,
            });
        }));
    }

    /// Leave the current room, releasing both channels.
    pub fn close(&mut self) {
        if let Some(task) = self.history_task.take() {
            task.abort();
        }
        self.announcer = None;
        for channel in [self.feed_channel.take(), self.typing_channel.take()]
            .into_iter()
            .flatten()
        {
            channel.release();
        }
        self.typing_state.clear();
        self.messages.clear();
        self.pending.clear();

        if let Some(room_id) = self.room_id() {
            tracing::info!("Left room '{}'", room_id);
            self.generation += 1;
        }
        self.phase = SessionPhase::Closed;
    }

    /// Record the current input. Non-blank input is announced on the
    /// typing channel at most once per suppression window.
    ///
    /// Returns whether an announcement was sent.
    pub fn input_changed(&mut self, text: &str) -> bool {
        self.draft = text.to_string();
        if text.trim().is_empty() || self.announcer.is_none() {
            return false;
        }
        let Some(room_id) = self.room_id().cloned() else {
            return false;
        };
        if !self.throttle.should_announce(Instant::now()) {
            return false;
        }
        let Some(announcer) = self.announcer.as_ref() else {
            return false;
        };
        let announcement =
            TypingAnnouncement::new(self.me.id.clone(), self.me.name.clone(), room_id);
        match announcer.announce(announcement) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Typing announcement dropped: {}", e);
                false
            }
        }
    }

    /// Replace the draft without announcing typing
    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Send the draft to the open room.
    ///
    /// Blank drafts are ignored. The draft is cleared right away and
    /// restored if the write fails. Returns whether a send was started.
    pub fn submit(&mut self) -> bool {
        let Some(room_id) = self.room_id().cloned() else {
            return false;
        };
        let text = match MessageText::new(&self.draft) {
            Ok(text) => text,
            Err(ValueObjectError::MessageTextEmpty) => return false,
            Err(e) => {
                tracing::warn!("Message rejected: {}", e);
                return false;
            }
        };
        let draft = std::mem::take(&mut self.draft);

        let store = self.ports.store.clone();
        let events = self.events_tx.clone();
        let sender = self.me.id.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = store.insert_message(&room_id, &sender, &text).await;
            let _ = events.send(SessionEvent::SendCompleted {
                generation,
                draft,
                result,
            });
        });
        true
    }

    /// Wait for the next event that changes the session and apply it.
    pub async fn next_update(&mut self) -> SessionUpdate {
        if let Some(update) = self.pending.pop_front() {
            return update;
        }
        loop {
            match self.events_rx.recv().await {
                Some(event) => {
                    if let Some(update) = self.apply(event) {
                        return update;
                    }
                }
                // the controller holds a sender, so the queue never closes
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Option<SessionUpdate> {
        if event.generation() != self.generation {
            if let SessionEvent::SendCompleted {
                result: Err(e), ..
            } = &event
            {
                tracing::warn!("Send to a previous room failed: {}", e);
            }
            tracing::trace!("Dropping event from session {}", event.generation());
            return None;
        }

        match event {
            SessionEvent::HistoryLoaded { messages, .. } => {
                let SessionPhase::Opening(room_id) = &self.phase else {
                    return None;
                };
                let room_id = room_id.clone();
                self.messages.merge(messages);
                self.phase = SessionPhase::Open(room_id.clone());
                Some(SessionUpdate::HistoryLoaded {
                    room_id,
                    count: self.messages.len(),
                })
            }
            SessionEvent::LiveMessage { message, .. } => {
                if self.room_id() != Some(&message.message.room_id) {
                    return None;
                }
                let typing_cleared = self
                    .typing_state
                    .remove(&message.message.user_id)
                    .then(|| SessionUpdate::TypingChanged(self.typing_indicator()));
                if self.messages.insert(message.clone()) {
                    self.pending.extend(typing_cleared);
                    Some(SessionUpdate::MessageAdded(message))
                } else {
                    typing_cleared
                }
            }
            SessionEvent::TypingReceived { announcement, .. } => {
                if announcement.user_id == self.me.id
                    || self.room_id() != Some(&announcement.room_id)
                {
                    return None;
                }
                let events = self.events_tx.clone();
                let generation = self.generation;
                let user_id = announcement.user_id.clone();
                self.typing_state
                    .refresh(announcement.user_id, announcement.name, |epoch| {
                        tokio::spawn(async move {
                            tokio::time::sleep(TYPING_TIMEOUT).await;
                            let _ = events.send(SessionEvent::TypingExpired {
                                generation,
                                user_id,
                                epoch,
                            });
                        })
                    });
                Some(SessionUpdate::TypingChanged(self.typing_indicator()))
            }
            SessionEvent::TypingExpired { user_id, epoch, .. } => self
                .typing_state
                .expire(&user_id, epoch)
                .then(|| SessionUpdate::TypingChanged(self.typing_indicator())),
            SessionEvent::SendCompleted { draft, result, .. } => match result {
                Ok(message) => self
                    .messages
                    .insert(message.clone())
                    .then_some(SessionUpdate::MessageAdded(message)),
                Err(error) => {
                    tracing::warn!("Failed to send message: {}", error);
                    if self.draft.is_empty() {
                        self.draft = draft.clone();
                    }
                    Some(SessionUpdate::SendFailed { draft, error })
                }
            },
            SessionEvent::ChannelClosed { channel, .. } => {
                tracing::warn!("The {} closed; continuing without it", channel);
                match channel {
                    ChannelKind::Feed => self.feed_channel = None,
                    ChannelKind::Typing => {
                        self.typing_channel = None;
                        self.announcer = None;
                    }
                }
                Some(SessionUpdate::ChannelClosed(channel))
            }
        }
    }
}

impl Drop for RoomSessionController {
    fn drop(&mut self) {
        self.close();
    }
}
