//! Typing presence: sender-side coalescing and the receiver-side typing set.

use std::time::Duration;

use tokio::{task::JoinHandle, time::Instant};

use studyhall_server::domain::{DisplayName, UserId};

/// How long a typing entry lives after its latest announcement, and the
/// length of the sender's suppression window.
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(3);

/// Sender side: at most one announcement per window
#[derive(Debug)]
pub struct TypingThrottle {
    window: Duration,
    last_sent: Option<Instant>,
}

impl Default for TypingThrottle {
    fn default() -> Self {
        Self::new(TYPING_TIMEOUT)
    }
}

impl TypingThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    /// Whether a keystroke at `now` should be broadcast. A `true` answer
    /// opens a new suppression window.
    pub fn should_announce(&mut self, now: Instant) -> bool {
        match self.last_sent {
            Some(sent) if now.saturating_duration_since(sent) < self.window => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

#[derive(Debug)]
struct TypingEntry {
    user_id: UserId,
    name: DisplayName,
    epoch: u64,
    timer: JoinHandle<()>,
}

/// Receiver side: who is typing, each entry with its own expiry timer.
///
/// Entries keep the order in which senders started typing.
#[derive(Debug, Default)]
pub struct TypingTracker {
    entries: Vec<TypingEntry>,
    next_epoch: u64,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or refresh a sender's entry.
    ///
    /// `start_timer` receives the entry's new epoch and returns the spawned
    /// expiry timer; a previous timer for the same sender is aborted.
    pub fn refresh<F>(&mut self, user_id: UserId, name: DisplayName, start_timer: F)
    where
        F: FnOnce(u64) -> JoinHandle<()>,
    {
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let timer = start_timer(epoch);
        match self.entries.iter_mut().find(|e| e.user_id == user_id) {
            Some(entry) => {
                entry.timer.abort();
                entry.name = name;
                entry.epoch = epoch;
                entry.timer = timer;
            }
            None => self.entries.push(TypingEntry {
                user_id,
                name,
                epoch,
                timer,
            }),
        }
    }

    /// Drop an entry whose timer fired. Ignores timers that were superseded.
    pub fn expire(&mut self, user_id: &UserId, epoch: u64) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(&e.user_id == user_id && e.epoch == epoch));
        self.entries.len() != before
    }

    /// Drop a sender's entry right away, cancelling its timer.
    pub fn remove(&mut self, user_id: &UserId) -> bool {
        match self.entries.iter().position(|e| &e.user_id == user_id) {
            Some(index) => {
                self.entries.remove(index).timer.abort();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.timer.abort();
        }
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.entries.iter().any(|e| &e.user_id == user_id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indicator line for the current typists, if any
    pub fn indicator(&self) -> Option<String> {
        typing_indicator(&self.names())
    }
}

impl Drop for TypingTracker {
    fn drop(&mut self) {
        self.clear();
    }
}

/// `"Alice is typing..."` / `"Alice, Bob are typing..."`
pub fn typing_indicator(names: &[&str]) -> Option<String> {
    match names {
        [] => None,
        [one] => Some(format!("{one} is typing...")),
        many => Some(format!("{} are typing...", many.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn name(name: &str) -> DisplayName {
        DisplayName::new(name).unwrap()
    }

    fn idle_timer() -> JoinHandle<()> {
        tokio::spawn(std::future::pending::<()>())
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_coalesces_keystrokes() {
        // テスト項目: 1 秒間に 10 回入力しても通知は 1 回だけ
        // given (前提条件):
        let mut throttle = TypingThrottle::default();
        let start = Instant::now();

        // when (操作):
        let sent = (0..10)
            .filter(|i| throttle.should_announce(start + Duration::from_millis(100 * i)))
            .count();

        // then (期待する結果):
        assert_eq!(sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_allows_spaced_keystrokes() {
        // テスト項目: 4 秒間隔の入力はそれぞれ通知される
        // given (前提条件):
        let mut throttle = TypingThrottle::default();
        let start = Instant::now();

        // when (操作):
        let sent = (0..3)
            .filter(|i| throttle.should_announce(start + Duration::from_secs(4 * i)))
            .count();

        // then (期待する結果):
        assert_eq!(sent, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_window_boundary() {
        // テスト項目: 抑制ウィンドウの終了後の最初の入力で再び通知される
        let mut throttle = TypingThrottle::default();
        let start = Instant::now();
        assert!(throttle.should_announce(start));
        assert!(!throttle.should_announce(start + Duration::from_millis(2_999)));
        assert!(throttle.should_announce(start + TYPING_TIMEOUT));
        throttle.reset();
        assert!(throttle.should_announce(start + TYPING_TIMEOUT));
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_timer() {
        // テスト項目: 同じ送信者の更新はタイマーを積み重ねず、古いタイマーの期限切れは無視される
        // given (前提条件):
        let mut tracker = TypingTracker::new();
        let mut epochs = Vec::new();
        tracker.refresh(user("bob"), name("Bob"), |epoch| {
            epochs.push(epoch);
            idle_timer()
        });
        tracker.refresh(user("bob"), name("Bob"), |epoch| {
            epochs.push(epoch);
            idle_timer()
        });

        // when (操作):
        let stale = tracker.expire(&user("bob"), epochs[0]);

        // then (期待する結果):
        assert!(!stale);
        assert_eq!(tracker.names(), vec!["Bob"]);
        assert!(tracker.expire(&user("bob"), epochs[1]));
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_typists_are_independent() {
        // テスト項目: 複数の入力中ユーザーは独立して管理される
        // given (前提条件):
        let mut tracker = TypingTracker::new();
        tracker.refresh(user("bob"), name("Bob"), |_| idle_timer());
        tracker.refresh(user("carol"), name("Carol"), |_| idle_timer());

        // when (操作):
        let removed = tracker.remove(&user("bob"));

        // then (期待する結果):
        assert!(removed);
        assert!(!tracker.contains(&user("bob")));
        assert_eq!(tracker.indicator().as_deref(), Some("Carol is typing..."));
    }

    #[test]
    fn test_typing_indicator_text() {
        // テスト項目: 入力中表示の文言が人数で変わる
        assert_eq!(typing_indicator(&[]), None);
        assert_eq!(
            typing_indicator(&["Alice"]).as_deref(),
            Some("Alice is typing...")
        );
        assert_eq!(
            typing_indicator(&["Alice", "Bob"]).as_deref(),
            Some("Alice, Bob are typing...")
        );
    }
}
