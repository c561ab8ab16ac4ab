//! 类型化事件与事件总线
//!
//! 每种事件是一个带固定载荷的变体；订阅者按变体订阅，按订阅顺序同步调用。

use fics_protocol::{Challenge, GameResult, Offer, OfferId, Seek, SeekId};
use serde::{Deserialize, Serialize};

use crate::game::{AdjournedGame, Game};

/// 管理器发出的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "payload")]
pub enum Event {
    #[serde(rename = "addSeek")]
    AddSeek(Seek),
    #[serde(rename = "clearSeeks")]
    ClearSeeks,
    #[serde(rename = "removeSeek")]
    RemoveSeek(SeekId),
    /// 自己的 seek 已全部撤回
    #[serde(rename = "our_seeks_removed")]
    OurSeeksRemoved,
    /// seek 更新描述，如 `to automatic; rating range now 0-9999`
    #[serde(rename = "seek_updated")]
    SeekUpdated(String),
    #[serde(rename = "onChallengeAdd")]
    ChallengeAdd {
        id: OfferId,
        challenge: Challenge,
    },
    #[serde(rename = "onChallengeRemove")]
    ChallengeRemove(OfferId),
    #[serde(rename = "onOfferAdd")]
    OfferAdd(Offer),
    #[serde(rename = "onOurOfferAdd")]
    OurOfferAdd(Offer),
    #[serde(rename = "onOfferRemove")]
    OfferRemove(OfferId),
    #[serde(rename = "playGameCreated")]
    PlayGameCreated(Game),
    #[serde(rename = "boardUpdate")]
    BoardUpdate {
        game_number: u32,
        white_clock_ms: u64,
        black_clock_ms: u64,
        fen: String,
        last_move: Option<String>,
    },
    #[serde(rename = "gameEnded")]
    GameEnded {
        game_number: u32,
        result: GameResult,
        text: String,
    },
    #[serde(rename = "onAdjournmentsList")]
    AdjournmentsList(Vec<AdjournedGame>),
    #[serde(rename = "adjournedGamePreview")]
    AdjournedGamePreview(AdjournedGame),
}

/// 事件种类（订阅键）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "addSeek")]
    AddSeek,
    #[serde(rename = "clearSeeks")]
    ClearSeeks,
    #[serde(rename = "removeSeek")]
    RemoveSeek,
    #[serde(rename = "our_seeks_removed")]
    OurSeeksRemoved,
    #[serde(rename = "seek_updated")]
    SeekUpdated,
    #[serde(rename = "onChallengeAdd")]
    ChallengeAdd,
    #[serde(rename = "onChallengeRemove")]
    ChallengeRemove,
    #[serde(rename = "onOfferAdd")]
    OfferAdd,
    #[serde(rename = "onOurOfferAdd")]
    OurOfferAdd,
    #[serde(rename = "onOfferRemove")]
    OfferRemove,
    #[serde(rename = "playGameCreated")]
    PlayGameCreated,
    #[serde(rename = "boardUpdate")]
    BoardUpdate,
    #[serde(rename = "gameEnded")]
    GameEnded,
    #[serde(rename = "onAdjournmentsList")]
    AdjournmentsList,
    #[serde(rename = "adjournedGamePreview")]
    AdjournedGamePreview,
}

impl EventKind {
    /// 信号名
    pub fn signal_name(&self) -> &'static str {
        match self {
            EventKind::AddSeek => "addSeek",
            EventKind::ClearSeeks => "clearSeeks",
            EventKind::RemoveSeek => "removeSeek",
            EventKind::OurSeeksRemoved => "our_seeks_removed",
            EventKind::SeekUpdated => "seek_updated",
            EventKind::ChallengeAdd => "onChallengeAdd",
            EventKind::ChallengeRemove => "onChallengeRemove",
            EventKind::OfferAdd => "onOfferAdd",
            EventKind::OurOfferAdd => "onOurOfferAdd",
            EventKind::OfferRemove => "onOfferRemove",
            EventKind::PlayGameCreated => "playGameCreated",
            EventKind::BoardUpdate => "boardUpdate",
            EventKind::GameEnded => "gameEnded",
            EventKind::AdjournmentsList => "onAdjournmentsList",
            EventKind::AdjournedGamePreview => "adjournedGamePreview",
        }
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AddSeek(_) => EventKind::AddSeek,
            Event::ClearSeeks => EventKind::ClearSeeks,
            Event::RemoveSeek(_) => EventKind::RemoveSeek,
            Event::OurSeeksRemoved => EventKind::OurSeeksRemoved,
            Event::SeekUpdated(_) => EventKind::SeekUpdated,
            Event::ChallengeAdd { .. } => EventKind::ChallengeAdd,
            Event::ChallengeRemove(_) => EventKind::ChallengeRemove,
            Event::OfferAdd(_) => EventKind::OfferAdd,
            Event::OurOfferAdd(_) => EventKind::OurOfferAdd,
            Event::OfferRemove(_) => EventKind::OfferRemove,
            Event::PlayGameCreated(_) => EventKind::PlayGameCreated,
            Event::BoardUpdate { .. } => EventKind::BoardUpdate,
            Event::GameEnded { .. } => EventKind::GameEnded,
            Event::AdjournmentsList(_) => EventKind::AdjournmentsList,
            Event::AdjournedGamePreview(_) => EventKind::AdjournedGamePreview,
        }
    }

    pub fn signal_name(&self) -> &'static str {
        self.kind().signal_name()
    }
}

/// 订阅句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    /// None 表示订阅全部事件
    kind: Option<EventKind>,
    callback: Callback,
}

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅某种事件
    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.add(Some(kind), Box::new(callback))
    }

    /// 订阅所有事件
    pub fn subscribe_all<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.add(None, Box::new(callback))
    }

    fn add(&mut self, kind: Option<EventKind>, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber { id, kind, callback });
        id
    }

    /// 取消订阅，返回是否存在
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// 按订阅顺序同步分发
    pub fn emit(&mut self, event: &Event) {
        let kind = event.kind();
        for subscriber in &mut self.subscribers {
            if subscriber.kind.map_or(true, |k| k == kind) {
                (subscriber.callback)(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
