//! 会话：分帧器 + 预测引擎 + 共享状态 + 事件总线
//!
//! 单线程按行处理，每行在读取下一行之前处理完毕。

use fics_protocol::LineFramer;

use crate::config::ClientConfig;
use crate::dispatch::{Family, LineHandler, PredictionEngine};
use crate::events::{Event, EventBus, EventKind, SubscriptionId};
use crate::managers::default_handlers;
use crate::state::SessionState;

#[derive(Debug)]
pub struct Session {
    framer: LineFramer,
    engine: PredictionEngine,
    state: SessionState,
    bus: EventBus,
}

impl Session {
    /// 使用默认管理器创建会话
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_handlers(config, default_handlers())
    }

    /// 使用指定的处理器（按给定顺序注册）创建会话
    pub fn with_handlers(config: &ClientConfig, handlers: Vec<Box<dyn LineHandler>>) -> Self {
        let mut engine = PredictionEngine::new();
        for handler in handlers {
            engine.register(handler);
        }
        Self {
            framer: LineFramer::new(config.prompt.clone()),
            engine,
            state: SessionState::new(config.username.clone(), config.site_name.clone()),
            bus: EventBus::new(),
        }
    }

    /// 处理一行原始文本，返回本行产生的事件（已分发给订阅者）
    pub fn feed_line(&mut self, raw: &str) -> Vec<Event> {
        let Some(line) = self.framer.push(raw) else {
            return Vec::new();
        };
        let events = self.engine.dispatch(&line, &mut self.state);
        for event in &events {
            self.bus.emit(event);
        }
        events
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe(kind, callback)
    }

    pub fn subscribe_all<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe_all(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// 追加一个处理器
    pub fn register(&mut self, handler: Box<dyn LineHandler>) {
        self.engine.register(handler);
    }

    /// 注销某族群的处理器
    pub fn unregister(&mut self, family: Family) -> usize {
        self.engine.unregister(family)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// 登录后设置用户名
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.state.username = username.into();
    }
}
