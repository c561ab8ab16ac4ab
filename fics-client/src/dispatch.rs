//! 行分类与分发（预测引擎）
//!
//! `classify` 把一行文本映射为唯一的 `MessageKind`（或不识别），
//! 引擎再把该行交给声明接受此类消息的处理器。每个处理器在本行产生的事件
//! 先各自缓存，最后按族群固定顺序发布，与注册顺序无关。

use fics_protocol::{
    is_move_table_rule, is_stored_header, FramedLine, NO_STORED_SUFFIX, STYLE12_TAG,
};

use crate::events::Event;
use crate::state::SessionState;

/// 消息种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    SeekAdd,
    SeekClear,
    SeekRemove,
    SeekUpdate,
    OfferReceived,
    OfferSent,
    OfferRemoved,
    GameCreating,
    GameState,
    GameNotice,
    StoredHeader,
    StoredRow,
    NoStoredGames,
    PreviewHeader,
    PreviewMatchInfo,
    MoveTableHeader,
    MoveTableRule,
    MoveRow,
    /// 着法表末尾 `{reason} result`
    MoveListResult,
    /// 空行（含只剩提示符的行）
    Blank,
}

/// 对一行文本分类，纯函数
pub fn classify(text: &str) -> Option<MessageKind> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(MessageKind::Blank);
    }

    let kind = if trimmed.starts_with("<s> ") || trimmed.starts_with("<sn> ") {
        MessageKind::SeekAdd
    } else if trimmed == "<sc>" {
        MessageKind::SeekClear
    } else if trimmed.starts_with("<sr>") {
        MessageKind::SeekRemove
    } else if trimmed.starts_with("Updating seek ad ") {
        MessageKind::SeekUpdate
    } else if trimmed.starts_with("<pf> ") {
        MessageKind::OfferReceived
    } else if trimmed.starts_with("<pt> ") {
        MessageKind::OfferSent
    } else if trimmed.starts_with("<pr> ") {
        MessageKind::OfferRemoved
    } else if trimmed.starts_with("Creating: ") {
        MessageKind::GameCreating
    } else if trimmed.starts_with(STYLE12_TAG) {
        MessageKind::GameState
    } else if is_game_notice(trimmed) {
        MessageKind::GameNotice
    } else if trimmed.starts_with('{') {
        MessageKind::MoveListResult
    } else if is_stored_header(trimmed) {
        MessageKind::StoredHeader
    } else if is_numbered(trimmed, ':') {
        MessageKind::StoredRow
    } else if trimmed.ends_with(NO_STORED_SUFFIX) {
        MessageKind::NoStoredGames
    } else if trimmed.contains(" vs. ") && trimmed.contains(" --- ") {
        MessageKind::PreviewHeader
    } else if (trimmed.starts_with("Rated ") || trimmed.starts_with("Unrated "))
        && trimmed.contains(" match")
    {
        MessageKind::PreviewMatchInfo
    } else if trimmed.starts_with("Move ") {
        MessageKind::MoveTableHeader
    } else if is_move_table_rule(trimmed) {
        MessageKind::MoveTableRule
    } else if is_numbered(trimmed, '.') {
        MessageKind::MoveRow
    } else {
        return None;
    };
    Some(kind)
}

/// `{Game <数字>` 开头
fn is_game_notice(text: &str) -> bool {
    text.strip_prefix("{Game ")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// 以 `<数字><sep> ` 开头
fn is_numbered(text: &str, sep: char) -> bool {
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && text[digits..].starts_with(sep)
}

/// 处理器族群，决定事件的发布顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Seek,
    Offer,
    Board,
    Adjourn,
    /// 外部注册的处理器，不同名字之间按名字排序
    Other(&'static str),
}

/// 处理器可访问的上下文
pub struct HandlerContext<'a> {
    pub state: &'a mut SessionState,
    events: &'a mut Vec<Event>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(state: &'a mut SessionState, events: &'a mut Vec<Event>) -> Self {
        Self { state, events }
    }

    /// 缓存一个待发布事件
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// 一个消息族群的处理器
pub trait LineHandler {
    fn family(&self) -> Family;

    /// 是否处理该行；正在累积多行消息的处理器对任何行都返回 true
    fn accepts(&self, kind: Option<MessageKind>) -> bool;

    fn handle(&mut self, kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>);
}

/// 预测引擎：分类 + 分发表
#[derive(Default)]
pub struct PredictionEngine {
    handlers: Vec<Box<dyn LineHandler>>,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器
    ///
    /// 不同族群的处理器按族群排序；同一族群的处理器保持注册顺序，
    /// 后注册的处理器在先注册的之后处理同一行并发布事件。
    pub fn register(&mut self, handler: Box<dyn LineHandler>) {
        tracing::debug!("注册处理器: {:?}", handler.family());
        self.handlers.push(handler);
        self.handlers.sort_by_key(|h| h.family());
    }

    /// 注销某族群的全部处理器，返回注销数量
    pub fn unregister(&mut self, family: Family) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.family() != family);
        before - self.handlers.len()
    }

    /// 已注册的族群
    pub fn families(&self) -> Vec<Family> {
        self.handlers.iter().map(|h| h.family()).collect()
    }

    /// 处理一行，返回按族群顺序排列的事件
    pub fn dispatch(&mut self, line: &FramedLine, state: &mut SessionState) -> Vec<Event> {
        let kind = classify(&line.text);
        let mut batches: Vec<(Family, Vec<Event>)> = Vec::new();

        for handler in &mut self.handlers {
            if !handler.accepts(kind) {
                continue;
            }
            let mut events = Vec::new();
            let mut ctx = HandlerContext::new(state, &mut events);
            handler.handle(kind, line, &mut ctx);
            if !events.is_empty() {
                batches.push((handler.family(), events));
            }
        }

        if kind.is_none() && batches.is_empty() {
            tracing::trace!("未识别的行: {:?}", line.text);
        }

        batches.sort_by_key(|(family, _)| *family);
        batches.into_iter().flat_map(|(_, events)| events).collect()
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("families", &self.families())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_seek_and_offer_lines() {
        assert_eq!(
            classify("<s> 10 w=warbly ti=00 rt=1291  t=3 i=0 r=r tp=blitz c=? rr=1200-1400 a=t f=t"),
            Some(MessageKind::SeekAdd)
        );
        assert_eq!(classify("<sn> 121 w=mgatto"), Some(MessageKind::SeekAdd));
        assert_eq!(classify("<sc>"), Some(MessageKind::SeekClear));
        assert_eq!(classify("<sr> 111 25"), Some(MessageKind::SeekRemove));
        assert_eq!(
            classify("Updating seek ad 105 to automatic."),
            Some(MessageKind::SeekUpdate)
        );
        assert_eq!(classify("<pf> 59 w=antiseptic t=match p=x"), Some(MessageKind::OfferReceived));
        assert_eq!(classify("<pt> 4 w=bar t=draw p=#"), Some(MessageKind::OfferSent));
        assert_eq!(classify("<pr> 59"), Some(MessageKind::OfferRemoved));
    }

    #[test]
    fn test_classify_game_lines() {
        assert_eq!(
            classify("Creating: mgatto (1327) Thegermain (1645) unrated blitz 4 0"),
            Some(MessageKind::GameCreating)
        );
        assert_eq!(classify("<12> rnbqkbnr pppppppp"), Some(MessageKind::GameState));
        assert_eq!(
            classify("{Game 55 (mgatto vs. Thegermain) Creating unrated blitz match.}"),
            Some(MessageKind::GameNotice)
        );
        assert_eq!(
            classify("    {Game adjourned by mutual agreement} *"),
            Some(MessageKind::MoveListResult)
        );
        assert_eq!(classify("Your seek matches one already posted by Thegermain."), None);
    }

    #[test]
    fn test_classify_adjourn_lines() {
        assert_eq!(
            classify("    C Opponent       On Type          Str  M    ECO Date"),
            Some(MessageKind::StoredHeader)
        );
        assert_eq!(
            classify(" 1: W gbtami         N [ wr  2   2] 31-31 W18  --- Wed Dec 23, 06:58 PST 2009"),
            Some(MessageKind::StoredRow)
        );
        assert_eq!(classify("tester has no adjourned games."), Some(MessageKind::NoStoredGames));
        assert_eq!(
            classify("BwanaSlei (1137) vs. mgatto (1336) --- Wed Nov  5, 20:56 PST 2008"),
            Some(MessageKind::PreviewHeader)
        );
        assert_eq!(
            classify("Rated blitz match, initial time: 5 minutes, increment: 0 seconds."),
            Some(MessageKind::PreviewMatchInfo)
        );
        assert_eq!(classify("Move  BwanaSlei               mgatto"), Some(MessageKind::MoveTableHeader));
        assert_eq!(
            classify("----  ---------------------   ---------------------"),
            Some(MessageKind::MoveTableRule)
        );
        assert_eq!(
            classify("  1.  e4      (0:00.000)     c5      (0:00.000)"),
            Some(MessageKind::MoveRow)
        );
        assert_eq!(classify(""), Some(MessageKind::Blank));
        assert_eq!(classify("   "), Some(MessageKind::Blank));
    }

    struct Recorder {
        family: Family,
        kinds: &'static [MessageKind],
    }

    impl LineHandler for Recorder {
        fn family(&self) -> Family {
            self.family
        }

        fn accepts(&self, kind: Option<MessageKind>) -> bool {
            kind.is_some_and(|k| self.kinds.contains(&k))
        }

        fn handle(&mut self, _kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
            ctx.emit(Event::SeekUpdated(format!("{:?}:{}", self.family, line.text)));
        }
    }

    #[test]
    fn test_events_follow_family_order() {
        let mut state = SessionState::default();
        let mut engine = PredictionEngine::new();
        engine.register(Box::new(Recorder {
            family: Family::Other("late"),
            kinds: &[MessageKind::Blank],
        }));
        engine.register(Box::new(Recorder {
            family: Family::Seek,
            kinds: &[MessageKind::Blank, MessageKind::SeekClear],
        }));

        let events = engine.dispatch(&FramedLine::plain(""), &mut state);
        assert_eq!(
            events,
            vec![
                Event::SeekUpdated("Seek:".to_string()),
                Event::SeekUpdated("Other(\"late\"):".to_string()),
            ]
        );

        let events = engine.dispatch(&FramedLine::plain("<sc>"), &mut state);
        assert_eq!(events.len(), 1);

        assert_eq!(engine.families(), vec![Family::Seek, Family::Other("late")]);
        assert_eq!(engine.unregister(Family::Seek), 1);
        assert_eq!(engine.families(), vec![Family::Other("late")]);
    }

    struct Tagged(&'static str);

    impl LineHandler for Tagged {
        fn family(&self) -> Family {
            Family::Other("alpha")
        }

        fn accepts(&self, kind: Option<MessageKind>) -> bool {
            kind == Some(MessageKind::Blank)
        }

        fn handle(&mut self, _kind: Option<MessageKind>, _line: &FramedLine, ctx: &mut HandlerContext<'_>) {
            ctx.emit(Event::SeekUpdated(self.0.to_string()));
        }
    }

    #[test]
    fn test_same_family_keeps_registration_order() {
        let mut state = SessionState::default();
        let mut engine = PredictionEngine::new();
        engine.register(Box::new(Recorder {
            family: Family::Other("zeta"),
            kinds: &[MessageKind::Blank],
        }));
        engine.register(Box::new(Tagged("second")));
        engine.register(Box::new(Tagged("third")));
        assert_eq!(
            engine.families(),
            vec![Family::Other("alpha"), Family::Other("alpha"), Family::Other("zeta")]
        );

        let events = engine.dispatch(&FramedLine::plain(""), &mut state);
        assert_eq!(
            events,
            vec![
                Event::SeekUpdated("second".to_string()),
                Event::SeekUpdated("third".to_string()),
                Event::SeekUpdated("Other(\"zeta\"):".to_string()),
            ]
        );
    }
}
