//! 封盘管理器
//!
//! 三类消息：
//! - 列表：表头 + 若干行，以任意非列表行结束；或 `<name> has no adjourned games.`
//! - 预览：预览头、对局说明、着法表、`{原因} 结果`
//! - 紧跟列表的预览：可以没有预览头，颜色/时限等取自列表中对手相同的那一行

use fics_protocol::{
    parse_move_table_header, parse_no_stored, Color, FramedLine, GameMetadata, GameRecord,
    MatchInfo, MoveRecord, MoveRow, PreviewHeader, Rating, ReasonLine, StoredGame,
};

use crate::dispatch::{Family, HandlerContext, LineHandler, MessageKind};
use crate::events::Event;
use crate::game::{AdjournedGame, Board};
use crate::state::SessionState;

/// 正在组装的预览
#[derive(Debug, Default)]
struct PreviewBuilder {
    header: Option<PreviewHeader>,
    info: Option<MatchInfo>,
    /// 着法表表头中的白、黑名字
    table_names: Option<(String, String)>,
    /// 第一行着法的先走方
    first_mover: Option<Color>,
    moves: Vec<MoveRecord>,
}

#[derive(Debug, Default)]
enum AdjournState {
    #[default]
    Idle,
    Listing(Vec<StoredGame>),
    Preview(PreviewBuilder),
}

#[derive(Debug, Default)]
pub struct AdjournManager {
    state: AdjournState,
    /// 最近一次列表，作为后续预览的上下文
    last_listing: Vec<StoredGame>,
}

impl AdjournManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn on_idle(&mut self, kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        match kind {
            Some(MessageKind::StoredHeader) => self.state = AdjournState::Listing(Vec::new()),
            Some(MessageKind::NoStoredGames) => {
                let Some(name) = parse_no_stored(&line.text) else {
                    return;
                };
                if !ctx.state.username.is_empty() && !ctx.state.is_us(name) {
                    tracing::debug!("忽略他人的封盘列表: {}", name);
                    return;
                }
                self.last_listing.clear();
                ctx.emit(Event::AdjournmentsList(Vec::new()));
            }
            Some(MessageKind::PreviewHeader) => match PreviewHeader::parse(line.text.trim()) {
                Ok(header) => {
                    self.state = AdjournState::Preview(PreviewBuilder {
                        header: Some(header),
                        ..PreviewBuilder::default()
                    })
                }
                Err(e) => tracing::warn!("丢弃预览头: {}", e),
            },
            Some(MessageKind::MoveTableHeader) => match parse_move_table_header(&line.text) {
                Ok(names) => {
                    self.state = AdjournState::Preview(PreviewBuilder {
                        table_names: Some(names),
                        ..PreviewBuilder::default()
                    })
                }
                Err(e) => tracing::debug!("不是着法表表头: {}", e),
            },
            _ => {}
        }
    }

    fn on_listing(
        &mut self,
        mut rows: Vec<StoredGame>,
        kind: Option<MessageKind>,
        line: &FramedLine,
        ctx: &mut HandlerContext<'_>,
    ) {
        if kind == Some(MessageKind::StoredRow) {
            match StoredGame::parse(&line.text) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!("丢弃封盘列表行: {}", e),
            }
            self.state = AdjournState::Listing(rows);
            return;
        }

        // 任意非列表行结束列表，先发布再按空闲状态处理该行
        let games: Vec<AdjournedGame> = rows
            .iter()
            .map(|row| {
                ctx.state.players.get_or_create(&row.opponent);
                AdjournedGame::from_stored(row, &ctx.state.username)
            })
            .collect();
        self.last_listing = rows;
        ctx.emit(Event::AdjournmentsList(games));
        self.on_idle(kind, line, ctx);
    }

    fn on_preview(
        &mut self,
        mut builder: PreviewBuilder,
        kind: Option<MessageKind>,
        line: &FramedLine,
        ctx: &mut HandlerContext<'_>,
    ) {
        match kind {
            Some(MessageKind::PreviewMatchInfo) => match MatchInfo::parse(&line.text) {
                Ok(info) => builder.info = Some(info),
                Err(e) => {
                    tracing::warn!("丢弃预览: {}", e);
                    return;
                }
            },
            Some(MessageKind::MoveTableHeader) => match parse_move_table_header(&line.text) {
                Ok(names) => builder.table_names = Some(names),
                Err(e) => {
                    tracing::warn!("丢弃预览: {}", e);
                    return;
                }
            },
            Some(MessageKind::MoveRow) => match MoveRow::parse(&line.text) {
                Ok(row) => {
                    builder.first_mover.get_or_insert(row.first);
                    builder.moves.extend(row.plies);
                }
                Err(e) => {
                    tracing::warn!("丢弃预览: {}", e);
                    return;
                }
            },
            Some(MessageKind::MoveListResult) => {
                match ReasonLine::parse(&line.text) {
                    Ok(reason) => self.finish_preview(builder, reason, ctx),
                    Err(e) => tracing::warn!("丢弃预览: {}", e),
                }
                return;
            }
            // 新的预览或列表开始，放弃当前预览
            Some(MessageKind::PreviewHeader | MessageKind::StoredHeader | MessageKind::NoStoredGames) => {
                tracing::warn!("预览未结束即开始新消息，丢弃");
                self.on_idle(kind, line, ctx);
                return;
            }
            // 空行、分隔线和夹杂的其他消息
            _ => {}
        }
        self.state = AdjournState::Preview(builder);
    }

    fn finish_preview(
        &mut self,
        builder: PreviewBuilder,
        reason: ReasonLine,
        ctx: &mut HandlerContext<'_>,
    ) {
        let (white, black) = match (&builder.header, &builder.table_names) {
            (Some(header), _) => (header.white.clone(), header.black.clone()),
            (None, Some((white, black))) => (white.clone(), black.clone()),
            (None, None) => {
                tracing::warn!("预览缺少对局双方，丢弃");
                return;
            }
        };

        let context = self
            .last_listing
            .iter()
            .find(|row| {
                row.opponent.eq_ignore_ascii_case(&white) || row.opponent.eq_ignore_ascii_case(&black)
            })
            .cloned();

        let (rated, category, time) = match (&builder.info, &context) {
            (Some(info), _) => (info.rated, info.category, info.time),
            (None, Some(row)) => (row.rated, row.category, row.time),
            (None, None) => {
                tracing::warn!("预览缺少对局类型，丢弃");
                return;
            }
        };

        let date = match (&builder.header, &context) {
            (Some(header), _) => header.started.at,
            (None, Some(row)) => row.adjourned_at.at,
            (None, None) => {
                tracing::warn!("预览缺少日期，丢弃");
                return;
            }
        };

        let state: &mut SessionState = ctx.state;
        let (white_rating, black_rating) = match &builder.header {
            Some(header) => {
                state.players.get_or_create(&white).add_rating(category, header.white_rating);
                state.players.get_or_create(&black).add_rating(category, header.black_rating);
                (header.white_rating, header.black_rating)
            }
            None => (
                rating_of(state, &white, category),
                rating_of(state, &black, category),
            ),
        };

        let mut record = GameRecord::new(GameMetadata {
            site: state.site.clone(),
            white: white.clone(),
            black: black.clone(),
            white_rating,
            black_rating,
            rated,
            category,
            time,
            date,
        });
        if let Some(color) = builder.first_mover {
            record.set_first_mover(color);
        }
        for mv in builder.moves {
            record.add_move(mv);
        }
        record.set_result(reason.result);
        let (white_clock, black_clock) = record.clocks();

        let our_color = match &context {
            Some(row) => Some(row.our_color),
            None if state.is_us(&white) => Some(Color::White),
            None if state.is_us(&black) => Some(Color::Black),
            None => None,
        };
        if reason.reason.is_none() {
            tracing::debug!("未知的封盘原因: {:?}", reason.annotation);
        }

        let game = AdjournedGame {
            white,
            black,
            our_color,
            ply_count: Some(
                context
                    .as_ref()
                    .map_or(record.moves.len() as u32, |row| row.ply_count),
            ),
            adjourned_at: context.as_ref().map(|row| row.adjourned_at.clone()),
            reason: reason.reason,
            board: Some(Board::with_transcript(white_clock, black_clock, record.to_pgn())),
            rated,
            category,
            private: context.as_ref().is_some_and(|row| row.private),
            time,
            opponent_online: context.as_ref().map(|row| row.opponent_online),
            eco: context.and_then(|row| row.eco),
        };
        ctx.emit(Event::AdjournedGamePreview(game));
    }
}

fn rating_of(state: &mut SessionState, name: &str, category: fics_protocol::GameCategory) -> Rating {
    state.players.get_or_create(name).rating(category)
}

impl LineHandler for AdjournManager {
    fn family(&self) -> Family {
        Family::Adjourn
    }

    fn accepts(&self, kind: Option<MessageKind>) -> bool {
        match self.state {
            AdjournState::Idle => matches!(
                kind,
                Some(
                    MessageKind::StoredHeader
                        | MessageKind::NoStoredGames
                        | MessageKind::PreviewHeader
                        | MessageKind::MoveTableHeader
                )
            ),
            AdjournState::Listing(_) | AdjournState::Preview(_) => true,
        }
    }

    fn handle(&mut self, kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        match std::mem::take(&mut self.state) {
            AdjournState::Idle => self.on_idle(kind, line, ctx),
            AdjournState::Listing(rows) => self.on_listing(rows, kind, line, ctx),
            AdjournState::Preview(builder) => self.on_preview(builder, kind, line, ctx),
        }
    }
}
