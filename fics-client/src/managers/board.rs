//! 棋盘管理器
//!
//! `Creating:` 行之后的第一条匹配 style 12 行确认对局创建；
//! 其余 style 12 行原地更新已登记对局的棋盘；`{Game N ...} result` 结束对局。

use fics_protocol::{FramedLine, GameCreation, GameNotice, Style12};

use crate::dispatch::{Family, HandlerContext, LineHandler, MessageKind};
use crate::events::Event;
use crate::game::{Board, Game};

#[derive(Debug, Default)]
pub struct BoardManager {
    /// 等待 style 12 行的创建确认
    pending: Option<GameCreation>,
}

impl BoardManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn on_state(&mut self, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        let s12 = match Style12::parse(&line.text) {
            Ok(s12) => s12,
            Err(e) => {
                tracing::warn!("丢弃 style 12 行: {}", e);
                return;
            }
        };

        let matches_pending = self.pending.as_ref().is_some_and(|c| {
            c.white.eq_ignore_ascii_case(&s12.white) && c.black.eq_ignore_ascii_case(&s12.black)
        });
        match self.pending.take() {
            Some(creation) if matches_pending => create_game(creation, s12, ctx),
            other => {
                self.pending = other;
                update_game(s12, ctx);
            }
        }
    }

    fn on_notice(&mut self, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        let notice = match GameNotice::parse(&line.text) {
            Ok(notice) => notice,
            Err(e) => {
                tracing::warn!("丢弃对局公告: {}", e);
                return;
            }
        };
        let Some(result) = notice.result else {
            return;
        };
        if ctx.state.remove_game(notice.game_number).is_none() {
            tracing::debug!("结束的对局 {} 未登记", notice.game_number);
        }
        ctx.emit(Event::GameEnded {
            game_number: notice.game_number,
            result,
            text: notice.text,
        });
    }
}

fn create_game(creation: GameCreation, s12: Style12, ctx: &mut HandlerContext<'_>) {
    let state = &mut *ctx.state;
    let initial = s12.is_initial_position();
    for (name, rating) in [
        (&s12.white, creation.white_rating),
        (&s12.black, creation.black_rating),
    ] {
        let player = state.players.get_or_create(name);
        if initial {
            player.add_rating(creation.category, rating);
        }
    }

    if let Some(old) = state.remove_game(s12.game_number) {
        tracing::debug!("对局 {} 被新对局替换: {} vs {}", old.number, old.white, old.black);
    }

    let game = Game {
        number: s12.game_number,
        white: s12.white.clone(),
        black: s12.black.clone(),
        rated: creation.rated,
        category: creation.category,
        private: false,
        time: creation.time,
        board: Board::with_fen(s12.white_clock_ms, s12.black_clock_ms, s12.to_fen()),
    };

    for name in [&game.white, &game.black] {
        state.players.set_game(name, Some(game.number));
        for id in state.remove_seeks_by(name) {
            tracing::debug!("对局创建，移除 seek {}", id);
        }
        for id in state.remove_offers_by(name) {
            tracing::debug!("对局创建，移除提议 {}", id);
        }
    }

    tracing::info!("对局 {} 开始: {} vs {}", game.number, game.white, game.black);
    state.games.insert(game.clone());
    ctx.emit(Event::PlayGameCreated(game));
}

fn update_game(s12: Style12, ctx: &mut HandlerContext<'_>) {
    let Some(game) = ctx.state.games.get_mut(s12.game_number) else {
        tracing::debug!("忽略未登记对局 {} 的棋盘", s12.game_number);
        return;
    };
    let fen = s12.to_fen();
    game.board = Board::with_fen(s12.white_clock_ms, s12.black_clock_ms, fen.clone());
    ctx.emit(Event::BoardUpdate {
        game_number: s12.game_number,
        white_clock_ms: s12.white_clock_ms,
        black_clock_ms: s12.black_clock_ms,
        fen,
        last_move: s12.last_move().map(str::to_string),
    });
}

impl LineHandler for BoardManager {
    fn family(&self) -> Family {
        Family::Board
    }

    fn accepts(&self, kind: Option<MessageKind>) -> bool {
        matches!(
            kind,
            Some(MessageKind::GameCreating | MessageKind::GameState | MessageKind::GameNotice)
        )
    }

    fn handle(&mut self, kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        match kind {
            Some(MessageKind::GameCreating) => match GameCreation::parse(&line.text) {
                Ok(creation) => self.pending = Some(creation),
                Err(e) => tracing::warn!("丢弃创建行: {}", e),
            },
            Some(MessageKind::GameState) => self.on_state(line, ctx),
            Some(MessageKind::GameNotice) => self.on_notice(line, ctx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;
    use fics_protocol::{GameResult, FEN_START};

    const CREATING: &str = "Creating: mgatto (1327) Thegermain (1645) unrated blitz 4 0";
    const INITIAL: &str = "<12> rnbqkbnr pppppppp -------- -------- -------- -------- PPPPPPPP RNBQKBNR W -1 1 1 1 1 0 55 mgatto Thegermain 1 4 0 39 39 240000 240000 1 none (0:00.000) none 0 0 0";
    const AFTER_E4: &str = "<12> rnbqkbnr pppppppp -------- -------- ----P--- -------- PPPP-PPP RNBQKBNR B 4 1 1 1 1 0 55 mgatto Thegermain -1 4 0 39 39 238000 240000 1 P/e2-e4 (0:02.000) e4 0 1 0";

    fn feed(manager: &mut BoardManager, state: &mut SessionState, text: &str) -> Vec<Event> {
        let mut events = Vec::new();
        let kind = crate::dispatch::classify(text);
        if manager.accepts(kind) {
            let mut ctx = HandlerContext::new(state, &mut events);
            manager.handle(kind, &FramedLine::plain(text), &mut ctx);
        }
        events
    }

    #[test]
    fn test_update_in_place() {
        let mut manager = BoardManager::new();
        let mut state = SessionState::default();
        feed(&mut manager, &mut state, CREATING);
        feed(&mut manager, &mut state, INITIAL);

        let events = feed(&mut manager, &mut state, AFTER_E4);
        assert!(matches!(
            &events[..],
            [Event::BoardUpdate { game_number: 55, white_clock_ms: 238000, last_move: Some(m), .. }] if m == "e4"
        ));
        let board = &state.games.get(55).unwrap().board;
        assert_eq!(board.white_clock_ms, 238_000);
        assert_ne!(board.fen(), Some(FEN_START));
    }

    #[test]
    fn test_mismatched_state_line_is_an_update() {
        let mut manager = BoardManager::new();
        let mut state = SessionState::default();
        feed(&mut manager, &mut state, "Creating: someone (1500) else (1500) rated blitz 3 0");
        assert!(feed(&mut manager, &mut state, INITIAL).is_empty());
        assert!(state.games.is_empty());
        assert!(manager.pending.is_some());
    }

    #[test]
    fn test_game_end_removes_game() {
        let mut manager = BoardManager::new();
        let mut state = SessionState::default();
        feed(&mut manager, &mut state, CREATING);
        feed(&mut manager, &mut state, INITIAL);
        assert!(feed(
            &mut manager,
            &mut state,
            "{Game 55 (mgatto vs. Thegermain) Creating unrated blitz match.}"
        )
        .is_empty());

        let events = feed(&mut manager, &mut state, "{Game 55 (mgatto vs. Thegermain) Thegermain resigns} 1-0");
        assert_eq!(
            events,
            vec![Event::GameEnded {
                game_number: 55,
                result: GameResult::WhiteWins,
                text: "Thegermain resigns".to_string(),
            }]
        );
        assert!(state.games.is_empty());
        assert_eq!(state.players.get("mgatto").and_then(|p| p.game), None);
    }

    #[test]
    fn test_creation_consumes_seeks_and_offers() {
        let mut manager = BoardManager::new();
        let mut state = SessionState::default();
        let seek = fics_protocol::Seek::parse(
            "<s> 7 w=Thegermain ti=00 rt=1645  t=4 i=0 r=u tp=blitz c=? rr=0-9999 a=t f=f",
        )
        .unwrap();
        state.seeks.insert(seek.id, seek);

        feed(&mut manager, &mut state, CREATING);
        feed(&mut manager, &mut state, INITIAL);
        assert!(state.seeks.is_empty());
    }
}
