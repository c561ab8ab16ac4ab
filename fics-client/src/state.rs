//! 会话共享状态

use std::collections::BTreeMap;

use fics_protocol::{Offer, OfferId, Seek, SeekId, DEFAULT_SITE};

use crate::game::{Game, GameRegistry};
use crate::player::PlayerRegistry;

/// 所有管理器读写的共享状态
#[derive(Debug)]
pub struct SessionState {
    /// 当前登录的用户名，未知时为空
    pub username: String,
    /// 棋谱标签中的站点名
    pub site: String,
    pub players: PlayerRegistry,
    pub games: GameRegistry,
    /// 在线的 seek 广告
    pub seeks: BTreeMap<SeekId, Seek>,
    /// 待处理的挑战和提议
    pub offers: BTreeMap<OfferId, Offer>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new("", DEFAULT_SITE)
    }
}

impl SessionState {
    pub fn new(username: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            site: site.into(),
            players: PlayerRegistry::new(),
            games: GameRegistry::new(),
            seeks: BTreeMap::new(),
            offers: BTreeMap::new(),
        }
    }

    /// 是否为当前用户（用户名未知时总是 false）
    pub fn is_us(&self, name: &str) -> bool {
        !self.username.is_empty() && self.username.eq_ignore_ascii_case(name)
    }

    /// 移除对局，并清除双方的当前对局引用
    pub fn remove_game(&mut self, number: u32) -> Option<Game> {
        let game = self.games.remove(number)?;
        for name in [&game.white, &game.black] {
            if let Some(player) = self.players.get_mut(name) {
                if player.game == Some(number) {
                    player.game = None;
                }
            }
        }
        Some(game)
    }

    /// 删除该玩家发布的所有 seek，返回被删除的编号
    pub fn remove_seeks_by(&mut self, name: &str) -> Vec<SeekId> {
        let ids: Vec<SeekId> = self
            .seeks
            .values()
            .filter(|seek| seek.seeker.eq_ignore_ascii_case(name))
            .map(|seek| seek.id)
            .collect();
        for id in &ids {
            self.seeks.remove(id);
        }
        ids
    }

    /// 删除与该玩家相关的所有提议，返回被删除的编号
    pub fn remove_offers_by(&mut self, name: &str) -> Vec<OfferId> {
        let ids: Vec<OfferId> = self
            .offers
            .values()
            .filter(|offer| offer.from.eq_ignore_ascii_case(name))
            .map(|offer| offer.id)
            .collect();
        for id in &ids {
            self.offers.remove(id);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fics_protocol::{OfferLine, TimeControl};

    #[test]
    fn test_remove_game_clears_players() {
        let mut state = SessionState::default();
        let mut game = Game::placeholder(55);
        game.white = "mgatto".to_string();
        game.black = "Thegermain".to_string();
        game.time = TimeControl::new(4, 0);
        state.games.insert(game);
        state.players.set_game("mgatto", Some(55));
        state.players.set_game("thegermain", Some(55));

        let removed = state.remove_game(55).unwrap();
        assert_eq!(removed.number, 55);
        assert_eq!(state.players.get("mgatto").and_then(|p| p.game), None);
        assert_eq!(state.players.get("Thegermain").and_then(|p| p.game), None);
        assert!(state.remove_game(55).is_none());
    }

    #[test]
    fn test_remove_by_player() {
        let mut state = SessionState::default();
        let seek = Seek::parse("<s> 10 w=warbly ti=00 rt=1291  t=3 i=0 r=r tp=blitz c=? rr=1200-1400 a=t f=t")
            .unwrap();
        state.seeks.insert(seek.id, seek);
        if let OfferLine::Incoming(offer) = OfferLine::parse("<pf> 3 w=Warbly t=draw p=#").unwrap() {
            state.offers.insert(offer.id, offer);
        }

        assert_eq!(state.remove_seeks_by("WARBLY"), vec![10]);
        assert_eq!(state.remove_offers_by("warbly"), vec![3]);
        assert!(state.seeks.is_empty());
        assert!(state.offers.is_empty());
    }

    #[test]
    fn test_is_us() {
        let state = SessionState::new("mgatto", "FICS");
        assert!(state.is_us("MGatto"));
        assert!(!state.is_us("other"));
        assert!(!SessionState::default().is_us(""));
    }
}
