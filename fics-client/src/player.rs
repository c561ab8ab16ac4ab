//! 玩家注册表
//!
//! 同一会话中每个名字只对应一个 Player，名字大小写不敏感。

use std::collections::HashMap;

use fics_protocol::{GameCategory, Rating};
use serde::{Deserialize, Serialize};

/// 服务器账号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// 首次出现时的写法
    pub name: String,
    /// 各等级分类别的等级分
    pub ratings: HashMap<GameCategory, Rating>,
    /// 当前对局编号
    pub game: Option<u32>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ratings: HashMap::new(),
            game: None,
        }
    }

    /// 记录等级分，未评级的值不记录
    pub fn add_rating(&mut self, category: GameCategory, rating: Rating) {
        if rating.is_rated() {
            self.ratings.insert(category.rating_category(), rating);
        }
    }

    /// 查询等级分，没有记录时为 Unrated
    pub fn rating(&self, category: GameCategory) -> Rating {
        self.ratings
            .get(&category.rating_category())
            .copied()
            .unwrap_or_default()
    }
}

/// 玩家注册表
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    /// 小写名字 -> 玩家
    players: HashMap<String, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// 获取玩家，不存在时创建
    pub fn get_or_create(&mut self, name: &str) -> &mut Player {
        self.players
            .entry(Self::key(name))
            .or_insert_with(|| {
                tracing::debug!("新玩家: {}", name);
                Player::new(name)
            })
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.get(&Self::key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.get_mut(&Self::key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// 设置玩家的当前对局
    pub fn set_game(&mut self, name: &str, game: Option<u32>) {
        self.get_or_create(name).game = game;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_case_insensitive() {
        let mut registry = PlayerRegistry::new();
        registry.get_or_create("Thegermain");
        registry.get_or_create("thegermain").add_rating(GameCategory::Blitz, Rating::Rated(1645));

        assert_eq!(registry.len(), 1);
        let player = registry.get("THEGERMAIN").unwrap();
        assert_eq!(player.name, "Thegermain");
        assert_eq!(player.rating(GameCategory::Blitz), Rating::Rated(1645));
    }

    #[test]
    fn test_unrated_is_not_recorded() {
        let mut registry = PlayerRegistry::new();
        let guest = registry.get_or_create("GuestRLJC");
        guest.add_rating(GameCategory::Blitz, Rating::Unrated);
        assert!(guest.ratings.is_empty());
        assert_eq!(guest.rating(GameCategory::Blitz), Rating::Unrated);
    }

    #[test]
    fn test_wild_ratings_share_category() {
        let mut player = Player::new("antiseptic");
        player.add_rating(GameCategory::Wild4, Rating::Rated(1945));
        assert_eq!(player.rating(GameCategory::WildFr), Rating::Rated(1945));
    }

    #[test]
    fn test_set_game() {
        let mut registry = PlayerRegistry::new();
        registry.set_game("mgatto", Some(55));
        assert_eq!(registry.get("MGatto").and_then(|p| p.game), Some(55));
        registry.set_game("mgatto", None);
        assert_eq!(registry.get("mgatto").and_then(|p| p.game), None);
        assert!(!registry.contains("nobody"));
    }
}
