//! 协议常量定义

use std::time::Duration;

/// block mode 起始标记
pub const BLOCK_START: char = '\u{15}';

/// block mode 字段分隔符
pub const BLOCK_SEPARATOR: char = '\u{16}';

/// block mode 结束标记
pub const BLOCK_END: char = '\u{17}';

/// 回复块中夹带的主动消息（pose）起始标记
pub const BLOCK_POSE_START: char = '\u{18}';

/// pose 结束标记
pub const BLOCK_POSE_END: char = '\u{19}';

/// 默认命令提示符
pub const DEFAULT_PROMPT: &str = "fics%";

/// 默认站点名（用于棋谱头）
pub const DEFAULT_SITE: &str = "FICS";

/// `seek` 命令的回复码
pub const BLKCMD_SEEK: u32 = 155;

/// `unseek` 命令的回复码
pub const BLKCMD_UNSEEK: u32 = 156;

/// 视为"撤回自己的 seek"的回复码集合
pub const SEEK_WITHDRAWAL_CODES: &[u32] = &[BLKCMD_UNSEEK];

/// 初始局面 FEN
pub const FEN_START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 单行最大长度（字节）
pub const MAX_LINE_LEN: usize = 8192;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 默认服务器地址
pub const DEFAULT_HOST: &str = "freechess.org";

/// 默认服务器端口
pub const DEFAULT_PORT: u16 = 5000;
