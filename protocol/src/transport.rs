//! 传输层抽象
//!
//! 提供 LineConnector/LineConnection traits，使会话层只面对"按行收发"，
//! 与具体的 telnet/TCP 实现解耦。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{ProtocolError, Result};
use crate::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, MAX_LINE_LEN};

/// telnet 命令前缀
const IAC: u8 = 255;
/// 子协商开始 / 结束
const SB: u8 = 250;
const SE: u8 = 240;
/// 带选项参数的命令（WILL/WONT/DO/DONT）
const OPTION_COMMANDS: std::ops::RangeInclusive<u8> = 251..=254;

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// 按行收发的连接
#[async_trait]
pub trait LineConnection: Send {
    /// 接收一行（已去掉换行和 telnet 控制序列）
    async fn recv_line(&mut self) -> Result<String>;

    /// 发送一行，自动追加换行
    async fn send_line(&mut self, line: &str) -> Result<()>;

    /// 关闭连接
    async fn close(&mut self) -> Result<()>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait
#[async_trait]
pub trait LineConnector: Send + Sync {
    type Conn: LineConnection;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn>;
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpLineConnector;

#[async_trait]
impl LineConnector for TcpLineConnector {
    type Conn = TcpLineConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)?
            .map_err(ProtocolError::Io)?;

        tracing::info!("已连接到 {}", addr);
        TcpLineConnection::from_stream(stream)
    }
}

/// TCP 连接
pub struct TcpLineConnection {
    reader: LineReader<OwnedReadHalf>,
    writer: LineWriter<OwnedWriteHalf>,
    peer_addr: Option<String>,
}

impl TcpLineConnection {
    /// 从 TcpStream 创建
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: LineReader::new(read_half),
            writer: LineWriter::new(write_half),
            peer_addr,
        })
    }
}

#[async_trait]
impl LineConnection for TcpLineConnection {
    async fn recv_line(&mut self) -> Result<String> {
        self.reader.read_line().await
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_line(line).await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

// ============================================================================
// 行编解码
// ============================================================================

/// 行读取器
pub struct LineReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> LineReader<R> {
    /// 创建新的行读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(256),
        }
    }

    /// 读取一行
    ///
    /// 在 `select!` 中被取消时，已读到的部分留在缓冲区，下次调用继续。
    pub async fn read_line(&mut self) -> Result<String> {
        let limit = (MAX_LINE_LEN + 1).saturating_sub(self.buffer.len()) as u64;
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buffer)
            .await?;
        if n == 0 && self.buffer.is_empty() {
            return Err(ProtocolError::ConnectionClosed);
        }
        if self.buffer.last() != Some(&b'\n') && self.buffer.len() > MAX_LINE_LEN {
            let size = self.buffer.len();
            self.buffer.clear();
            return Err(ProtocolError::LineTooLong {
                size,
                max: MAX_LINE_LEN,
            });
        }

        let cleaned = strip_telnet(&self.buffer);
        self.buffer.clear();
        Ok(String::from_utf8_lossy(&cleaned)
            .trim_end_matches(['\r', '\n'])
            .to_string())
    }
}

/// 行写入器
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> LineWriter<W> {
    /// 创建新的行写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写入一行
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        if line.len() > MAX_LINE_LEN {
            return Err(ProtocolError::LineTooLong {
                size: line.len(),
                max: MAX_LINE_LEN,
            });
        }
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// 关闭写端
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// 去掉 telnet IAC 协商序列和 `\r`
fn strip_telnet(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            IAC => match bytes.get(i + 1) {
                Some(&IAC) => {
                    out.push(IAC);
                    i += 2;
                }
                Some(&SB) => {
                    // 跳到 IAC SE
                    let mut j = i + 2;
                    while j + 1 < bytes.len() && !(bytes[j] == IAC && bytes[j + 1] == SE) {
                        j += 1;
                    }
                    i = j + 2;
                }
                Some(cmd) if OPTION_COMMANDS.contains(cmd) => i += 3,
                Some(_) => i += 2,
                None => i += 1,
            },
            b'\r' => i += 1,
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}
