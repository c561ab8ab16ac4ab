use anyhow::{Context, Result};
use fics_client::{ClientConfig, Event, Session};
use fics_protocol::{LineConnection, LineConnector, ProtocolError, TcpLineConnector};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn log_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => info!(signal = event.signal_name(), "{}", json),
        Err(e) => warn!("事件序列化失败: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::load();

    // 初始化日志，RUST_LOG 优先于配置文件
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("无效的日志过滤指令")?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let mut session = Session::new(&config);
    session.subscribe_all(log_event);

    // 带参数时回放会话日志
    if let Some(path) = std::env::args().nth(1) {
        info!("回放日志: {}", path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("无法读取日志文件: {}", path))?;
        let total: usize = content.lines().map(|line| session.feed_line(line).len()).sum();
        info!("回放完成，共 {} 个事件", total);
        return Ok(());
    }

    let address = config.network.address();
    info!("连接服务器: {}", address);
    let mut conn = TcpLineConnector.connect(&address).await?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            received = conn.recv_line() => match received {
                Ok(line) => {
                    println!("{}", line);
                    session.feed_line(&line);
                }
                Err(ProtocolError::ConnectionClosed) => {
                    info!("服务器关闭了连接");
                    break;
                }
                Err(e) => return Err(e.into()),
            },
            input = stdin.next_line() => match input? {
                Some(command) => conn.send_line(&command).await?,
                None => {
                    info!("输入结束，断开连接");
                    conn.close().await?;
                    break;
                }
            },
        }
    }

    Ok(())
}
