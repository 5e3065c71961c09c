use crate::station_manager::StationManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Where the station gateway's newline-delimited traffic comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    Stdio,
    /// `host:port` of a serial-to-TCP bridge
    Tcp(String),
}

impl LinkSource {
    /// Empty or `stdio` selects standard input/output, anything else is a TCP address
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "stdio" | "-" => LinkSource::Stdio,
            addr => LinkSource::Tcp(addr.to_string()),
        }
    }
}

/// Keep the link up for the life of the process. TCP links are re-dialed
/// after a failure; a closed stdin ends the task.
pub async fn run(
    source: LinkSource,
    manager: Arc<StationManager>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    loop {
        let result = match &source {
            LinkSource::Stdio => {
                info!("Link reading from stdin");
                serve(tokio::io::stdin(), tokio::io::stdout(), &manager, &mut outbound).await
            }
            LinkSource::Tcp(addr) => match TcpStream::connect(addr).await {
                Ok(stream) => {
                    info!("Link connected to {}", addr);
                    let (reader, writer) = stream.into_split();
                    serve(reader, writer, &manager, &mut outbound).await
                }
                Err(e) => Err(e.into()),
            },
        };

        match result {
            Ok(()) => info!("Link closed"),
            Err(e) => error!("Link failed: {}", e),
        }

        if source == LinkSource::Stdio {
            break;
        }
        warn!("Reconnecting link in {:?}", RECONNECT_DELAY);
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Pump one connection: every inbound line goes to the engine, every queued
/// outbound line is written back. Returns when the reader hits end of input.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    manager: &StationManager,
    outbound: &mut mpsc::UnboundedReceiver<String>,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => manager.dispatch_line(&line).await,
                None => return Ok(()),
            },
            Some(reply) = outbound.recv() => {
                writer.write_all(reply.as_bytes()).await?;
                writer.flush().await?;
            }
        }
    }
}
