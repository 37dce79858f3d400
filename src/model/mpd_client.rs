//! MPD line-protocol client
//!
//! Requests are single command lines. Replies are `key: value` lines
//! terminated by `OK`, or a single `ACK [code@index] {command} message`.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;

use crate::error::PlayerError;
use super::player_client::{PlayerClient, PlayerResult};
use super::status::{PlayerStatus, SongInfo};

type Reply = Vec<(String, String)>;

/// A live, in-sync protocol session
struct Connection {
    stream: BufReader<TcpStream>,
    timeout: Duration,
    status_pending: bool,
}

impl Connection {
    async fn open(host: &str, port: u16, timeout: Duration) -> PlayerResult<(Self, String)> {
        let stream = time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| PlayerError::Timeout("connect"))??;
        stream.set_nodelay(true)?;

        let mut conn = Self {
            stream: BufReader::new(stream),
            timeout,
            status_pending: false,
        };

        let greeting = conn.read_line("greeting").await?;
        match greeting.strip_prefix("OK MPD ") {
            Some(version) => Ok((conn, version.to_string())),
            None => Err(PlayerError::Protocol(format!("unexpected greeting: {greeting}"))),
        }
    }

    async fn read_line(&mut self, operation: &'static str) -> PlayerResult<String> {
        let mut line = String::new();
        let n = time::timeout(self.timeout, self.stream.read_line(&mut line))
            .await
            .map_err(|_| PlayerError::Timeout(operation))??;
        if n == 0 {
            return Err(PlayerError::Disconnected);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn send(&mut self, command: &str, operation: &'static str) -> PlayerResult<()> {
        let line = format!("{command}\n");
        time::timeout(self.timeout, async {
            self.stream.get_mut().write_all(line.as_bytes()).await?;
            self.stream.get_mut().flush().await
        })
        .await
        .map_err(|_| PlayerError::Timeout(operation))??;
        Ok(())
    }

    async fn read_reply(&mut self, operation: &'static str) -> PlayerResult<Reply> {
        let mut pairs = Vec::new();
        loop {
            let line = self.read_line(operation).await?;
            if line == "OK" {
                return Ok(pairs);
            }
            if let Some(rest) = line.strip_prefix("ACK ") {
                return Err(parse_ack(rest));
            }
            match line.split_once(": ") {
                Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
                None => {
                    return Err(PlayerError::Protocol(format!("malformed reply line: {line}")));
                }
            }
        }
    }

    /// Consume an outstanding status reply so the next reply lines up
    async fn settle(&mut self) -> PlayerResult<()> {
        if self.status_pending {
            self.status_pending = false;
            self.read_reply("status").await?;
        }
        Ok(())
    }

    async fn request_status(&mut self) -> PlayerResult<()> {
        if !self.status_pending {
            self.send("status", "status").await?;
            self.status_pending = true;
        }
        Ok(())
    }

    /// Take the reply to a pending `status`, sending one first if needed
    async fn fetch_status(&mut self) -> PlayerResult<Reply> {
        self.request_status().await?;
        self.status_pending = false;
        self.read_reply("status").await
    }

    async fn exchange(&mut self, command: &str, operation: &'static str) -> PlayerResult<Reply> {
        self.settle().await?;
        self.send(command, operation).await?;
        self.read_reply(operation).await
    }
}

/// Parse the part of an ACK line after `ACK `
fn parse_ack(rest: &str) -> PlayerError {
    let code = rest
        .strip_prefix('[')
        .and_then(|s| s.split_once('@'))
        .and_then(|(code, _)| code.parse().ok())
        .unwrap_or(0);
    let command = rest
        .split_once('{')
        .and_then(|(_, s)| s.split_once('}'))
        .map(|(cmd, _)| cmd.to_string())
        .unwrap_or_default();
    let message = rest
        .split_once("} ")
        .map(|(_, msg)| msg.to_string())
        .unwrap_or_else(|| rest.to_string());
    PlayerError::Ack { code, command, message }
}

fn pairs(reply: &Reply) -> impl Iterator<Item = (&str, &str)> {
    reply.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// MPD client that reconnects lazily after a broken session.
///
/// A failed exchange (I/O, timeout, garbage) drops the session; the next
/// call makes one fresh connection attempt. ACK replies keep the session.
pub struct MpdClient {
    host: String,
    port: u16,
    timeout: Duration,
    conn: Option<Connection>,
    version: String,
}

impl MpdClient {
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> PlayerResult<Self> {
        let (conn, version) = Connection::open(host, port, timeout).await?;
        tracing::info!(host, port, version = %version, "Connected to player daemon");
        Ok(Self {
            host: host.to_string(),
            port,
            timeout,
            conn: Some(conn),
            version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connection(&mut self) -> PlayerResult<&mut Connection> {
        if self.conn.is_none() {
            tracing::info!(host = %self.host, port = self.port, "Reconnecting to player daemon");
            let (conn, version) = Connection::open(&self.host, self.port, self.timeout).await?;
            self.version = version;
            self.conn = Some(conn);
        }
        self.conn.as_mut().ok_or(PlayerError::Disconnected)
    }

    fn check<T>(&mut self, result: PlayerResult<T>) -> PlayerResult<T> {
        if let Err(e) = &result {
            if !matches!(e, PlayerError::Ack { .. }) && self.conn.take().is_some() {
                tracing::warn!(error = %e, "Player session dropped");
            }
        }
        result
    }

    async fn exchange(&mut self, command: &str, operation: &'static str) -> PlayerResult<Reply> {
        let result = match self.connection().await {
            Ok(conn) => conn.exchange(command, operation).await,
            Err(e) => Err(e),
        };
        self.check(result)
    }

    async fn simple(&mut self, command: &str, operation: &'static str) -> PlayerResult<()> {
        self.exchange(command, operation).await.map(|_| ())
    }
}

impl PlayerClient for MpdClient {
    async fn status(&mut self) -> PlayerResult<PlayerStatus> {
        let reply = self.exchange("status", "status").await?;
        Ok(PlayerStatus::from_pairs(pairs(&reply)))
    }

    async fn request_status(&mut self) -> PlayerResult<()> {
        let result = match self.connection().await {
            Ok(conn) => conn.request_status().await,
            Err(e) => Err(e),
        };
        self.check(result)
    }

    async fn fetch_status(&mut self) -> PlayerResult<PlayerStatus> {
        let result = match self.connection().await {
            Ok(conn) => conn.fetch_status().await,
            Err(e) => Err(e),
        };
        let reply = self.check(result)?;
        Ok(PlayerStatus::from_pairs(pairs(&reply)))
    }

    async fn current_song(&mut self) -> PlayerResult<SongInfo> {
        let reply = self.exchange("currentsong", "currentsong").await?;
        Ok(SongInfo::from_pairs(pairs(&reply)))
    }

    async fn set_volume(&mut self, volume: u8) -> PlayerResult<()> {
        self.simple(&format!("setvol {}", volume.min(100)), "setvol").await
    }

    async fn next(&mut self) -> PlayerResult<()> {
        self.simple("next", "next").await
    }

    async fn previous(&mut self) -> PlayerResult<()> {
        self.simple("previous", "previous").await
    }

    async fn seek(&mut self, song_id: u32, position_seconds: f64) -> PlayerResult<()> {
        self.simple(&format!("seekid {song_id} {position_seconds}"), "seekid").await
    }

    async fn play(&mut self) -> PlayerResult<()> {
        self.simple("play", "play").await
    }

    async fn pause(&mut self, paused: bool) -> PlayerResult<()> {
        self.simple(if paused { "pause 1" } else { "pause 0" }, "pause").await
    }

    async fn ping(&mut self) -> PlayerResult<()> {
        self.simple("ping", "ping").await
    }

    async fn disconnect(&mut self) -> PlayerResult<()> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };
        conn.settle().await?;
        // `close` has no reply
        conn.send("close", "close").await?;
        conn.stream.get_mut().shutdown().await?;
        tracing::info!("Disconnected from player daemon");
        Ok(())
    }
}
