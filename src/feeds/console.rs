use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::events::Event;

/// Map one console line to an event.
pub fn parse_command(line: &str) -> Option<Event> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => Some(Event::Refresh),
        "q" | "quit" | "exit" => Some(Event::Shutdown),
        _ => None,
    }
}

/// Spawns a task reading commands from stdin. EOF means shutdown.
pub fn spawn(tx: mpsc::Sender<Event>) {
    tokio::spawn(read_commands(BufReader::new(tokio::io::stdin()), tx));
}

async fn read_commands<R: AsyncBufRead + Unpin>(reader: R, tx: mpsc::Sender<Event>) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(event) => {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                None if line.trim().is_empty() => {}
                None => info!("[console] unknown command {:?} (try: refresh, quit)", line.trim()),
            },
            Ok(None) => break,
            Err(e) => {
                warn!("[console] read error: {}", e);
                break;
            }
        }
    }
    let _ = tx.send(Event::Shutdown).await;
}

/// Spawns a task that turns Ctrl+C into Shutdown.
pub fn spawn_ctrl_c(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Event::Shutdown).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("refresh"), Some(Event::Refresh));
        assert_eq!(parse_command("  R \n"), Some(Event::Refresh));
        assert_eq!(parse_command("QUIT"), Some(Event::Shutdown));
        assert_eq!(parse_command("hello"), None);
    }

    #[tokio::test]
    async fn test_read_commands_until_eof() {
        let (tx, mut rx) = mpsc::channel(8);
        let input: &[u8] = b"refresh\nnonsense\n\nq\n";
        read_commands(input, tx).await;

        assert_eq!(rx.recv().await, Some(Event::Refresh));
        assert_eq!(rx.recv().await, Some(Event::Shutdown));
        // EOF adds a trailing Shutdown
        assert_eq!(rx.recv().await, Some(Event::Shutdown));
        assert_eq!(rx.recv().await, None);
    }
}
