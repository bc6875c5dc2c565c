//! Client connection handling: username negotiation, then concurrent
//! terminal/socket pumps.

use std::io::Write as _;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use shared::{ENTER_USERNAME, VALID};

/// A connected chat client.
pub struct ChatClient {
    stream: TcpStream,
}

impl ChatClient {
    /// Connects to the chat server. Resolution and connection failures
    /// are fatal for the client process.
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        info!("Connected to {host}:{port}");
        Ok(Self { stream })
    }

    /// Runs the client until the server closes the connection or the
    /// terminal input ends.
    pub async fn run(self) -> std::io::Result<()> {
        let (reader, mut writer) = self.stream.into_split();
        let mut server_lines = BufReader::new(reader).lines();
        let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

        // Username negotiation: the server re-prompts until it accepts.
        loop {
            match server_lines.next_line().await? {
                Some(line) if line == ENTER_USERNAME => {
                    print!("Please input a username: ");
                    std::io::stdout().flush()?;
                    let Some(input) = stdin_lines.next_line().await? else {
                        return Ok(());
                    };
                    writer
                        .write_all(format!("{}\n", input.trim()).as_bytes())
                        .await?;
                }
                Some(line) if line == VALID => break,
                Some(line) => println!("{line}"),
                None => {
                    warn!("server closed the connection during negotiation");
                    return Ok(());
                }
            }
        }

        // Active phase: either side ending stops the client. After the
        // user types LOGOUT the server says goodbye and closes, which
        // surfaces here as the server side ending.
        loop {
            tokio::select! {
                line = server_lines.next_line() => match line? {
                    Some(line) => println!("{line}"),
                    None => break,
                },
                line = stdin_lines.next_line() => match line? {
                    Some(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        writer.write_all(format!("{trimmed}\n").as_bytes()).await?;
                    }
                    None => break,
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn connect_to_a_listening_socket() {
        tokio_test::block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            let client = ChatClient::connect(&addr.ip().to_string(), addr.port()).await;
            assert!(client.is_ok());
        });
    }

    #[test]
    fn connect_to_unresolvable_host_fails() {
        tokio_test::block_on(async {
            // Reserved TLD, guaranteed not to resolve.
            let client = ChatClient::connect("host.invalid", 3000).await;
            assert!(client.is_err());
        });
    }
}
