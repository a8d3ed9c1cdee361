use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::mpsc,
    time::{Duration, timeout},
};

use super::router::route_command;
use crate::core::tracker_msg::TrackerMsg;
use crate::{tdebug, terror};

/// Accepts connections on the instance socket, one task per client.
pub fn spawn_ipc_server(listener: UnixListener, tx: mpsc::Sender<TrackerMsg>) {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _addr)) => {
                    let tx = tx.clone();

                    tokio::spawn(async move {
                        let result = timeout(Duration::from_secs(5), async {
                            if let Err(e) = handle_connection(&mut stream, &tx).await {
                                terror!("Ipc", "error handling IPC connection: {}", e);
                            }
                        })
                        .await;

                        if result.is_err() {
                            terror!("Ipc", "IPC connection timed out after 5 seconds");
                        }

                        let _ = stream.shutdown().await;
                    });
                }
                Err(e) => terror!("Ipc", "failed to accept IPC connection: {}", e),
            }
        }
    });
}

async fn handle_connection(
    stream: &mut UnixStream,
    tx: &mpsc::Sender<TrackerMsg>,
) -> std::io::Result<()> {
    let mut buf = vec![0u8; 256];
    let n = stream.read(&mut buf).await?;

    if n == 0 {
        return Ok(());
    }

    let cmd = String::from_utf8_lossy(&buf[..n]).trim().to_string();
    tdebug!("Ipc", "received IPC command: {}", cmd);

    let response = route_command(&cmd, tx).await;

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
