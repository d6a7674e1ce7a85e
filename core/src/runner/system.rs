use std::process::Stdio;

use huntr_common::process::Invocation;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use super::{ProcessHandle, ProcessRunner};

/// Runs invocations as real child processes on the tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn start(&self, invocation: &Invocation) -> ProcessHandle {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(program = %invocation.program, "spawn failed: {e}");
                return ProcessHandle::launch_failure(e.to_string());
            }
        };
        debug!(pid = ?child.id(), "started `{invocation}`");

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (err_tx, err_rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(stdout, out_tx));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(stderr, err_tx));
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit_rx) = oneshot::channel();
        let program = invocation.program.clone();

        tokio::spawn(async move {
            // A dropped handle counts as a kill request.
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_rx => {
                    trace!(%program, "killing");
                    if let Err(e) = child.start_kill() {
                        debug!(%program, "kill failed: {e}");
                    }
                    child.wait().await
                }
            };

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    debug!(%program, "wait failed: {e}");
                    None
                }
            };
            debug!(%program, ?code, "exited");
            let _ = exit_tx.send(code);
        });

        ProcessHandle::new(out_rx, err_rx, kill_tx, exit_rx)
    }
}

/// Forwards every line of `reader` until EOF. Invalid UTF-8 is replaced
/// rather than dropped.
async fn pump<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("read failed: {e}");
                break;
            }
        }
    }
}
