//! Resident request loop for the native host.
//!
//! Each input line is a JSON array holding the positional arguments of one
//! call, exactly as a JS caller would pass them to `run_starlark_code`:
//!
//! ```text
//! ["def main(x):\n    return x * 2\n", "main", 21]
//! ```
//!
//! Every line gets one envelope line back.  Invocations run on tokio's
//! blocking pool, so a slow script does not hold up reading; a single writer
//! task awaits the results in submission order, so responses come back in
//! request order.
//!
//! ```text
//!   stdin lines ──► spawn_blocking(gateway.run) ──► mpsc<JoinHandle> ──► writer ──► stdout
//! ```

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::gateway::{Gateway, Outcome};
use crate::value::HostValue;

/// Invocations allowed in flight before reading pauses.
const QUEUE_DEPTH: usize = 64;

/// Answer one request line.
pub fn handle_line(gateway: &Gateway, line: &str) -> Outcome {
    match serde_json::from_str::<Vec<HostValue>>(line) {
        Ok(args) => gateway.run(args),
        Err(e) => Outcome::Failure { error: format!("request must be a JSON array of arguments: {e}") },
    }
}

/// Read requests from `input` until EOF, writing one envelope line per
/// request to `output`.  Blank lines are skipped; a line that is not UTF-8
/// gets an error envelope like any other malformed request.  Returns the
/// writer once every response has been flushed.
pub async fn serve<R, W>(gateway: Arc<Gateway>, input: R, output: W) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<JoinHandle<Outcome>>(QUEUE_DEPTH);

    let writer = tokio::spawn(async move {
        let mut output = output;
        let mut answered = 0usize;
        while let Some(handle) = rx.recv().await {
            let outcome = handle
                .await
                .unwrap_or_else(|e| Outcome::Failure { error: format!("invocation aborted: {e}") });
            let mut line = serde_json::to_string(&outcome)?;
            line.push('\n');
            output.write_all(line.as_bytes()).await?;
            output.flush().await?;
            answered += 1;
        }
        log::debug!("serve: answered {answered} request(s)");
        Ok::<_, io::Error>(output)
    });

    let mut input = input;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let request = match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => Ok(line),
            Err(e) => Err(format!("request is not valid UTF-8: {e}")),
        };
        let gateway = Arc::clone(&gateway);
        let handle = tokio::task::spawn_blocking(move || match request {
            Ok(line) => handle_line(&gateway, &line),
            Err(error) => Outcome::Failure { error },
        });
        if tx.send(handle).await.is_err() {
            // Writer failed; its error is reported below.
            break;
        }
    }
    drop(tx);

    writer.await.map_err(io::Error::other)?
}

// ── Tests ─────────────────────────────────────────────────────────────────────
