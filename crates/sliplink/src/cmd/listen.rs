use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_datagram, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_timeout = args.idle_timeout.as_deref().map(parse_duration).transpose()?;
    let links = args.links.open()?;
    let datagrams = links.set.register_channel();
    links.start_reading()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    tracing::info!(peers = ?links.set.peers(), "listening");

    let mut printed = 0usize;
    let mut last_activity = Instant::now();

    while running.load(Ordering::SeqCst) {
        let datagram = match datagrams.recv_timeout(POLL_INTERVAL) {
            Ok(datagram) => datagram,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(limit) = idle_timeout {
                    if last_activity.elapsed() >= limit {
                        return Err(CliError::new(
                            TIMEOUT,
                            format!("no datagram received within {limit:?}"),
                        ));
                    }
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        last_activity = Instant::now();
        printed = printed.saturating_add(1);
        print_datagram(&datagram, printed, format);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
