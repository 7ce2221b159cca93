use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{PhysicalEndpoint, RawReceiver};

const READ_CHUNK_SIZE: usize = 8 * 1024;

type SharedReceiver = Arc<Mutex<Option<RawReceiver>>>;

/// Endpoint over any blocking `Read` + `Write` pair.
///
/// Writes happen in the caller's thread, one `send` at a time. Reads happen on
/// a dedicated thread started by [`start`](StreamEndpoint::start); chunks read
/// while no receiver is registered are dropped, so register first. The reader
/// thread stops at EOF or on the first unrecoverable read error.
pub struct StreamEndpoint {
    name: String,
    writer: Mutex<Box<dyn Write + Send>>,
    reader: Mutex<Option<Box<dyn Read + Send>>>,
    receiver: SharedReceiver,
    reader_thread: Mutex<Option<JoinHandle<()>>>,
}

impl StreamEndpoint {
    /// Wrap a reader and writer for the same line. `name` labels log records
    /// and the reader thread.
    pub fn new<R, W>(name: impl Into<String>, reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            name: name.into(),
            writer: Mutex::new(Box::new(writer)),
            reader: Mutex::new(Some(Box::new(reader))),
            receiver: Arc::new(Mutex::new(None)),
            reader_thread: Mutex::new(None),
        }
    }

    /// Label used for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the reader thread has been started and has not yet exited.
    pub fn is_reading(&self) -> bool {
        lock(&self.reader_thread)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the reader thread. Later calls do nothing.
    pub fn start(&self) -> Result<()> {
        let Some(reader) = lock(&self.reader).take() else {
            return Ok(());
        };
        let receiver = Arc::clone(&self.receiver);
        let name = self.name.clone();

        let handle = std::thread::Builder::new()
            .name(format!("sliplink-rx-{}", self.name))
            .spawn(move || read_loop(&name, reader, &receiver))?;
        *lock(&self.reader_thread) = Some(handle);
        debug!(endpoint = %self.name, "reader started");
        Ok(())
    }
}

impl PhysicalEndpoint for StreamEndpoint {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = lock(&self.writer);
        writer.write_all(bytes).map_err(map_write_error)?;
        writer.flush().map_err(map_write_error)?;
        trace!(endpoint = %self.name, size = bytes.len(), "wrote bytes");
        Ok(())
    }

    fn register_receiver(&self, receiver: RawReceiver) {
        *lock(&self.receiver) = Some(receiver);
    }
}

impl std::fmt::Debug for StreamEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEndpoint")
            .field("name", &self.name)
            .field("reading", &self.is_reading())
            .finish()
    }
}

fn read_loop(name: &str, mut reader: Box<dyn Read + Send>, receiver: &SharedReceiver) {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(endpoint = %name, error = %err, "read failed, stopping reader");
                return;
            }
        };

        if read == 0 {
            debug!(endpoint = %name, "end of stream, stopping reader");
            return;
        }

        match lock(receiver).as_mut() {
            Some(deliver) => deliver(&chunk[..read]),
            None => trace!(endpoint = %name, size = read, "no receiver registered, dropping chunk"),
        }
    }
}

fn map_write_error(err: std::io::Error) -> TransportError {
    match err.kind() {
        ErrorKind::BrokenPipe | ErrorKind::WriteZero => TransportError::Closed,
        _ => TransportError::Io(err),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
