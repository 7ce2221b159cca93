use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StreamEndpoint;

/// Open a serial device (or PTY) read/write as a [`StreamEndpoint`].
///
/// Terminals are switched to raw mode so that the line discipline passes every
/// byte through untouched. Non-terminal paths (FIFOs, regular files) are used
/// as they are.
pub fn open_serial(path: impl AsRef<Path>) -> Result<StreamEndpoint> {
    let path = path.as_ref();
    let open_err = |source| TransportError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = open_options().open(path).map_err(open_err)?;
    configure_raw(&file).map_err(open_err)?;
    let reader = file.try_clone().map_err(open_err)?;

    info!(path = %path.display(), "opened serial line");
    Ok(StreamEndpoint::new(path.display().to_string(), reader, file))
}

#[cfg(unix)]
fn open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.read(true).write(true).custom_flags(libc::O_NOCTTY);
    options
}

#[cfg(not(unix))]
fn open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true).write(true);
    options
}

#[cfg(unix)]
fn configure_raw(file: &File) -> std::io::Result<()> {
    use std::os::fd::AsRawFd;

    let fd = file.as_raw_fd();

    // SAFETY: `fd` is an open descriptor owned by `file` for the whole call.
    if unsafe { libc::isatty(fd) } != 1 {
        debug!(fd, "not a terminal, leaving line discipline alone");
        return Ok(());
    }

    // SAFETY: `termios` is a plain C struct; an all-zero value is a valid
    // out-parameter that `tcgetattr` fully overwrites on success.
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open terminal descriptor and `termios` is a valid
    // writable pointer for the duration of the call.
    if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // SAFETY: `termios` was initialized by `tcgetattr` above.
    unsafe { libc::cfmakeraw(&mut termios) };

    // SAFETY: same descriptor, and `termios` is a valid readable pointer.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_raw(_file: &File) -> std::io::Result<()> {
    Ok(())
}
