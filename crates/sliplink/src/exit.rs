use std::fmt;
use std::io;

use sliplink_link::LinkError;
use sliplink_transport::TransportError;

// sysexits-flavoured exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const ROUTE_NOT_FOUND: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => TRANSPORT_ERROR,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { path, source } => CliError::new(
            io_code(source.kind()),
            format!("{context}: {}: {source}", path.display()),
        ),
        TransportError::Io(source) => io_error(context, source),
        TransportError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
    }
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    match err {
        LinkError::RouteNotFound(_) => CliError::new(ROUTE_NOT_FOUND, format!("{context}: {err}")),
        LinkError::Transport(err) => transport_error(context, err),
        LinkError::ReceiverClosed => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sliplink_link::PeerAddress;

    #[test]
    fn route_not_found_has_dedicated_code() {
        let err = link_error(
            "send failed",
            LinkError::RouteNotFound(PeerAddress::from("10.0.0.9")),
        );
        assert_eq!(err.code, ROUTE_NOT_FOUND);
        assert_eq!(err.message, "send failed: no route to 10.0.0.9");
    }

    #[test]
    fn open_permission_denied_maps_to_permission_code() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyS0".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
        assert!(err.message.contains("/dev/ttyS0"));
    }

    #[test]
    fn closed_endpoint_is_transport_error() {
        let err = link_error("send failed", LinkError::Transport(TransportError::Closed));
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
