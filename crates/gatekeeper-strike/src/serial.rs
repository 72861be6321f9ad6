//! Serial-attached strike controller.
//!
//! The controller is a microcontroller board on one of the host's serial
//! ports. Which port is not known in advance, so every port is queried:
//!
//! ```text
//! open port (9600 baud, 1 s timeout)
//! wait for the board to reset
//! -> 'Q'
//! <- "Arduino_Online\r\n"      adopt this port, close the others
//! ```
//!
//! Once adopted, firing the strike is a single `'1'` byte.
//!
//! The backend has two states: undiscovered (no link, every strike is a
//! logged no-op) and discovered (link cached for the process lifetime).
//! Only [`SerialStrike::rediscover`] moves from one to the other after
//! construction.

use crate::error::{Result, StrikeError};
use crate::traits::StrikeDevice;
use gatekeeper_core::constants::{
    CONTROLLER_BAUD_RATE, CONTROLLER_HANDSHAKE, CONTROLLER_QUERY, CONTROLLER_READ_TIMEOUT_MS,
    CONTROLLER_SETTLE_MS, CONTROLLER_STRIKE,
};
use serialport::SerialPort;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// An open, bidirectional serial connection.
pub trait SerialLink: Send {
    /// Write one byte and flush it.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Read one line, without its terminator.
    fn read_line(&mut self) -> io::Result<String>;

    /// Port name, for logs.
    fn port_name(&self) -> &str;
}

/// Source of candidate serial ports.
pub trait PortEnumerator: Send {
    /// Link type produced by [`PortEnumerator::open`].
    type Link: SerialLink;

    /// Names of all ports currently present.
    fn list(&self) -> Result<Vec<String>>;

    /// Open a port with the controller's line settings.
    fn open(&self, port: &str) -> Result<Self::Link>;
}

/// The host's serial ports, via `serialport`.
#[derive(Debug, Clone)]
pub struct SystemPorts {
    baud_rate: u32,
    timeout: Duration,
}

impl Default for SystemPorts {
    fn default() -> Self {
        Self {
            baud_rate: CONTROLLER_BAUD_RATE,
            timeout: Duration::from_millis(CONTROLLER_READ_TIMEOUT_MS),
        }
    }
}

impl PortEnumerator for SystemPorts {
    type Link = SystemLink;

    fn list(&self) -> Result<Vec<String>> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(&self, port: &str) -> Result<SystemLink> {
        let handle = serialport::new(port, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| StrikeError::serial(port, e.description))?;

        Ok(SystemLink {
            name: port.to_string(),
            port: BufReader::new(handle),
        })
    }
}

/// Serial port opened through `serialport`.
pub struct SystemLink {
    name: String,
    port: BufReader<Box<dyn SerialPort>>,
}

impl fmt::Debug for SystemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemLink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SerialLink for SystemLink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let port = self.port.get_mut();
        port.write_all(&[byte])?;
        port.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.port.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}

/// Query every port and return the first one that answers the handshake.
///
/// Ports that fail to open, stay silent, or answer anything else are
/// closed before the next one is tried. Scanning stops at the first match.
pub fn discover<E: PortEnumerator>(ports: &E, settle: Duration) -> Option<E::Link> {
    let names = match ports.list() {
        Ok(names) => names,
        Err(e) => {
            error!("Could not list serial ports: {}", e);
            return None;
        }
    };

    for name in names {
        let mut link = match ports.open(&name) {
            Ok(link) => link,
            Err(e) => {
                debug!("Skipping {}: {}", name, e);
                continue;
            }
        };

        // Opening the port resets the board.
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }

        if let Err(e) = link.write_byte(CONTROLLER_QUERY) {
            debug!("No query sent to {}: {}", name, e);
            continue;
        }

        match link.read_line() {
            Ok(reply) if reply == CONTROLLER_HANDSHAKE => {
                info!("Strike controller found on {}", name);
                return Some(link);
            }
            Ok(reply) => debug!("{} answered {:?}", name, reply),
            Err(e) => debug!("No handshake from {}: {}", name, e),
        }
    }

    error!("No strike controller found on any serial port");
    None
}

/// Strike fired through the serial controller.
///
/// # Examples
///
/// ```no_run
/// use gatekeeper_strike::{SerialStrike, StrikeDevice, SystemPorts};
///
/// # async fn example() -> gatekeeper_strike::Result<()> {
/// let settle = std::time::Duration::from_secs(2);
/// let mut strike = SerialStrike::spawn_discover(SystemPorts::default(), settle).await?;
/// if !strike.is_discovered() {
///     strike.rediscover();
/// }
/// strike.strike().await;
/// # Ok(())
/// # }
/// ```
pub struct SerialStrike<E: PortEnumerator = SystemPorts> {
    ports: E,
    link: Option<E::Link>,
    settle: Duration,
}

impl<E: PortEnumerator> fmt::Debug for SerialStrike<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStrike")
            .field("port", &self.link.as_ref().map(|l| l.port_name()))
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

impl<E: PortEnumerator> SerialStrike<E> {
    /// Scan `ports` with the controller's settle delay.
    ///
    /// Never fails: without a controller the strike is constructed in the
    /// undiscovered state.
    pub fn discover(ports: E) -> Self {
        Self::with_settle(ports, Duration::from_millis(CONTROLLER_SETTLE_MS))
    }

    /// Scan `ports` with a custom settle delay.
    pub fn with_settle(ports: E, settle: Duration) -> Self {
        let link = discover(&ports, settle);
        Self {
            ports,
            link,
            settle,
        }
    }

    /// Whether a controller link is cached.
    pub fn is_discovered(&self) -> bool {
        self.link.is_some()
    }

    /// Port of the cached controller link.
    pub fn port_name(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.port_name())
    }

    /// Drop the cached link and scan all ports again.
    ///
    /// Returns whether a controller was found.
    pub fn rediscover(&mut self) -> bool {
        info!("Rediscovering strike controller");
        self.link = None;
        self.link = discover(&self.ports, self.settle);
        self.link.is_some()
    }
}

impl<E> SerialStrike<E>
where
    E: PortEnumerator + 'static,
    E::Link: 'static,
{
    /// [`SerialStrike::with_settle`] on the blocking pool.
    ///
    /// Scanning sleeps through every board reset and waits on read timeouts,
    /// which must not stall the async workers.
    ///
    /// # Errors
    ///
    /// Returns a serial error if the scan task panics or is cancelled.
    pub async fn spawn_discover(ports: E, settle: Duration) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::with_settle(ports, settle))
            .await
            .map_err(|e| StrikeError::serial("<discovery>", e.to_string()))
    }
}

impl<E: PortEnumerator> StrikeDevice for SerialStrike<E> {
    async fn strike(&mut self) {
        let Some(link) = self.link.as_mut() else {
            warn!("Strike not sent; controller not available.");
            return;
        };

        match link.write_byte(CONTROLLER_STRIKE) {
            Ok(()) => debug!("Strike sent on {}", link.port_name()),
            Err(e) => error!("Strike not sent on {}: {}", link.port_name(), e),
        }
    }

    fn name(&self) -> &str {
        "serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum Reply {
        Line(&'static str),
        Silent,
        Unopenable,
    }

    #[derive(Default)]
    struct Wire {
        opened: Vec<String>,
        closed: Vec<String>,
        written: Vec<(String, u8)>,
        fail_writes: bool,
    }

    struct FakePorts {
        ports: Vec<(&'static str, Reply)>,
        wire: Arc<Mutex<Wire>>,
    }

    impl FakePorts {
        fn new(ports: Vec<(&'static str, Reply)>) -> (Self, Arc<Mutex<Wire>>) {
            let wire = Arc::new(Mutex::new(Wire::default()));
            (
                Self {
                    ports,
                    wire: wire.clone(),
                },
                wire,
            )
        }
    }

    struct FakeLink {
        name: String,
        reply: Reply,
        wire: Arc<Mutex<Wire>>,
    }

    impl Drop for FakeLink {
        fn drop(&mut self) {
            self.wire.lock().unwrap().closed.push(self.name.clone());
        }
    }

    impl SerialLink for FakeLink {
        fn write_byte(&mut self, byte: u8) -> io::Result<()> {
            let mut wire = self.wire.lock().unwrap();
            if wire.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            wire.written.push((self.name.clone(), byte));
            Ok(())
        }

        fn read_line(&mut self) -> io::Result<String> {
            match self.reply {
                Reply::Line(line) => Ok(line.to_string()),
                _ => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
            }
        }

        fn port_name(&self) -> &str {
            &self.name
        }
    }

    impl PortEnumerator for FakePorts {
        type Link = FakeLink;

        fn list(&self) -> Result<Vec<String>> {
            Ok(self.ports.iter().map(|(n, _)| n.to_string()).collect())
        }

        fn open(&self, port: &str) -> Result<FakeLink> {
            let (_, reply) = self
                .ports
                .iter()
                .find(|(n, _)| *n == port)
                .ok_or_else(|| StrikeError::serial(port, "no such port"))?;
            if matches!(reply, Reply::Unopenable) {
                return Err(StrikeError::serial(port, "busy"));
            }
            self.wire.lock().unwrap().opened.push(port.to_string());
            Ok(FakeLink {
                name: port.to_string(),
                reply: reply.clone(),
                wire: self.wire.clone(),
            })
        }
    }

    fn strike_with(ports: Vec<(&'static str, Reply)>) -> (SerialStrike<FakePorts>, Arc<Mutex<Wire>>) {
        let (ports, wire) = FakePorts::new(ports);
        (SerialStrike::with_settle(ports, Duration::ZERO), wire)
    }

    #[test]
    fn test_discovery_selects_handshake_port() {
        let (strike, wire) = strike_with(vec![
            ("/dev/ttyS0", Reply::Silent),
            ("/dev/ttyUSB0", Reply::Line("garbage")),
            ("/dev/ttyS1", Reply::Unopenable),
            ("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE)),
        ]);

        assert!(strike.is_discovered());
        assert_eq!(strike.port_name(), Some("/dev/ttyACM0"));

        let wire = wire.lock().unwrap();
        assert_eq!(wire.opened, ["/dev/ttyS0", "/dev/ttyUSB0", "/dev/ttyACM0"]);
        assert_eq!(wire.closed, ["/dev/ttyS0", "/dev/ttyUSB0"]);
        assert!(wire.written.iter().all(|(_, b)| *b == CONTROLLER_QUERY));
    }

    #[test]
    fn test_discovery_stops_at_first_match() {
        let (strike, wire) = strike_with(vec![
            ("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE)),
            ("/dev/ttyACM1", Reply::Line(CONTROLLER_HANDSHAKE)),
        ]);

        assert_eq!(strike.port_name(), Some("/dev/ttyACM0"));
        assert_eq!(wire.lock().unwrap().opened, ["/dev/ttyACM0"]);
    }

    #[test]
    fn test_handshake_must_match_exactly() {
        let (strike, _wire) = strike_with(vec![
            ("/dev/ttyACM0", Reply::Line("Arduino_Online!")),
            ("/dev/ttyACM1", Reply::Line("arduino_online")),
        ]);

        assert!(!strike.is_discovered());
    }

    #[tokio::test]
    async fn test_strike_without_controller_is_noop() {
        let (mut strike, wire) = strike_with(vec![("/dev/ttyS0", Reply::Silent)]);
        assert!(!strike.is_discovered());

        strike.strike().await;
        strike.strike().await;

        let wire = wire.lock().unwrap();
        assert_eq!(wire.opened.len(), 1, "no automatic rediscovery");
        assert!(
            !wire
                .written
                .iter()
                .any(|(_, b)| *b == CONTROLLER_STRIKE)
        );
    }

    #[tokio::test]
    async fn test_strike_writes_command_byte() {
        let (mut strike, wire) =
            strike_with(vec![("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE))]);

        strike.strike().await;

        let wire = wire.lock().unwrap();
        assert_eq!(
            wire.written.last(),
            Some(&("/dev/ttyACM0".to_string(), CONTROLLER_STRIKE))
        );
    }

    #[tokio::test]
    async fn test_write_error_keeps_link() {
        let (mut strike, wire) =
            strike_with(vec![("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE))]);
        wire.lock().unwrap().fail_writes = true;

        strike.strike().await;

        assert!(strike.is_discovered());
        assert!(wire.lock().unwrap().closed.is_empty());
    }

    #[test]
    fn test_rediscover_replaces_link() {
        let (mut strike, wire) =
            strike_with(vec![("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE))]);

        assert!(strike.rediscover());

        let wire = wire.lock().unwrap();
        assert_eq!(wire.opened, ["/dev/ttyACM0", "/dev/ttyACM0"]);
        assert_eq!(wire.closed, ["/dev/ttyACM0"]);
    }

    #[tokio::test]
    async fn test_discovery_runs_off_the_runtime() {
        let (ports, _wire) = FakePorts::new(vec![("/dev/ttyACM0", Reply::Line(CONTROLLER_HANDSHAKE))]);
        let ticker = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            std::time::Instant::now()
        });

        let strike = SerialStrike::spawn_discover(ports, Duration::from_millis(200))
            .await
            .unwrap();
        let done = std::time::Instant::now();

        // The ticker only finishes early if the settle sleep left the runtime free.
        let ticked = ticker.await.unwrap();
        assert!(ticked < done);
        assert_eq!(strike.port_name(), Some("/dev/ttyACM0"));
    }

    #[test]
    fn test_no_ports() {
        let (strike, _wire) = strike_with(Vec::new());
        assert!(!strike.is_discovered());
        assert_eq!(strike.port_name(), None);
    }
}
