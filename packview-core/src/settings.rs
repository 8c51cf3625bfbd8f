//! Persistent device settings
//!
//! Typed access to the settings records in flash. Reads and writes happen
//! in explicit sessions: [`Settings::reader`] opens the store read-only,
//! [`Settings::writer`] opens it read-write, and dropping the session
//! closes the store. Because a session borrows the accessor mutably, a
//! second session cannot be opened until the first is gone.

use heapless::String;
use packview_hal::{AccessMode, FlashError, FlashStorage, StorageKey};

/// Longest SSID, password or serial number in bytes
pub const TEXT_LEN: usize = 31;

/// Longest broker address in bytes
pub const BROKER_LEN: usize = 127;

/// Largest text record read back from flash
const RECORD_LEN: usize = 256;

/// Short text setting
pub type Text = String<TEXT_LEN>;

/// Broker address setting
pub type BrokerAddress = String<BROKER_LEN>;

/// How the device joins a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i8)]
pub enum ConnectionMode {
    /// Use the stored mode, falling back to access point
    #[default]
    FromDeviceOrAp = 0,
    /// Host an access point
    Ap = 1,
    /// Join an existing network
    Client = 2,
}

impl ConnectionMode {
    /// Decode a stored value; unknown codes fall back to the default
    pub fn from_i8(value: i8) -> Self {
        match value {
            1 => ConnectionMode::Ap,
            2 => ConnectionMode::Client,
            _ => ConnectionMode::FromDeviceOrAp,
        }
    }

    /// Stored representation
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Console name
    pub fn name(self) -> &'static str {
        match self {
            ConnectionMode::FromDeviceOrAp => "auto",
            ConnectionMode::Ap => "ap",
            ConnectionMode::Client => "client",
        }
    }

    /// Parse a console name or numeric code
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" | "0" => Some(ConnectionMode::FromDeviceOrAp),
            "ap" | "1" => Some(ConnectionMode::Ap),
            "client" | "2" => Some(ConnectionMode::Client),
            _ => None,
        }
    }
}

/// Errors from settings access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Underlying store failed
    Storage(FlashError),
    /// Value longer than the record allows
    TooLong,
    /// Stored bytes are not valid UTF-8 or have the wrong size
    Corrupted,
}

impl From<FlashError> for SettingsError {
    fn from(err: FlashError) -> Self {
        SettingsError::Storage(err)
    }
}

/// Settings accessor owning the backing store
pub struct Settings<S> {
    store: S,
}

impl<S: FlashStorage> Settings<S> {
    /// Wrap a store; no session is opened yet
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Open a read-only session
    pub fn reader(&mut self) -> Result<SettingsReader<'_, S>, SettingsError> {
        self.store.open(AccessMode::ReadOnly)?;
        Ok(SettingsReader {
            store: &mut self.store,
        })
    }

    /// Open a read-write session
    pub fn writer(&mut self) -> Result<SettingsWriter<'_, S>, SettingsError> {
        self.store.open(AccessMode::ReadWrite)?;
        Ok(SettingsWriter {
            store: &mut self.store,
        })
    }

    /// Release the backing store
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Read-only session; closes the store on drop
pub struct SettingsReader<'a, S: FlashStorage> {
    store: &'a mut S,
}

impl<S: FlashStorage> SettingsReader<'_, S> {
    /// Connection mode, default when unset
    pub async fn connection_mode(&mut self) -> Result<ConnectionMode, SettingsError> {
        read_mode(self.store).await
    }

    /// Network SSID
    pub async fn ssid(&mut self) -> Result<Option<Text>, SettingsError> {
        read_text(self.store, StorageKey::Ssid).await
    }

    /// Network password
    pub async fn password(&mut self) -> Result<Option<Text>, SettingsError> {
        read_text(self.store, StorageKey::Password).await
    }

    /// Factory serial number
    ///
    /// Provisioned outside this firmware, so a value longer than
    /// [`TEXT_LEN`] is cut at the last character that fits.
    pub async fn serial_number(&mut self) -> Result<Option<Text>, SettingsError> {
        let mut buf = [0u8; RECORD_LEN];
        let Some(text) = read_str(self.store, StorageKey::SerialNumber, &mut buf).await? else {
            return Ok(None);
        };
        let mut end = text.len().min(TEXT_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut value = String::new();
        value
            .push_str(&text[..end])
            .map_err(|_| SettingsError::Corrupted)?;
        Ok(Some(value))
    }

    /// Telemetry broker address
    pub async fn broker(&mut self) -> Result<Option<BrokerAddress>, SettingsError> {
        read_text(self.store, StorageKey::Broker).await
    }

    /// Boot counter, 0 when unset
    pub async fn boot_count(&mut self) -> Result<i32, SettingsError> {
        read_counter(self.store, StorageKey::Boots).await
    }

    /// Log counter, 0 when unset
    pub async fn log_count(&mut self) -> Result<i32, SettingsError> {
        read_counter(self.store, StorageKey::Logs).await
    }
}

impl<S: FlashStorage> Drop for SettingsReader<'_, S> {
    fn drop(&mut self) {
        self.store.close();
    }
}

/// Read-write session; closes the store on drop
///
/// Every setter commits before returning.
pub struct SettingsWriter<'a, S: FlashStorage> {
    store: &'a mut S,
}

impl<S: FlashStorage> SettingsWriter<'_, S> {
    /// Store the connection mode
    pub async fn set_connection_mode(&mut self, mode: ConnectionMode) -> Result<(), SettingsError> {
        let byte = mode.as_i8().to_le_bytes();
        self.store.write(StorageKey::ConnectionMode, &byte).await?;
        Ok(())
    }

    /// Store the network SSID
    pub async fn set_ssid(&mut self, ssid: &str) -> Result<(), SettingsError> {
        write_text(self.store, StorageKey::Ssid, ssid, TEXT_LEN).await
    }

    /// Store the network password
    pub async fn set_password(&mut self, password: &str) -> Result<(), SettingsError> {
        write_text(self.store, StorageKey::Password, password, TEXT_LEN).await
    }

    /// Store the telemetry broker address
    pub async fn set_broker(&mut self, broker: &str) -> Result<(), SettingsError> {
        write_text(self.store, StorageKey::Broker, broker, BROKER_LEN).await
    }

    /// Bump the boot counter and return the new value
    pub async fn increment_boot_count(&mut self) -> Result<i32, SettingsError> {
        increment(self.store, StorageKey::Boots).await
    }

    /// Bump the log counter and return the new value
    pub async fn increment_log_count(&mut self) -> Result<i32, SettingsError> {
        increment(self.store, StorageKey::Logs).await
    }
}

impl<S: FlashStorage> Drop for SettingsWriter<'_, S> {
    fn drop(&mut self) {
        self.store.close();
    }
}

async fn read_mode<S: FlashStorage>(store: &mut S) -> Result<ConnectionMode, SettingsError> {
    let mut buf = [0u8; 1];
    match store.read(StorageKey::ConnectionMode, &mut buf).await {
        Ok(1) => Ok(ConnectionMode::from_i8(i8::from_le_bytes(buf))),
        Ok(_) => Err(SettingsError::Corrupted),
        Err(FlashError::NotFound) => Ok(ConnectionMode::default()),
        Err(err) => Err(err.into()),
    }
}

async fn read_str<'b, S: FlashStorage>(
    store: &mut S,
    key: StorageKey,
    buf: &'b mut [u8],
) -> Result<Option<&'b str>, SettingsError> {
    let len = match store.read(key, buf).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let buf: &'b [u8] = buf;

    // Records written by older firmware carry a trailing NUL
    let bytes = match buf[..len].iter().position(|&b| b == 0) {
        Some(end) => &buf[..end],
        None => &buf[..len],
    };
    core::str::from_utf8(bytes)
        .map(Some)
        .map_err(|_| SettingsError::Corrupted)
}

async fn read_text<S: FlashStorage, const N: usize>(
    store: &mut S,
    key: StorageKey,
) -> Result<Option<String<N>>, SettingsError> {
    let mut buf = [0u8; RECORD_LEN];
    let Some(text) = read_str(store, key, &mut buf).await? else {
        return Ok(None);
    };

    let mut value = String::new();
    value.push_str(text).map_err(|_| SettingsError::Corrupted)?;
    Ok(Some(value))
}

async fn write_text<S: FlashStorage>(
    store: &mut S,
    key: StorageKey,
    value: &str,
    max_len: usize,
) -> Result<(), SettingsError> {
    if value.len() > max_len {
        return Err(SettingsError::TooLong);
    }
    store.write(key, value.as_bytes()).await?;
    Ok(())
}

async fn read_counter<S: FlashStorage>(store: &mut S, key: StorageKey) -> Result<i32, SettingsError> {
    let mut buf = [0u8; 4];
    match store.read(key, &mut buf).await {
        Ok(4) => Ok(i32::from_le_bytes(buf)),
        Ok(_) => Err(SettingsError::Corrupted),
        Err(FlashError::NotFound) => Ok(0),
        Err(err) => Err(err.into()),
    }
}

async fn increment<S: FlashStorage>(store: &mut S, key: StorageKey) -> Result<i32, SettingsError> {
    let current = read_counter(store, key).await?;
    let next = if current > 0 {
        current.checked_add(1).unwrap_or(1)
    } else {
        1
    };
    store.write(key, &next.to_le_bytes()).await?;
    Ok(next)
}
