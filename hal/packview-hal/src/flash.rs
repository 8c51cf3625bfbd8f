//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.
//!
//! Access is session based: a store is opened read-only or read-write,
//! used, then closed before it is reopened in the other mode.

/// Storage keys for persisted settings
///
/// Each key maps to one record. The actual storage implementation
/// handles wear leveling and data integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Network connection mode (one byte, signed)
    ConnectionMode = 0,
    /// Network SSID (UTF-8)
    Ssid = 1,
    /// Network password (UTF-8)
    Password = 2,
    /// Factory serial number (UTF-8, provisioned externally)
    SerialNumber = 3,
    /// Telemetry broker address (UTF-8)
    Broker = 4,
    /// Boot counter (i32, little endian)
    Boots = 5,
    /// Log counter (i32, little endian)
    Logs = 6,
}

impl StorageKey {
    /// All keys, in storage order
    pub const ALL: [StorageKey; 7] = [
        StorageKey::ConnectionMode,
        StorageKey::Ssid,
        StorageKey::Password,
        StorageKey::SerialNumber,
        StorageKey::Broker,
        StorageKey::Boots,
        StorageKey::Logs,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Human readable record name
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::ConnectionMode => "Settings.SsMode",
            StorageKey::Ssid => "Settings.SsId",
            StorageKey::Password => "Settings.SsPwd",
            StorageKey::SerialNumber => "SerialNumber",
            StorageKey::Broker => "Settings.Mqtt",
            StorageKey::Boots => "Settings.Boots",
            StorageKey::Logs => "Settings.Logs",
        }
    }
}

/// Session access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    /// Reads only; writes are rejected
    ReadOnly,
    /// Reads and writes
    ReadWrite,
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
    /// No session is open
    Closed,
    /// A session is already open
    AlreadyOpen,
    /// Write attempted in a read-only session
    ReadOnly,
}

/// Flash storage trait
///
/// Provides wear-leveled key-value storage for settings.
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Data integrity (CRC or similar)
/// - Commit of each write before returning
pub trait FlashStorage {
    /// Open a session
    fn open(&mut self, mode: AccessMode) -> Result<(), FlashError>;

    /// Close the current session; closing a closed store is a no-op
    fn close(&mut self);

    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write and commit a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
