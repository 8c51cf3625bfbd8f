//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash.
//!
//! Implements the `FlashStorage` trait from `packview-hal`, including
//! read-only and read-write sessions.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use packview_hal::flash::{AccessMode, FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico-class boards
pub const SETTINGS_PARTITION_SIZE: usize = 64 * 1024; // 64KB for settings
pub const SETTINGS_PARTITION_START: usize = FLASH_SIZE - SETTINGS_PARTITION_SIZE;

/// Flash range for the settings partition
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one record plus its header and key
const ITEM_BUFFER_LEN: usize = 512;

/// RP2040 Flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    mode: Option<AccessMode>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance; no session is open
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            mode: None,
        }
    }

    fn require_open(&self) -> Result<(), FlashError> {
        self.mode.map(|_| ()).ok_or(FlashError::Closed)
    }

    fn require_writable(&self) -> Result<(), FlashError> {
        match self.mode {
            Some(AccessMode::ReadWrite) => Ok(()),
            Some(AccessMode::ReadOnly) => Err(FlashError::ReadOnly),
            None => Err(FlashError::Closed),
        }
    }
}

impl<'d> packview_hal::FlashStorage for Rp2040FlashStorage<'d> {
    fn open(&mut self, mode: AccessMode) -> Result<(), FlashError> {
        if self.mode.is_some() {
            return Err(FlashError::AlreadyOpen);
        }
        self.mode = Some(mode);
        Ok(())
    }

    fn close(&mut self) {
        self.mode = None;
    }

    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        self.require_open()?;
        let mut data_buffer = [0u8; ITEM_BUFFER_LEN];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(sequential_storage::Error::Corrupted { .. }) => Err(FlashError::Corrupted),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        self.require_writable()?;
        let mut data_buffer = [0u8; ITEM_BUFFER_LEN];

        map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|err| match err {
            sequential_storage::Error::FullStorage => FlashError::Full,
            _ => FlashError::Storage,
        })
    }
}
