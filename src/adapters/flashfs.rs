//! Flash filesystem adapter.
//!
//! Implements [`LogMedium`] for the persisted reading history and serves
//! the static web assets. ESP-IDF exposes SPIFFS through the standard VFS,
//! so both targets go through `std::fs`; only the mount differs:
//!
//! - **`target_os = "espidf"`** — registers the SPIFFS partition at
//!   `/spiffs` (formatting it when the mount fails).
//! - **all other targets** — any plain directory, for host tests.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{LogMedium, StorageError};
use crate::history::LOGFILE_NAME;

#[derive(Clone)]
pub struct FlashFs {
    base: PathBuf,
}

impl FlashFs {
    /// Mount the SPIFFS partition and root the adapter at it.
    #[cfg(target_os = "espidf")]
    pub fn mount() -> Result<Self, StorageError> {
        use esp_idf_svc::sys::*;

        let base_path = c"/spiffs";
        let conf = esp_vfs_spiffs_conf_t {
            base_path: base_path.as_ptr(),
            partition_label: core::ptr::null(),
            max_files: 4,
            format_if_mount_failed: true,
        };
        // SAFETY: called once from the main task before any file access.
        let ret = unsafe { esp_vfs_spiffs_register(&conf) };
        if ret != ESP_OK {
            return Err(StorageError::IoError);
        }
        info!("FlashFs: SPIFFS mounted at /spiffs");
        Ok(Self {
            base: PathBuf::from("/spiffs"),
        })
    }

    /// Root the adapter at an existing directory (host tests/simulation).
    #[cfg(not(target_os = "espidf"))]
    pub fn mount_at(base: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base = base.into();
        fs::create_dir_all(&base).map_err(|_| StorageError::IoError)?;
        info!("FlashFs: rooted at {}", base.display());
        Ok(Self { base })
    }

    fn logfile_path(&self) -> PathBuf {
        self.base.join(LOGFILE_NAME)
    }

    /// Read a stored web asset by its request path (e.g. `/index.html`).
    pub fn read_asset(&self, path: &str) -> Option<Vec<u8>> {
        fs::read(self.base.join(path.trim_start_matches('/'))).ok()
    }
}

impl LogMedium for FlashFs {
    type Writer = File;

    fn replace(&mut self) -> Result<File, StorageError> {
        // Erase-then-create: the old document is gone before the new one
        // starts. A power cut in between loses the history, which boot-time
        // restore answers with nominal re-initialisation.
        let path = self.logfile_path();
        if path.exists() {
            let _ = fs::remove_file(&path);
        }
        File::create(&path).map_err(|_| StorageError::IoError)
    }

    fn load(&self) -> Result<String, StorageError> {
        match fs::read_to_string(self.logfile_path()) {
            Ok(document) => Ok(document),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(_) => Err(StorageError::IoError),
        }
    }
}
