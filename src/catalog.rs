//! Image lookup on removable storage
//!
//! Image files are raw frames: `cols / 2 * rows` bytes of packed scanlines with
//! an `.acp` extension. The [`ImageCatalog`] walks the root directory of a
//! [`Volume`] and picks the n-th eligible file in listing order.
//!
//! ## Example
//!
//! ```
//! use core::ops::ControlFlow;
//! use acep_calendar::catalog::{DirEntry, ImageCatalog, Lookup, Volume};
//! use acep_calendar::Dimensions;
//!
//! struct Card;
//!
//! impl Volume for Card {
//!     type Error = embedded_io::ErrorKind;
//!     type File = &'static [u8];
//!
//!     fn is_present(&mut self) -> bool {
//!         true
//!     }
//!
//!     fn for_each_entry<F>(&mut self, mut visit: F) -> Result<(), Self::Error>
//!     where
//!         F: FnMut(&DirEntry<'_>) -> ControlFlow<()>,
//!     {
//!         let _ = visit(&DirEntry { name: "CAT.ACP", size: 134_400, is_dir: false });
//!         Ok(())
//!     }
//!
//!     fn open(&mut self, _path: &str) -> Result<Self::File, Self::Error> {
//!         Err(embedded_io::ErrorKind::NotFound)
//!     }
//! }
//!
//! let catalog = ImageCatalog::new(&Dimensions::ACEP_5IN65);
//! let lookup = catalog.find_nth(&mut Card, 3).unwrap();
//! assert!(matches!(lookup, Lookup::Wrapped { .. }));
//! assert_eq!(lookup.path(), "CAT.ACP");
//! ```

use core::ops::ControlFlow;

use embedded_io::{Error as _, Read};
use log::{debug, warn};

use crate::config::Dimensions;
use crate::error::CatalogError;

/// Longest file path the catalog keeps
pub const MAX_PATH_LEN: usize = 64;

/// Bounded file path
pub type ImagePath = heapless::String<MAX_PATH_LEN>;

/// Required image file extension, without the dot
pub const IMAGE_EXTENSION: &str = "acp";

/// One directory entry as listed by a [`Volume`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirEntry<'a> {
    /// File name, usable as a path for [`Volume::open`]
    pub name: &'a str,
    /// Size in bytes
    pub size: u64,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Removable storage holding image files
///
/// Implement this over the filesystem crate of your board. The panel and the
/// card may share an SPI bus; implementations must leave the card deselected
/// when a call returns.
pub trait Volume {
    /// Storage error
    type Error: embedded_io::Error;

    /// Open file, read sequentially from the start
    type File: Read;

    /// Card detect
    fn is_present(&mut self) -> bool;

    /// Visit the root directory entries in listing order
    ///
    /// Stops early when `visit` returns [`ControlFlow::Break`].
    fn for_each_entry<F>(&mut self, visit: F) -> Result<(), Self::Error>
    where
        F: FnMut(&DirEntry<'_>) -> ControlFlow<()>;

    /// Open a file for reading
    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error>;
}

/// Result of an image lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The requested image exists
    Found {
        /// Requested index
        index: usize,
        /// Path of the image
        path: ImagePath,
    },
    /// Fewer eligible images than requested: the first one is returned
    Wrapped {
        /// Path of the first eligible image
        path: ImagePath,
    },
}

impl Lookup {
    /// Path to open, whether found or wrapped
    pub fn path(&self) -> &str {
        match self {
            Self::Found { path, .. } | Self::Wrapped { path } => path.as_str(),
        }
    }

    /// Whether the requested index exists
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Selects image files by size and extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageCatalog {
    image_len: u64,
}

impl ImageCatalog {
    /// Catalog of full-frame images for a panel of `dimensions`
    pub fn new(dimensions: &Dimensions) -> Self {
        Self {
            image_len: dimensions.frame_len() as u64,
        }
    }

    /// Exact file size an image must have
    pub fn image_len(&self) -> u64 {
        self.image_len
    }

    /// Whether `entry` is a displayable image
    pub fn is_eligible(&self, entry: &DirEntry<'_>) -> bool {
        !entry.is_dir && entry.size == self.image_len && has_image_extension(entry.name)
    }

    /// Find the `index`-th eligible image, counting from zero
    ///
    /// When the directory holds `index` or fewer eligible images, the first
    /// one is returned as [`Lookup::Wrapped`] so callers can start over.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::MediaAbsent`] - no card inserted
    /// * [`CatalogError::NoEligibleAsset`] - no file qualifies
    /// * [`CatalogError::Io`] - the directory could not be listed
    pub fn find_nth<V: Volume>(
        &self,
        volume: &mut V,
        index: usize,
    ) -> Result<Lookup, CatalogError> {
        if !volume.is_present() {
            return Err(CatalogError::MediaAbsent);
        }

        let mut first: Option<ImagePath> = None;
        let mut found: Option<ImagePath> = None;
        let mut seen = 0usize;

        volume
            .for_each_entry(|entry| {
                if !self.is_eligible(entry) {
                    return ControlFlow::Continue(());
                }
                let mut path = ImagePath::new();
                if path.push_str(entry.name).is_err() {
                    warn!("catalog: skipping {} (path too long)", entry.name);
                    return ControlFlow::Continue(());
                }
                if seen == index {
                    found = Some(path);
                    return ControlFlow::Break(());
                }
                if first.is_none() {
                    first = Some(path);
                }
                seen += 1;
                ControlFlow::Continue(())
            })
            .map_err(|e| CatalogError::Io(e.kind()))?;

        if let Some(path) = found {
            debug!("catalog: image {} is {}", index, path.as_str());
            return Ok(Lookup::Found { index, path });
        }
        match first {
            Some(path) => {
                warn!(
                    "catalog: only {} images, wrapping to {}",
                    seen,
                    path.as_str()
                );
                Ok(Lookup::Wrapped { path })
            }
            None => Err(CatalogError::NoEligibleAsset),
        }
    }
}

/// Case-insensitive `.acp` suffix check
fn has_image_extension(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty() && ext.eq_ignore_ascii_case(IMAGE_EXTENSION)
}

/// A host directory used as a [`Volume`]
#[cfg(feature = "std")]
pub mod dir {
    use core::ops::ControlFlow;
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    use super::{DirEntry, Volume};

    /// Directory on the host filesystem
    #[derive(Clone, Debug)]
    pub struct DirVolume {
        root: PathBuf,
    }

    impl DirVolume {
        /// Use `root` as the card's root directory
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }
    }

    /// File opened from a [`DirVolume`]
    #[derive(Debug)]
    pub struct DirFile(fs::File);

    impl embedded_io::ErrorType for DirFile {
        type Error = io::Error;
    }

    impl embedded_io::Read for DirFile {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            io::Read::read(&mut self.0, buf)
        }
    }

    impl Volume for DirVolume {
        type Error = io::Error;
        type File = DirFile;

        fn is_present(&mut self) -> bool {
            self.root.is_dir()
        }

        fn for_each_entry<F>(&mut self, mut visit: F) -> Result<(), Self::Error>
        where
            F: FnMut(&DirEntry<'_>) -> ControlFlow<()>,
        {
            for entry in fs::read_dir(&self.root)? {
                let entry = entry?;
                let metadata = entry.metadata()?;
                let name = entry.file_name();
                // Names that are not UTF-8 can never match the extension
                let Some(name) = name.to_str() else {
                    continue;
                };
                let entry = DirEntry {
                    name,
                    size: metadata.len(),
                    is_dir: metadata.is_dir(),
                };
                if visit(&entry).is_break() {
                    break;
                }
            }
            Ok(())
        }

        fn open(&mut self, path: &str) -> Result<Self::File, Self::Error> {
            fs::File::open(self.root.join(path)).map(DirFile)
        }
    }

}
