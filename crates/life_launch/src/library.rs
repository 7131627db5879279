use log::{debug, info};
use std::{
    ffi::{CString, c_void},
    fmt,
    path::{Path, PathBuf},
    ptr::NonNull,
};

use crate::error::{LaunchError, Result};

/// Platform file name for a library identifier, the way `loadLibrary` maps it.
pub fn library_file_name(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{name}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{name}.dylib")
    } else {
        format!("lib{name}.so")
    }
}

/// Where the engine library comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Bare identifier, mapped through [`library_file_name`] and searched for.
    Name(String),
    /// Exact path handed to the dynamic loader as-is.
    Path(PathBuf),
}

impl LibrarySource {
    /// Candidates in the order they are tried. Search directories come first, then the bare
    /// file name so the platform's default search rules get the last word.
    pub fn candidates(&self, search_paths: &[PathBuf]) -> Vec<PathBuf> {
        match self {
            LibrarySource::Path(path) => vec![path.clone()],
            LibrarySource::Name(name) => {
                let file_name = library_file_name(name);
                search_paths
                    .iter()
                    .map(|dir| dir.join(&file_name))
                    .chain(std::iter::once(PathBuf::from(&file_name)))
                    .collect()
            }
        }
    }
}

impl fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySource::Name(name) => write!(f, "{name}"),
            LibrarySource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(unix)]
fn last_dl_error() -> String {
    // SAFETY: trivially safe.
    let error = unsafe { libc::dlerror() };
    if error.is_null() {
        return "unknown dynamic loader error".to_string();
    }
    // SAFETY: `error` is a pointer to a valid C string returned by `dlerror()`.
    unsafe { std::ffi::CStr::from_ptr(error) }
        .to_string_lossy()
        .into_owned()
}

/// A library loaded into the memory space of the process.
pub struct LoadedLibrary {
    handle: NonNull<c_void>,
    path: PathBuf,
}

// SAFETY: a dlopen handle is process-global and the dl* functions are thread-safe.
unsafe impl Send for LoadedLibrary {}
// SAFETY: see above, the handle is never mutated after opening.
unsafe impl Sync for LoadedLibrary {}

impl LoadedLibrary {
    /// Load a library into the process memory space.
    ///
    /// # Safety
    ///
    /// Users must ensure that the initialization and termination routines of the library are safe.
    pub unsafe fn open(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;

            let c_path = CString::new(path.as_os_str().as_bytes())
                .map_err(|_| LaunchError::InvalidName(name.clone()))?;
            // SAFETY: `c_path` is a valid C string. The caller ensured that the library is safe
            // to be loaded.
            let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
            match NonNull::new(handle) {
                Some(handle) => Ok(Self {
                    handle,
                    path: path.to_path_buf(),
                }),
                None => Err(LaunchError::LibraryNotFound {
                    name,
                    reason: last_dl_error(),
                }),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = name;
            Err(LaunchError::Unsupported)
        }
    }

    pub fn find_symbol(&self, symbol_name: &str) -> Result<NonNull<c_void>> {
        let symbol = CString::new(symbol_name)
            .map_err(|_| LaunchError::InvalidName(symbol_name.to_string()))?;
        #[cfg(unix)]
        {
            // SAFETY: `self.handle` is a valid library handle and `symbol` is a valid C string.
            let address = unsafe { libc::dlsym(self.handle.as_ptr(), symbol.as_ptr()) };
            NonNull::new(address).ok_or_else(|| LaunchError::SymbolNotFound {
                symbol: symbol_name.to_string(),
                reason: last_dl_error(),
            })
        }
        #[cfg(not(unix))]
        {
            let _ = symbol;
            Err(LaunchError::Unsupported)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LoadedLibrary {
    fn drop(&mut self) {
        debug!("Closing native library {}", self.path.display());
        #[cfg(unix)]
        // SAFETY: the instance owns a valid handle to the opened library. The termination routine
        // is ensured to be safe by whoever opened it.
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }
}

/// Open the first candidate of `source` that the dynamic loader accepts.
///
/// # Safety
///
/// Same contract as [`LoadedLibrary::open`], for every candidate.
pub unsafe fn resolve(source: &LibrarySource, search_paths: &[PathBuf]) -> Result<LoadedLibrary> {
    let mut failures = Vec::new();
    for candidate in source.candidates(search_paths) {
        // SAFETY: forwarded to the caller.
        match unsafe { LoadedLibrary::open(&candidate) } {
            Ok(library) => {
                info!("Loaded native library {}", candidate.display());
                return Ok(library);
            }
            Err(LaunchError::LibraryNotFound { reason, .. }) => {
                debug!("Skipping {}: {}", candidate.display(), reason);
                failures.push(reason);
            }
            Err(e) => return Err(e),
        }
    }
    Err(LaunchError::LibraryNotFound {
        name: source.to_string(),
        reason: failures.join("; "),
    })
}
