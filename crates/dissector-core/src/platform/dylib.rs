//! # Dynamic Library Loading
//!
//! `dlopen`-based implementation of [`DebuggerActions`].
//!
//! Both supported inspection tools ship as a dynamic library that starts its
//! server from an initializer, so "loading the debugger" means `dlopen`ing
//! that library into the host process and "unloading" means `dlclose`.
//!
//! Before calling the loader we parse the file header with the `object`
//! crate. A truncated download or a library built for another platform then
//! fails with a readable `InvalidImage` error instead of an opaque `dlerror()`
//! string (or worse, a crash inside dyld).
//!
//! ## References
//!
//! - [dlopen(3) man page](https://developer.apple.com/library/archive/documentation/System/Conceptual/ManPages_iPhoneOS/man3/dlopen.3.html)

use std::ffi::{CStr, CString};
use std::fs;
use std::os::raw::c_void;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Mutex;

use object::{FileKind, Object, ObjectKind};
use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use crate::debugger::DebuggerActions;
use crate::error::{DissectorError, Result};
use crate::handle::DebuggerHandle;
use crate::types::DebuggerType;

/// `dlerror()` state is shared by the whole process; hold this while pairing
/// a loader call with its error message.
static LOADER_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Container format of a library image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat
{
    /// Single-architecture Mach-O
    MachO,
    /// Fat (universal) Mach-O
    MachOUniversal,
    /// ELF (non-Apple hosts)
    Elf,
}

/// What we learned from a library's header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo
{
    /// Container format
    pub format: ImageFormat,
    /// Object kind; `None` for universal binaries, whose slices are not parsed
    pub kind: Option<ObjectKind>,
    /// Architecture name, `"universal"` for fat binaries
    pub architecture: String,
}

impl ImageInfo
{
    /// Whether the loader can be expected to accept this image.
    #[must_use]
    pub fn is_loadable(&self) -> bool
    {
        match self.kind {
            Some(kind) => kind == ObjectKind::Dynamic,
            // Let dyld pick the slice
            None => true,
        }
    }
}

/// Parse the header of the library at `path`.
///
/// ## Errors
///
/// - `LibraryNotFound`: nothing exists at `path`
/// - `InvalidImage`: the file is not Mach-O or ELF
/// - `Io`: the file cannot be read
pub fn inspect_image(path: &Path) -> Result<ImageInfo>
{
    if !path.exists() {
        return Err(DissectorError::LibraryNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let invalid = |reason: String| DissectorError::InvalidImage {
        path: path.to_path_buf(),
        reason,
    };

    let format = match FileKind::parse(&*data).map_err(|e| invalid(e.to_string()))? {
        FileKind::MachO32 | FileKind::MachO64 => ImageFormat::MachO,
        FileKind::MachOFat32 | FileKind::MachOFat64 => {
            return Ok(ImageInfo {
                format: ImageFormat::MachOUniversal,
                kind: None,
                architecture: "universal".to_string(),
            });
        }
        FileKind::Elf32 | FileKind::Elf64 => ImageFormat::Elf,
        other => return Err(invalid(format!("unsupported image format {other:?}"))),
    };

    let file = object::File::parse(&*data).map_err(|e| invalid(e.to_string()))?;
    Ok(ImageInfo {
        format,
        kind: Some(file.kind()),
        architecture: format!("{:?}", file.architecture()),
    })
}

/// A library opened with `dlopen`
///
/// Dropping this value does **not** call `dlclose`; use [`LoadedLibrary::close`].
#[derive(Debug)]
pub struct LoadedLibrary
{
    path: PathBuf,
    raw: NonNull<c_void>,
}

// dlopen handles are process-global and valid on any thread.
unsafe impl Send for LoadedLibrary {}

impl LoadedLibrary
{
    /// `dlopen(path, RTLD_NOW | RTLD_GLOBAL)`.
    ///
    /// On failure the `dlerror()` message is returned.
    pub fn open(path: &Path) -> std::result::Result<Self, String>
    {
        let c_path = path_to_cstring(path)?;
        let _guard = LOADER_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        match NonNull::new(raw) {
            Some(raw) => Ok(Self {
                path: path.to_path_buf(),
                raw,
            }),
            None => Err(last_dl_error()),
        }
    }

    /// Check whether the library at `path` is already mapped into this process.
    #[must_use]
    pub fn is_resident(path: &Path) -> bool
    {
        let Ok(c_path) = path_to_cstring(path) else {
            return false;
        };
        let _guard = LOADER_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        unsafe {
            let raw = libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_NOLOAD);
            if raw.is_null() {
                // Clear the error left behind by the probe
                libc::dlerror();
                false
            } else {
                // RTLD_NOLOAD still bumps the reference count
                libc::dlclose(raw);
                true
            }
        }
    }

    /// Path the library was opened from.
    #[must_use]
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// `dlclose` the library.
    ///
    /// On failure the `dlerror()` message is returned.
    pub fn close(self) -> std::result::Result<(), String>
    {
        let _guard = LOADER_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if unsafe { libc::dlclose(self.raw.as_ptr()) } == 0 {
            Ok(())
        } else {
            Err(last_dl_error())
        }
    }
}

fn path_to_cstring(path: &Path) -> std::result::Result<CString, String>
{
    CString::new(path.as_os_str().as_bytes()).map_err(|e| format!("Invalid library path: {e}"))
}

/// Caller must hold `LOADER_LOCK`.
fn last_dl_error() -> String
{
    unsafe {
        let message = libc::dlerror();
        if message.is_null() {
            "unknown loader error".to_string()
        } else {
            CStr::from_ptr(message).to_string_lossy().into_owned()
        }
    }
}

/// Debugger integration backed by a single dynamic library
#[derive(Debug, Clone)]
pub struct DynamicLibraryDebugger
{
    debugger: DebuggerType,
    path: PathBuf,
}

impl DynamicLibraryDebugger
{
    /// Integration for `debugger` whose library lives at `path`.
    pub fn new(debugger: DebuggerType, path: impl Into<PathBuf>) -> Self
    {
        Self {
            debugger,
            path: path.into(),
        }
    }

    /// Library path.
    #[must_use]
    pub fn path(&self) -> &Path
    {
        &self.path
    }
}

impl DebuggerActions for DynamicLibraryDebugger
{
    fn load(&self) -> Result<DebuggerHandle>
    {
        let image = inspect_image(&self.path)?;
        debug!(
            "{} image: {:?} {:?} ({})",
            self.debugger, image.format, image.kind, image.architecture
        );
        if !image.is_loadable() {
            return Err(DissectorError::InvalidImage {
                path: self.path.clone(),
                reason: format!("expected a dynamic library, found {:?}", image.kind),
            });
        }

        if LoadedLibrary::is_resident(&self.path) {
            warn!("{} is already loaded from {}", self.debugger, self.path.display());
        }

        let library = LoadedLibrary::open(&self.path).map_err(|reason| DissectorError::LoadFailed {
            debugger: self.debugger,
            reason,
        })?;
        info!("Loaded {} from {}", self.debugger, self.path.display());
        Ok(DebuggerHandle::new(self.debugger, library))
    }

    fn unload(&self, handle: DebuggerHandle) -> Result<()>
    {
        handle.ensure_debugger(self.debugger)?;
        let library: LoadedLibrary = handle.into_resource()?;
        let path = library.path().to_path_buf();
        library.close().map_err(|reason| DissectorError::UnloadFailed {
            debugger: self.debugger,
            reason,
        })?;
        info!("Unloaded {} from {}", self.debugger, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_library()
    {
        let actions = DynamicLibraryDebugger::new(DebuggerType::Reveal, "/nonexistent/Reveal.dylib");
        match actions.load() {
            Err(DissectorError::LibraryNotFound(path)) => assert_eq!(path, PathBuf::from("/nonexistent/Reveal.dylib")),
            other => panic!("Expected LibraryNotFound, got {other:?}"),
        }
        assert!(!LoadedLibrary::is_resident(Path::new("/nonexistent/Reveal.dylib")));
    }

    #[test]
    fn test_garbage_image_is_rejected()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a library").unwrap();

        let actions = DynamicLibraryDebugger::new(DebuggerType::SparkInspector, file.path());
        match actions.load() {
            Err(DissectorError::InvalidImage { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected InvalidImage, got {other:?}"),
        }
    }

    #[test]
    fn test_inspect_current_executable()
    {
        let exe = std::env::current_exe().unwrap();
        let info = inspect_image(&exe).unwrap();
        if cfg!(target_vendor = "apple") {
            assert!(matches!(info.format, ImageFormat::MachO | ImageFormat::MachOUniversal));
        } else {
            assert_eq!(info.format, ImageFormat::Elf);
        }
    }

    /// A shared library that exists on disk on this host, if one is known.
    fn system_library() -> Option<PathBuf>
    {
        let candidates: &[&str] = if cfg!(target_vendor = "apple") {
            &["/usr/lib/libSystem.B.dylib", "/usr/lib/libz.1.dylib"]
        } else {
            &[
                "/lib/x86_64-linux-gnu/libm.so.6",
                "/usr/lib/x86_64-linux-gnu/libm.so.6",
                "/lib/aarch64-linux-gnu/libm.so.6",
                "/usr/lib/aarch64-linux-gnu/libm.so.6",
                "/lib64/libm.so.6",
                "/usr/lib64/libm.so.6",
                "/usr/lib/libm.so.6",
            ]
        };
        // Recent macOS keeps system libraries only in the dyld shared cache
        candidates.iter().map(PathBuf::from).find(|path| path.is_file())
    }

    #[cfg(unix)]
    #[test]
    fn test_load_and_unload_system_library()
    {
        let Some(path) = system_library() else {
            eprintln!("no system library on disk, skipping");
            return;
        };

        let actions = DynamicLibraryDebugger::new(DebuggerType::Reveal, &path);
        let handle = actions.load().unwrap();
        assert_eq!(handle.debugger(), DebuggerType::Reveal);
        assert!(handle.resource::<LoadedLibrary>().is_some());
        assert!(LoadedLibrary::is_resident(&path));

        actions.unload(handle).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_repeated_load_unload_cycles()
    {
        let Some(path) = system_library() else {
            eprintln!("no system library on disk, skipping");
            return;
        };

        let actions = DynamicLibraryDebugger::new(DebuggerType::SparkInspector, &path);
        for _ in 0..3 {
            let handle = actions.load().unwrap();
            assert!(LoadedLibrary::is_resident(&path));
            actions.unload(handle).unwrap();
        }
    }

    #[test]
    fn test_unload_rejects_foreign_handle()
    {
        let actions = DynamicLibraryDebugger::new(DebuggerType::Reveal, "/nonexistent/Reveal.dylib");
        let handle = DebuggerHandle::new(DebuggerType::SparkInspector, ());
        assert!(matches!(
            actions.unload(handle),
            Err(DissectorError::HandleMismatch {
                expected: DebuggerType::Reveal,
                found: DebuggerType::SparkInspector
            })
        ));
    }
}
