//! # pdfium-locate
//!
//! Finds a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! for `pdfium-render`, optionally downloading a prebuilt copy from
//! [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//! into a per-user cache.
//!
//! Unlike a hard dependency on a system install, the caller decides what
//! happens when nothing is found: `plan2md` treats a missing library as
//! "pdfium backend unavailable" and falls back to its pure-Rust extractor,
//! and only downloads when explicitly asked to.
//!
//! ## Search order
//!
//! 1. an explicit path passed to [`locate`]
//! 2. `PDFIUM_LIB_PATH`
//! 3. [`cache_dir`] (populated by [`fetch`])
//!
//! [`bind_system`] covers the remaining case of a library installed on the
//! platform's default loader path.
//!
//! ```rust,no_run
//! let pdfium = match pdfium_locate::locate(None) {
//!     Some(found) => pdfium_locate::bind(&found.path)?,
//!     None => pdfium_locate::bind(&pdfium_locate::fetch(None)?)?,
//! };
//! # Ok::<(), pdfium_locate::LocateError>(())
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

/// pdfium-binaries release tag (`chromium/<VERSION>`) used by [`fetch`].
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing library file.
pub const LIB_PATH_VAR: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_VAR: &str = "PDFIUM_LOCATE_CACHE_DIR";

const RELEASES_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Errors from locating, downloading or binding PDFium.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("No prebuilt PDFium for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Archive(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    #[error("No PDFium library on the system loader path: {0}")]
    BindSystem(String),
}

/// Where a located library came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    Explicit,
    Environment,
    Cache,
}

impl std::fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LibrarySource::Explicit => "explicit path",
            LibrarySource::Environment => LIB_PATH_VAR,
            LibrarySource::Cache => "cache",
        })
    }
}

/// A library file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLibrary {
    pub path: PathBuf,
    pub source: LibrarySource,
}

// ── Platform table ───────────────────────────────────────────────────────────

struct Target {
    os: &'static str,
    arch: &'static str,
    /// Release asset name.
    archive: &'static str,
    /// Library path inside the archive.
    member: &'static str,
    file_name: &'static str,
}

const TARGETS: &[Target] = &[
    Target { os: "macos", arch: "aarch64", archive: "pdfium-mac-arm64.tgz", member: "lib/libpdfium.dylib", file_name: "libpdfium.dylib" },
    Target { os: "macos", arch: "x86_64", archive: "pdfium-mac-x64.tgz", member: "lib/libpdfium.dylib", file_name: "libpdfium.dylib" },
    Target { os: "linux", arch: "x86_64", archive: "pdfium-linux-x64.tgz", member: "lib/libpdfium.so", file_name: "libpdfium.so" },
    Target { os: "linux", arch: "aarch64", archive: "pdfium-linux-arm64.tgz", member: "lib/libpdfium.so", file_name: "libpdfium.so" },
    Target { os: "windows", arch: "x86_64", archive: "pdfium-win-x64.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
    Target { os: "windows", arch: "aarch64", archive: "pdfium-win-arm64.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
    Target { os: "windows", arch: "x86", archive: "pdfium-win-x86.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
];

fn target_for(os: &str, arch: &str) -> Result<&'static Target, LocateError> {
    TARGETS
        .iter()
        .find(|t| t.os == os && t.arch == arch)
        .ok_or_else(|| LocateError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn current_target() -> Result<&'static Target, LocateError> {
    target_for(std::env::consts::OS, std::env::consts::ARCH)
}

/// Platform file name of the library (`libpdfium.so`, `pdfium.dll`, …).
pub fn library_file_name() -> Result<&'static str, LocateError> {
    current_target().map(|t| t.file_name)
}

/// Versioned cache directory holding a fetched library.
///
/// `$PDFIUM_LOCATE_CACHE_DIR/pdfium-<VERSION>` when set, otherwise
/// `<platform cache dir>/plan2md/pdfium-<VERSION>`.
pub fn cache_dir() -> PathBuf {
    let versioned = format!("pdfium-{PDFIUM_VERSION}");
    if let Ok(root) = std::env::var(CACHE_DIR_VAR) {
        if !root.is_empty() {
            return PathBuf::from(root).join(versioned);
        }
    }
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join("plan2md")
        .join(versioned)
}

// ── Lookup ───────────────────────────────────────────────────────────────────

/// Look for an existing library without touching the network.
pub fn locate(explicit: Option<&Path>) -> Option<LocatedLibrary> {
    if let Some(path) = explicit.filter(|p| p.is_file()) {
        return Some(LocatedLibrary {
            path: path.to_path_buf(),
            source: LibrarySource::Explicit,
        });
    }

    if let Some(path) = std::env::var_os(LIB_PATH_VAR).map(PathBuf::from) {
        if path.is_file() {
            return Some(LocatedLibrary {
                path,
                source: LibrarySource::Environment,
            });
        }
    }

    let cached = cache_dir().join(library_file_name().ok()?);
    cached.is_file().then_some(LocatedLibrary {
        path: cached,
        source: LibrarySource::Cache,
    })
}

/// Download the platform library into [`cache_dir`] and return its path.
///
/// Returns the cached copy without downloading when one already exists.
/// `on_progress` receives `(bytes_so_far, content_length)`.
pub fn fetch(on_progress: Option<&dyn Fn(u64, Option<u64>)>) -> Result<PathBuf, LocateError> {
    let target = current_target()?;
    let dir = cache_dir();
    let dest = dir.join(target.file_name);
    if dest.is_file() {
        return Ok(dest);
    }

    std::fs::create_dir_all(&dir).map_err(|source| LocateError::Io {
        path: dir.clone(),
        source,
    })?;

    let url = format!("{RELEASES_URL}/chromium%2F{PDFIUM_VERSION}/{}", target.archive);
    let archive = download(&url, on_progress)?;
    unpack_member(&archive, target.member, &dest)?;
    Ok(dest)
}

// ── Binding ──────────────────────────────────────────────────────────────────

/// Bind `pdfium-render` to the library at `path`.
pub fn bind(path: &Path) -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Bind to a library installed on the system loader path.
pub fn bind_system() -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| LocateError::BindSystem(e.to_string()))
}

// ── Download & unpack ────────────────────────────────────────────────────────

fn download(url: &str, on_progress: Option<&dyn Fn(u64, Option<u64>)>) -> Result<Vec<u8>, LocateError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-locate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LocateError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| LocateError::Download(format!("GET {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(LocateError::Download(format!("HTTP {} for {url}", response.status())));
    }

    let total = response.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LocateError::Download(format!("read {url}: {e}"))),
        };
        body.extend_from_slice(&chunk[..n]);
        if let Some(cb) = on_progress {
            cb(body.len() as u64, total);
        }
    }
    Ok(body)
}

/// Extract `member` from a `.tgz` into `dest`.
///
/// The file is unpacked beside `dest` and renamed into place so an
/// interrupted run never leaves a truncated library in the cache.
fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), LocateError> {
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(archive));
    let entries = tar.entries().map_err(|e| LocateError::Archive(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| LocateError::Archive(e.to_string()))?;
        let is_member = entry
            .path()
            .map(|p| p.to_string_lossy() == member)
            .map_err(|e| LocateError::Archive(e.to_string()))?;
        if !is_member {
            continue;
        }

        let partial = dest.with_extension("part");
        entry
            .unpack(&partial)
            .map_err(|e| LocateError::Archive(format!("unpack {member}: {e}")))?;
        return std::fs::rename(&partial, dest).map_err(|source| LocateError::Io {
            path: dest.to_path_buf(),
            source,
        });
    }

    Err(LocateError::Archive(format!("'{member}' not in archive")))
}
