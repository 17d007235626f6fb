//! Path classification
//!
//! Pure predicates over repository-relative posix paths.

/// Basenames never worth reading
const IGNORED_BASENAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "bun.lock",
    "npm-shrinkwrap.json",
    "composer.lock",
    "Gemfile.lock",
    "poetry.lock",
    "Cargo.lock",
    "go.sum",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
];

/// Build output, dependency and VCS directories at the repository root
const IGNORED_PREFIXES: &[&str] = &[
    "node_modules/",
    ".git/",
    ".next/",
    ".nuxt/",
    ".svelte-kit/",
    ".turbo/",
    ".vercel/",
    ".cache/",
    "dist/",
    "build/",
    "out/",
    "coverage/",
    "vendor/",
    "target/",
    "__pycache__/",
    ".venv/",
];

/// Directories ignored at any depth
const IGNORED_NESTED_DIRS: &[&str] = &["node_modules", ".git", "__pycache__"];

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "icns", "tif", "tiff", "avif", "psd",
    "pdf", "zip", "gz", "tgz", "tar", "bz2", "xz", "7z", "rar", "jar", "war", "class", "woff",
    "woff2", "ttf", "otf", "eot", "mp3", "mp4", "m4a", "mov", "avi", "mkv", "webm", "wav",
    "ogg", "flac", "exe", "dll", "so", "dylib", "bin", "o", "a", "wasm", "pyc", "db",
    "sqlite", "sqlite3", "lockb",
];

const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "markdown", "rst", "txt", "adoc"];

/// Final path segment
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lowercased extension of the basename; dotfiles and extensionless files have none
pub fn extension(path: &str) -> Option<String> {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(name[idx + 1..].to_lowercase()),
    }
}

/// Lockfiles, OS metadata, and anything under build/dependency/VCS directories
pub fn is_ignored_path(path: &str) -> bool {
    if IGNORED_BASENAMES.contains(&basename(path)) {
        return true;
    }
    if IGNORED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    let mut dirs: Vec<&str> = path.split('/').collect();
    dirs.pop();
    dirs.iter().any(|seg| IGNORED_NESTED_DIRS.contains(seg))
}

/// False only for known binary extensions
pub fn is_probably_text_file(path: &str) -> bool {
    match extension(path) {
        Some(ext) => !BINARY_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}

/// Markdown and other prose formats
pub fn is_doc_like(path: &str) -> bool {
    extension(path)
        .map(|ext| DOC_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
