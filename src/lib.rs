//! # md2zim
//!
//! Convert Markdown documents to Zim desktop wiki markup.
//!
//! ## Quick Start
//!
//! ```rust
//! use md2zim::{convert, Config};
//!
//! let input = r#"
//! ## Introduction
//!
//! Some *emphasis*, a [link](http://example.com) and a note[^1].
//!
//! [^1]: The note.
//! "#;
//!
//! let zim = convert(input, &Config::default()).unwrap();
//! assert!(zim.contains("===== Introduction ====="));
//! assert!(zim.contains("[[http://example.com|link]]"));
//! ```
//!
//! ## Syntax Mapping
//!
//! | Markdown                   | Zim                        |
//! |----------------------------|----------------------------|
//! | `# H1` ... `###### H6`     | `===== H1 =====` ... `= H6 =` |
//! | `**bold**`, `__bold__`     | `**bold**`                 |
//! | `*italic*`, `_italic_`     | `//italic//`               |
//! | `~~strike~~`               | `~~strike~~`               |
//! | `- item`, `+ item`         | `* item`                   |
//! | `1. item`                  | `1. item`                  |
//! | `> quote`                  | `'''` block, indented      |
//! | `[text](url)`, `[text][id]`| `[[url\|text]]`            |
//! | `![alt](url)`              | `{{url}}`                  |
//! | `[^id]`                    | `^{N}` plus a footnote section |
//!
//! Fenced code and code spans are copied through untouched.
//!
//! ## Configuration
//!
//! The engine reads a few limits from [`Config`], loadable from TOML with
//! [`config::load`]:
//!
//! ```text
//! tab_width = 4
//! max_link_text_scan = 3000
//! max_depth = 64
//! output_suffix = "_md2zim"
//! ```
//!
//! ## FFI
//!
//! A C-compatible API is exported for use from other languages. See the
//! `ffi` module documentation for details.
//!
//! ## Features
//!
//! - `cli` (default): the `md2zim` command line tool
//! - `wasm`: WebAssembly bindings (requires `wasm-bindgen`)

pub mod config;
pub mod convert;
pub mod error;
pub mod placeholder;
pub mod storage;

// FFI module (always compiled for cdylib)
pub mod ffi;

// WASM module (only with feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Convenience re-exports
pub use config::Config;
pub use convert::Converter;
pub use error::{ConfigError, ConvertError, Error, Result, StorageError};
pub use storage::{auto_rename, read_document, write_document};

/// Convert a Markdown document to Zim markup in one step.
///
/// Fails only when `config` is invalid.
///
/// # Example
///
/// ```rust
/// use md2zim::{convert, Config};
///
/// let zim = convert("Some **bold** and *italic* text.", &Config::default()).unwrap();
/// assert_eq!(zim, "Some **bold** and //italic// text.\n");
/// ```
pub fn convert(input: &str, config: &Config) -> Result<String> {
    let mut converter = Converter::new(config.clone())?;
    Ok(converter.convert(input))
}
