//! C FFI layer for cross-language interoperability.
//!
//! Every conversion returns an [`Md2ZimResult`] holding either `data` or
//! `error`; both strings are owned by the caller and released with
//! [`md2zim_free_result`] (or [`md2zim_free_string`] for one of them).

use crate::config::Config;
use crate::convert;
use libc::{c_char, size_t};
use std::ffi::{CStr, CString};
use std::ptr;

/// Engine limits for a conversion. Zero fields fall back to the defaults.
#[repr(C)]
pub struct Md2ZimConfig {
    /// Width of one indentation level
    pub tab_width: size_t,
    /// Bound on the bytes scanned for a link text's closing `]`
    pub max_link_text_scan: size_t,
    /// Maximum nesting of quotes and lists
    pub max_depth: size_t,
}

impl Default for Md2ZimConfig {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            tab_width: defaults.tab_width,
            max_link_text_scan: defaults.max_link_text_scan,
            max_depth: defaults.max_depth,
        }
    }
}

impl Md2ZimConfig {
    fn to_config(&self) -> Config {
        let defaults = Config::default();
        let or_default = |value: size_t, default: usize| if value == 0 { default } else { value };
        Config {
            tab_width: or_default(self.tab_width, defaults.tab_width),
            max_link_text_scan: or_default(self.max_link_text_scan, defaults.max_link_text_scan),
            max_depth: or_default(self.max_depth, defaults.max_depth),
            ..defaults
        }
    }
}

/// Result type for FFI operations.
#[repr(C)]
pub struct Md2ZimResult {
    /// Pointer to result string (caller must free with md2zim_free_string)
    pub data: *mut c_char,
    /// Error message if data is null (caller must free with md2zim_free_string)
    pub error: *mut c_char,
}

impl Md2ZimResult {
    fn ok(data: String) -> Self {
        match CString::new(data) {
            Ok(c_string) => Self {
                data: c_string.into_raw(),
                error: ptr::null_mut(),
            },
            Err(_) => Self::err("Output contains a NUL byte"),
        }
    }

    fn err(error: impl Into<String>) -> Self {
        let error = CString::new(error.into()).unwrap_or_else(|_| c"Unknown error".to_owned());
        Self {
            data: ptr::null_mut(),
            error: error.into_raw(),
        }
    }
}

unsafe fn convert_raw(input: *const c_char, config: Config) -> Md2ZimResult {
    if input.is_null() {
        return Md2ZimResult::err("Null input pointer");
    }

    let input = match CStr::from_ptr(input).to_str() {
        Ok(s) => s,
        Err(_) => return Md2ZimResult::err("Invalid UTF-8 input"),
    };

    match convert(input, &config) {
        Ok(zim) => Md2ZimResult::ok(zim),
        Err(e) => Md2ZimResult::err(e.to_string()),
    }
}

/// Convert a Markdown document with the default configuration.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - The returned result must be freed with `md2zim_free_result`.
#[no_mangle]
pub unsafe extern "C" fn md2zim_convert(input: *const c_char) -> Md2ZimResult {
    convert_raw(input, Config::default())
}

/// Convert a Markdown document with explicit limits.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - `config` must be null or a valid pointer to Md2ZimConfig.
/// - The returned result must be freed with `md2zim_free_result`.
#[no_mangle]
pub unsafe extern "C" fn md2zim_convert_with_config(
    input: *const c_char,
    config: *const Md2ZimConfig,
) -> Md2ZimResult {
    let config = if config.is_null() {
        Config::default()
    } else {
        (*config).to_config()
    };
    convert_raw(input, config)
}

/// Free a string returned by md2zim functions.
///
/// # Safety
///
/// - `s` must be a pointer returned by a md2zim function, or null.
#[no_mangle]
pub unsafe extern "C" fn md2zim_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Free a result struct.
///
/// # Safety
///
/// - `result` must be a valid Md2ZimResult.
#[no_mangle]
pub unsafe extern "C" fn md2zim_free_result(result: Md2ZimResult) {
    md2zim_free_string(result.data);
    md2zim_free_string(result.error);
}

/// Get the library version.
///
/// The returned string is static and must not be freed.
#[no_mangle]
pub extern "C" fn md2zim_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    unsafe fn take(result: Md2ZimResult) -> (Option<String>, Option<String>) {
        let read = |p: *mut c_char| {
            (!p.is_null()).then(|| CStr::from_ptr(p).to_string_lossy().into_owned())
        };
        let out = (read(result.data), read(result.error));
        md2zim_free_result(result);
        out
    }

    #[test]
    fn test_convert() {
        let input = CString::new("# Title\n\n*x*").unwrap();
        let (data, error) = unsafe { take(md2zim_convert(input.as_ptr())) };
        assert_eq!(data.as_deref(), Some("===== Title =====\n\n//x//\n"));
        assert_eq!(error, None);
    }

    #[test]
    fn test_null_input() {
        let (data, error) = unsafe { take(md2zim_convert(ptr::null())) };
        assert_eq!(data, None);
        assert_eq!(error.as_deref(), Some("Null input pointer"));
    }

    #[test]
    fn test_convert_with_config() {
        let input = CString::new("[abcdefghij](http://a.com)").unwrap();
        let config = Md2ZimConfig {
            max_link_text_scan: 4,
            ..Md2ZimConfig::default()
        };
        let (data, _) = unsafe { take(md2zim_convert_with_config(input.as_ptr(), &config)) };
        assert_eq!(data.as_deref(), Some("[abcdefghij](http://a.com)\n"));

        let (data, _) = unsafe { take(md2zim_convert_with_config(input.as_ptr(), ptr::null())) };
        assert_eq!(data.as_deref(), Some("[[http://a.com|abcdefghij]]\n"));
    }

    #[test]
    fn test_zero_fields_use_defaults() {
        let config = Md2ZimConfig {
            tab_width: 0,
            max_link_text_scan: 0,
            max_depth: 0,
        };
        assert_eq!(config.to_config(), Config::default());
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(md2zim_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
