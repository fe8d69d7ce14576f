//! WebAssembly bindings for JavaScript/TypeScript.

#![cfg(feature = "wasm")]

use crate::config::Config;
use crate::convert;
use wasm_bindgen::prelude::*;

/// Convert Markdown to Zim markup.
///
/// # Arguments
///
/// * `input` - The Markdown source text.
/// * `options` - Optional configuration object.
///
/// # Returns
///
/// The Zim markup.
#[wasm_bindgen(js_name = convertMarkdown)]
pub fn convert_markdown(input: &str, options: Option<ConvertOptions>) -> Result<String, JsError> {
    let config = options.map(|o| o.to_config()).unwrap_or_default();
    convert(input, &config).map_err(|e| JsError::new(&e.to_string()))
}

/// Engine limits for a conversion.
#[wasm_bindgen]
pub struct ConvertOptions {
    config: Config,
}

#[wasm_bindgen]
impl ConvertOptions {
    /// Create a new options object with defaults.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the width of one indentation level.
    #[wasm_bindgen(js_name = setTabWidth)]
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.config.tab_width = tab_width;
    }

    /// Set how many bytes to scan for the `]` closing a link text.
    #[wasm_bindgen(js_name = setMaxLinkTextScan)]
    pub fn set_max_link_text_scan(&mut self, max_link_text_scan: usize) {
        self.config.max_link_text_scan = max_link_text_scan;
    }

    /// Set the maximum nesting of quotes and lists.
    #[wasm_bindgen(js_name = setMaxDepth)]
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.config.max_depth = max_depth;
    }

    fn to_config(&self) -> Config {
        self.config.clone()
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// TypeScript type definitions for documentation
/// ```typescript
/// // md2zim.d.ts
///
/// /**
///  * Convert Markdown to Zim wiki markup.
///  * @param input - The Markdown source text
///  * @param options - Optional limits
///  * @returns The Zim markup
///  */
/// export function convertMarkdown(input: string, options?: ConvertOptions): string;
///
/// /**
///  * Get the library version.
///  * @returns Version string
///  */
/// export function getVersion(): string;
///
/// export class ConvertOptions {
///     constructor();
///     setTabWidth(tabWidth: number): void;
///     setMaxLinkTextScan(maxLinkTextScan: number): void;
///     setMaxDepth(maxDepth: number): void;
/// }
/// ```
const _: () = ();
