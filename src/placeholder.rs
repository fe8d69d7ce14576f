//! Reversible placeholder table.
//!
//! Passes that must not see some piece of text (an escaped `*`, a code span,
//! a block that is already converted) swap it for an opaque token and the
//! final span pass swaps every token back.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Characters that carry meaning in Markdown and may need hiding.
pub const ESCAPE_CHARS: &str = "\\`*_{}[]()>#+-.!";

/// Every token starts with this prefix followed by [`TOKEN_HEX_LEN`] hex digits.
const TOKEN_PREFIX: &str = "md2z";
const TOKEN_HEX_LEN: usize = 32;

static SALT: OnceLock<u64> = OnceLock::new();

fn salt() -> u64 {
    *SALT.get_or_init(rand::random::<u64>)
}

fn hash_text(literal: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt().to_le_bytes());
    hasher.update(literal.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}{}", TOKEN_PREFIX, &digest[..TOKEN_HEX_LEN])
}

/// Mapping between literal strings and the tokens standing in for them.
#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    tokens: HashMap<String, String>,
    literals: HashMap<String, String>,
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderTable {
    /// Create a table seeded with a token for each of [`ESCAPE_CHARS`].
    pub fn new() -> Self {
        let mut table = Self {
            tokens: HashMap::new(),
            literals: HashMap::new(),
        };
        for c in ESCAPE_CHARS.chars() {
            table.hide(c.encode_utf8(&mut [0; 4]));
        }
        table
    }

    /// Return the token for `literal`, registering it if needed.
    pub fn hide(&mut self, literal: &str) -> String {
        if let Some(token) = self.tokens.get(literal) {
            return token.clone();
        }
        let token = hash_text(literal);
        self.tokens.insert(literal.to_string(), token.clone());
        self.literals.insert(token.clone(), literal.to_string());
        token
    }

    /// The token registered for `literal`, if any.
    pub fn token_for(&self, literal: &str) -> Option<&str> {
        self.tokens.get(literal).map(String::as_str)
    }

    /// Replace every known token in `text` with its literal.
    pub fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(TOKEN_PREFIX) {
            out.push_str(&rest[..pos]);
            let candidate = rest
                .get(pos..pos + TOKEN_PREFIX.len() + TOKEN_HEX_LEN)
                .and_then(|token| self.literals.get(token));
            match candidate {
                Some(literal) => {
                    // Blocks hidden late may contain tokens hidden earlier.
                    if literal.contains(TOKEN_PREFIX) {
                        out.push_str(&self.restore(literal));
                    } else {
                        out.push_str(literal);
                    }
                    rest = &rest[pos + TOKEN_PREFIX.len() + TOKEN_HEX_LEN..];
                }
                None => {
                    out.push_str(TOKEN_PREFIX);
                    rest = &rest[pos + TOKEN_PREFIX.len()..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Whether any registered token occurs in `text`.
    pub fn contains_token(&self, text: &str) -> bool {
        let mut rest = text;
        while let Some(pos) = rest.find(TOKEN_PREFIX) {
            let found = rest
                .get(pos..pos + TOKEN_PREFIX.len() + TOKEN_HEX_LEN)
                .is_some_and(|token| self.literals.contains_key(token));
            if found {
                return true;
            }
            rest = &rest[pos + TOKEN_PREFIX.len()..];
        }
        false
    }

    /// Number of registered literals.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
