//! Test helpers for code that reads the process environment
//!
//! Timezone detection reads `TZ`, so tests that change it must hold
//! [`ENV_MUTEX`] for their whole body and restore the variable afterwards.

use once_cell::sync::Lazy;
use std::env;

/// Serializes tests that touch environment variables
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Restores every variable it changed when dropped, even on panic
#[derive(Default)]
pub struct EnvVarGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` for the lifetime of the guard
    pub fn set(&mut self, key: &str, value: &str) {
        self.saved.push((key.to_string(), env::var(key).ok()));
        // SAFETY: callers hold ENV_MUTEX
        unsafe { env::set_var(key, value) }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        while let Some((key, original)) = self.saved.pop() {
            // SAFETY: the guard is dropped while ENV_MUTEX is still held
            unsafe {
                match original {
                    Some(value) => env::set_var(&key, value),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}
