//! Host environment seam.
//!
//! Windows-only preconditions consult the host through this trait instead of
//! `cfg!` directly so tests can exercise them from any platform.

use std::fmt::Debug;

pub trait Host: Debug {
    fn is_windows(&self) -> bool;
}

/// The real host this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHost;

impl Host for NativeHost {
    fn is_windows(&self) -> bool {
        cfg!(windows)
    }
}
