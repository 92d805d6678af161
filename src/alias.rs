//! Type aliases used throughout the crate.
//!
//! All internal code imports synchronization primitives from here rather
//! than `std::sync` directly.
//!
//! ## Concurrency primitives
//!
//! We use `parking_lot` due to:
//! - **No lock poisoning**: a panic while holding the lock doesn't poison it.
//! - **Better performance**: faster than `std::sync` under contention.
//! - **Smaller memory footprint**: 1 byte vs 16-24 bytes for `std::sync::RwLock`.
//!
//! ```rust
//! use corvid::alias::PRwLock;
//!
//! let lock = PRwLock::new(vec![1, 2, 3]);
//! let guard = lock.read();
//! assert_eq!(guard[0], 1);
//! ```

/// `RwLock` alias (parking_lot implementation).
///
/// Use this instead of `std::sync::RwLock` everywhere in this crate.
pub use parking_lot::RwLock as PRwLock;

/// Read guard for [`PRwLock`].
pub use parking_lot::RwLockReadGuard as PRwLockReadGuard;

/// Write guard for [`PRwLock`].
pub use parking_lot::RwLockWriteGuard as PRwLockWriteGuard;

/// `Mutex` alias (parking_lot implementation).
pub use parking_lot::Mutex as PMutex;

/// Mutex guard for [`PMutex`].
pub use parking_lot::MutexGuard as PMutexGuard;
