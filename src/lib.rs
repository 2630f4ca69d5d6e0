//! # flashts
//!
//! An append-only time-series database for raw block-erase flash:
//! - No filesystem: runs on fixed-size erase blocks directly
//! - Many named series, each a circular buffer of (timestamp, value) items
//! - Space is reclaimed by erasing the oldest block of a series
//! - Power-loss safe with zero metadata writes: cursors are rebuilt on open
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Database                            │
//! │     make / open / create_record / append / values / delete  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Directory  │          │    Ring     │
//!   │ (Allocator) │          │ (Recovery)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌───────────────┐
//!              │  BlockDevice  │
//!              │ (raw flash)   │
//!              └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use flashts::{Config, Database, MemBlockDevice};
//!
//! let device = MemBlockDevice::new(4096, 64);
//! Database::make(&device, &Config::default()).unwrap();
//!
//! let mut db = Database::open(device).unwrap();
//! db.create_record("temperature", 1023).unwrap();
//! db.append("temperature", 1_700_000_000, 22.5).unwrap();
//!
//! let history = db.values("temperature", false).unwrap();
//! assert_eq!(history.timestamps, vec![1_700_000_000]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod device;
pub mod layout;
pub mod ring;
pub mod directory;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TsdbError, Result};
pub use config::Config;
pub use database::Database;
pub use device::{BlockDevice, FileBlockDevice, MemBlockDevice};
pub use ring::Values;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flashts
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
