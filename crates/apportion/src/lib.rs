//! `apportion` — grouped largest-remainder apportionment engine.
//!
//! Pure engine crate: receives pre-loaded records (or an in-memory table),
//! returns one integer allocation per record plus a report of per-group
//! deficits, shortfalls and tie-break collisions. No data IO.

pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod model;
pub mod parts;
pub mod rank;
pub mod report;
pub mod table;
pub mod tie_break;

pub use config::{AllocConfig, AllocOptions};
pub use engine::{allocate, allocate_global};
pub use error::AllocError;
pub use model::{Allocation, AllocationReport, GroupKey, Record, Value};
pub use table::{allocate_table, Table};
