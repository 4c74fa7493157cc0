//! The payroll core: pure, storage-free transforms from fetched snapshots
//! to deduction figures and the report aggregate. Nothing in this module
//! performs I/O; all data enters through parameters.

pub mod aggregate;
pub mod codes;
pub mod deduction;
pub mod error;
pub mod report;
