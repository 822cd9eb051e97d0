//! Console client for the employee records store.

pub mod menu;

pub use menu::{format_employee, Console, MenuChoice};
