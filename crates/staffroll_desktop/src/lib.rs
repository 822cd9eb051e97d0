//! Terminal desktop client for the employee records store.
//!
//! `App` holds all state and is driven by key events; `ui::draw` renders it
//! onto any ratatui backend; `terminal::run` wires both to a real terminal.

pub mod app;
pub mod command;
pub mod dialog;
pub mod terminal;
pub mod ui;

pub use app::{App, SELECT_FIRST};
pub use command::{command_for, Binding, Command, BINDINGS};
pub use dialog::{Dialog, DialogEvent, Form, FormKind};
