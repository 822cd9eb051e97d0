//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep client layers decoupled from storage details.

pub mod employee_service;
