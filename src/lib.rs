//! Full-path wikilinks for markdown vaults.
//!
//! Links are stored as `[[full/path/Name]]` and displayed as `[[Name]]`. The
//! [`rewriter`] turns short links into full-path links while keeping the
//! cursor in place; the [`concealer`] computes which bytes of a full-path
//! link to hide from display. The [`session`] module drives both from
//! discrete editor events.

pub mod commands;
pub mod concealer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hasher;
pub mod index;
pub mod info;
pub mod rewriter;
pub mod scanner;
pub mod session;
pub mod types;
pub mod watch;
