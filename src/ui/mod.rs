//! UI abstraction layer
//!
//! The library never prints or prompts directly. It reports through a
//! [`Notifier`] and asks a [`Confirmer`] before destructive actions, so the
//! same engine drives the terminal front end, an embedding application, or a
//! test harness.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Engine, mutator, tag editor, player    │
//! └────────────────┬────────────────────────┘
//!                  │ Uses traits
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │        Notifier / Confirmer             │
//! └────────────────┬────────────────────────┘
//!         ┌────────┴─────────┐
//!         ▼                  ▼
//! ┌────────────────┐  ┌──────────────────┐
//! │ Terminal       │  │ Embedded         │
//! │ - colored      │  │ - ToastQueue     │
//! │ - dialoguer    │  │ - AssumeYes      │
//! └────────────────┘  └──────────────────┘
//! ```

pub mod input;
pub mod output;

#[cfg(test)]
pub mod mock;

pub use input::{AssumeYes, Confirmer, DialoguerConfirmer, InputError};
pub use output::{NoticeLevel, Notifier, TerminalNotifier, ToastQueue};
