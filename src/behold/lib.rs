//! # Behold Architecture
//!
//! Behold is a **conditional debug-inspection library**: it lets you print or
//! stash named values at arbitrary points in a program, gated by boolean
//! conditions and by process-wide "context" state that is orthogonal to the
//! call site. It targets interactive debugging and ad-hoc tracing, not
//! production observability.
//!
//! ## The Flow of an Inspection
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Inspection point (inspect.rs)                              │
//! │  - Fluent filter accumulation: when / when_context /        │
//! │    when_values / view_context                               │
//! │  - Terminals: show, get, stash, is_true                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Resolution (inspect.rs over args.rs)                       │
//! │  - Subject record, keyword data, or scope snapshot          │
//! │  - Keyword data wins; sorted names when none requested      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Rendering / Stashing                                       │
//! │  - One deterministic "name: value, ..., tag" line, or       │
//! │  - A raw-value row appended under the instance's tag        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate consults two stores that live for the whole process: the
//! **context store** ([`context`]) and the **stash** ([`stash`]). Both are
//! plain in-memory maps behind a mutex; the design assumes one logical
//! thread of control, which is typical of an interactive debugging session.
//!
//! ## Quick Example
//!
//! ```
//! use behold::{set_context, unset_context, Args, Behold};
//!
//! set_context("phase", "tricky");
//!
//! let mut debug = Behold::new().tag("checkpoint");
//! for step in 0..3 {
//!     // Prints "step: 2, checkpoint" only for the step we care about,
//!     // and only while the phase context is set.
//!     debug
//!         .when(step == 2)
//!         .when_context("phase", "tricky")
//!         .show(Args::new().field("step", step))
//!         .unwrap();
//! }
//!
//! unset_context(["phase"]);
//! ```
//!
//! There is no frame introspection in Rust, so the "show my locals" shape
//! takes an explicit snapshot built with [`snapshot!`]:
//!
//! ```
//! use behold::{snapshot, Args, Behold};
//!
//! let x = 1;
//! let y = "two";
//! Behold::new().show(Args::new().scope(snapshot!(x, y))).unwrap();
//! // prints "x: 1, y: two"
//! ```
//!
//! ## Module Overview
//!
//! - [`inspect`]: the inspection point: filters, resolution, rendering,
//!   terminals
//! - [`args`]: the per-call payload and the [`snapshot!`] scope capture
//! - [`item`]: the order-preserving value container and [`Record`] capability
//! - [`query`]: operator-suffix key parsing (`x__gt`, `x__in`, ...)
//! - [`context`]: the process-wide context store and its scoped guard
//! - [`stash`]: the process-wide tagged row log
//! - [`timer`]: standalone timing utilities
//! - [`error`]: error types

pub mod args;
pub mod context;
pub mod error;
pub mod inspect;
pub mod item;
pub mod query;
pub mod stash;
pub mod timer;

pub use args::{Args, Scope};
pub use context::{
    context_value, in_context, set_context, set_context_all, unset_context, with_context,
    ContextGuard,
};
pub use error::{BeholdError, Result};
pub use inspect::{Behold, Extract};
pub use item::{display_value, value_of, Item, Record};
pub use stash::{clear_stash, get_stash};
pub use timer::{time, Clock, Timer, TimerResult};

/// The dynamic value type captured values are stored as.
pub use serde_json::Value;
