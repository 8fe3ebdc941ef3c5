//! # Manuscript AOM
//!
//! The Article Object Model: the typed, mutable, serializable document tree
//! at the center of the Manuscript pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup text → AST                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler: AST → document tree               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ aom (this crate): the tree engine           │
//! │  - identity: per-context id index           │
//! │  - ownership: exclusive children edges      │
//! │  - mutation: append/insert/remove/splice    │
//! │  - events: bubbling ChildEvent protocol     │
//! │  - serialization: JSON interchange form     │
//! │  - printing: regenerated markup text        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **Explicit context**: the [`Aom`] object owns the node arena, the id
//!    index and the type registry. Independent documents get independent
//!    contexts; nothing is process-global.
//! 2. **Exclusive ownership**: a node has exactly one owner at a time.
//!    Detaching hands the subtree back as an owned [`Detached`] value and
//!    releases its ids; [`Aom::restore`] re-registers it.
//! 3. **No partial mutation**: every operation validates first and leaves
//!    the tree untouched on error, including when the owning article is
//!    readonly.
//! 4. **Single-threaded, synchronous**: mutation, dispatch and
//!    serialization all complete within the calling turn. Listeners may
//!    re-enter the engine; dispatch snapshots listener lists per level so
//!    re-entrant changes cannot corrupt an in-progress dispatch.
//!
//! ## Usage
//!
//! ```rust
//! use manuscript_aom::{Aom, Kind};
//!
//! let mut aom = Aom::new();
//! let article = aom.build(Kind::Article(Default::default()));
//! let doc = aom.build(Kind::Document);
//! aom.append_children(&article, &[doc.clone()]).unwrap();
//!
//! let saved = aom.serialise(&article).unwrap();
//! let markup = aom.tex(&article).unwrap();
//! assert!(markup.starts_with("\\documentclass{article}"));
//! # let _ = saved;
//! ```

mod aom;
pub mod error;
pub mod event;
pub mod greek;
mod id_generator;
pub mod kind;
pub mod node;
pub mod registry;
mod serialise;
mod tex;

pub use aom::Aom;
pub use error::{AomError, AomResult};
pub use event::{Event, EventKind, EventPayload, Listener};
pub use id_generator::IdGenerator;
pub use kind::{ArticleMeta, Kind, Package};
pub use node::{Detached, Node, NodeId};
pub use registry::{DeserialiseFn, TypeRegistry};
