//! PDF field canvas pipeline for the legal-form editor.
//!
//! This crate owns the systems side of form editing: it caches the immutable PDF
//! asset across memory, disk, and network tiers, keeps every form field's position in
//! resolution-independent percent-of-page space, drives pointer-drag repositioning
//! with frame-coalesced snapping, applies toolbar layout operations, and bakes typed
//! values back into a filled PDF. The host UI is responsible only for wiring pointer
//! events and frame callbacks to the engine and persisting the resulting positions.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`cache`] | Three-tier asset cache (memory LRU, persistent store, network) |
//! | [`coords`] | Percent-space positions and conversion to PDF points |
//! | [`field`] | Static field descriptors |
//! | [`model`] | Insertion-ordered position map (the committed model) |
//! | [`drag`] | Drag state machine, frame coalescing, and snap guides |
//! | [`layout`] | Batch layout operations (grid, align, distribute, paste, transform) |
//! | [`engine`] | [`engine::EngineCore`] tying the model, drag, and layout together |
//! | [`export`] | Writes field values into the PDF form |
//! | [`config`] | Environment-driven configuration |

pub mod cache;
pub mod config;
pub mod coords;
pub mod drag;
pub mod engine;
pub mod export;
pub mod field;
pub mod layout;
pub mod model;
