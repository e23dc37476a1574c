//! Worker pool orchestration
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │   ScrapeCoordinator     │
//!                     │  - Partitioner pass     │
//!                     │  - spawn per batch      │
//!                     │  - join barrier         │
//!                     └───────────┬─────────────┘
//!                                 │ one frozen JobQueue each
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 0 │             │  Worker 1 │             │  Worker N │
//! │  batch 0  │             │  batch 1  │             │  batch N  │
//! │ Processor │             │ Processor │             │ Processor │
//! └───────────┘             └───────────┘             └───────────┘
//! ```
//!
//! Workers never talk to each other. The only shared state is the
//! read-only [`WorkerContext`](worker::WorkerContext).

pub mod coordinator;
pub mod palette;
pub mod queue;
pub mod worker;

pub use coordinator::{ScrapeCoordinator, ScrapeResult};
pub use palette::{color_for, PaletteColor, PALETTE};
pub use queue::{JobQueue, JobReceiver, QueueStats};
pub use worker::{Worker, WorkerContext, WorkerReport, WorkerState, WorkerStats};
