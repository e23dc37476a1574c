//! Range selection and partitioning
//!
//! ```text
//!   Record Source (0..N)
//!          │
//!          ▼
//!   IndexWindow::clamp(N)         [start, end) ∩ [0, N]
//!          │
//!          ▼
//!   Partitioner::run              one forward pass
//!          │
//!   ┌──────┼──────────┬───────────────┐
//!   ▼      ▼          ▼               ▼
//! Batch 0  Batch 1   ...    Batch k (remainder)
//! ```
//!
//! Every batch except possibly the last holds exactly `batch_size`
//! records; batches are handed to the sink as soon as they fill.

pub mod partitioner;
pub mod window;

pub use partitioner::{batch_size, Batch, PartitionSummary, Partitioner};
pub use window::IndexWindow;
