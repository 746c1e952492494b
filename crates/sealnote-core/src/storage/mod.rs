//! Envelope persistence backends.
//!
//! - **traits**: the `EnvelopeStore` interface
//! - **file**: one note file, replaced atomically
//! - **memory**: in-process slot

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileEnvelopeStore;
pub use memory::MemoryEnvelopeStore;
pub use traits::EnvelopeStore;
