//! Channel plumbing: scheme-keyed providers, the local and in-memory backends, and
//! transparent decompression.

pub mod channel;
pub mod compression;
pub mod local;
pub mod memory;

pub use channel::{
    ChannelProvider, SeekableChannel, init_providers, provider_for, register_provider,
    reset_providers, unregister_provider,
};
pub use local::LocalFileProvider;
pub use memory::InMemoryProvider;
