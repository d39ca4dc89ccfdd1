//! 内存存储实现（用于测试与本地演示）。

pub mod presence;

pub use presence::InMemoryPresenceStore;
