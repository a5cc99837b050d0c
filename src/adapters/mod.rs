// Adapters layer: concrete implementations for external systems (storage).

pub mod storage;
