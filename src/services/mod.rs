pub mod keys;
pub mod notifier;
pub mod reconciler;
pub mod storage;
pub mod uploader;
