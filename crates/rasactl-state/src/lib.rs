//! rasactl-state — durable storage for the deployment record.
//!
//! The record of a deployment lives next to it, in a secret named
//! `rasactl` inside the deployment's namespace, so that deleting the
//! namespace takes the record with it.
//!
//! # Wire format
//!
//! The secret holds one string per field under well-known keys
//! (`helm-release-name`, `project-path`, `rasa-x-version`,
//! `rasa-worker-version`, `enterprise`). Unset fields are written as
//! empty strings and read back as `None`. Every write replaces all keys.
//!
//! [`MemoryStateStore`] offers the same contract without a cluster.

pub mod memory;
pub mod record;
pub mod secret;

pub use memory::MemoryStateStore;
pub use secret::SecretStateStore;
