//! Recording pipeline: container-kind detection and normalization of
//! intercom voice recordings for transport upload.

pub mod error;
pub mod resolver;

pub use {
    error::{Error, Result},
    resolver::{ContainerKind, NormalizedRecording, resolve},
};
