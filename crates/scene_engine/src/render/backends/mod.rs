//! Rendering backend implementations

pub mod headless;

pub use headless::HeadlessBackend;
