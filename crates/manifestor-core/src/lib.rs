pub mod config;
pub mod error;
pub mod eventlistener;
pub mod io;
pub mod layout;
pub mod paths;
pub mod repo;

pub use error::{ManifestorError, Result};
pub use eventlistener::{generate_event_listener, EventListener, OutputFormat};
pub use layout::{Manifest, Visitor};
