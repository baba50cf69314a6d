// src/commands/mod.rs
//
// Commands module - the validated operations behind the options page and the
// popup, organized by feature. Each takes the shared database handle.

pub mod pause;
pub mod settings;
pub mod sites;
pub mod words;

pub use pause::*;
pub use settings::*;
pub use sites::*;
pub use words::*;
