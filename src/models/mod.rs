pub mod blocked_site;
pub mod blocked_word;
pub mod pause_state;
pub mod settings;

pub use blocked_site::BlockedSite;
pub use blocked_word::BlockedWord;
pub use pause_state::PauseState;
pub use settings::{Settings, SettingsUpdate, Theme};
