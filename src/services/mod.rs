pub mod carousel;
pub mod composer;
pub mod diversity;
pub mod fixed_slots;
pub mod gateway;
pub mod pool;
pub mod sampling;
pub mod settings_store;

pub use carousel::{Carousel, RailView};
pub use composer::{browsable_sections, compose_home, find_section, HomeRails};
pub use gateway::{MetadataGateway, PlexGateway};
pub use settings_store::{SettingsSnapshot, SettingsStore};
