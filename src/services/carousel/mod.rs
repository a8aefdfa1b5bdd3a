//! Windowed, circular carousels over a rail's items

pub mod engine;
pub mod pager;

pub use engine::{Carousel, LoadPhase, LoadTicket, RailSource, RailView, Slot};
pub use pager::{items_per_page, page_count, visible_window, Pager, MAX_PAGES};
