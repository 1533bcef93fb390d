pub mod browse;
pub mod detail;
pub mod search;
pub mod widgets;

pub use browse::{render_browse_view, render_tabs};
pub use detail::render_detail_view;
pub use search::render_search_view;
