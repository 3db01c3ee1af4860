//! Domain types: bars, bar series, timeframes and loose date inputs.

pub mod bar;
pub mod bar_data;
pub mod date;
pub mod timeframe;

pub use bar::Bar;
pub use bar_data::{BarData, EmptyBarStats};
pub use date::{parse_date_input, DateInput};
pub use timeframe::{ParseTimeframeError, Timeframe};
