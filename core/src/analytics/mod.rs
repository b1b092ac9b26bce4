pub mod charts;
pub mod filter;
pub mod groups;
pub mod stats;

pub use charts::{build_chart_data, ChartData, PieSlice, RadarAxis, SourceBucket, TimePoint};
pub use filter::FleetFilter;
pub use groups::{group_by_date, DateGroup};
pub use stats::FleetStats;
