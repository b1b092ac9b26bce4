pub mod gate;
pub mod protocol;

pub use gate::{RequestGate, RequestToken};
pub use protocol::{
    sort_by_capture, DetailResponse, Envelope, FetchError, ListData, ListQuery, ListResponse,
};
