use scancore::geo::time::parse_capture;
use scancore::record::device::SimulatedDevice;
use scancore::record::scan::ScanItem;
use scancore::remote::protocol::{Envelope, ListData, ListQuery};
use scancore::telemetry::log::EventLog;
use serde_json::Value;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Everything the HTTP routes serve. The movement loop replaces the fleet
/// snapshot wholesale each tick; the scan history is fixed per run.
#[derive(Debug, Default, Clone)]
pub struct BridgeState {
    pub scans: Vec<ScanItem>,
    pub fleet: Vec<SimulatedDevice>,
}

/// Hosts the scan list/detail and fleet endpoints the visualizer consumes.
pub struct ScanBridge {
    state: Arc<RwLock<BridgeState>>,
    log: EventLog,
}

impl ScanBridge {
    pub fn new(port: u16, scans: Vec<ScanItem>) -> Self {
        let state = Arc::new(RwLock::new(BridgeState {
            scans,
            fleet: Vec::new(),
        }));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let list_route = warp::path!("scans" / "simple")
            .and(warp::get())
            .and(warp::query::<ListQuery>())
            .and(state_filter.clone())
            .map(
                |query: ListQuery, state: Arc<RwLock<BridgeState>>| {
                    let guard = state.read().unwrap();
                    warp::reply::json(&list_response(&guard.scans, &query))
                },
            );

        let detail_route = warp::path!("scans" / String)
            .and(warp::get())
            .and(state_filter.clone())
            .map(|scan_id: String, state: Arc<RwLock<BridgeState>>| {
                let guard = state.read().unwrap();
                match guard
                    .scans
                    .iter()
                    .find(|scan| scan.scan_id.as_deref() == Some(scan_id.as_str()))
                {
                    Some(scan) => warp::reply::with_status(
                        warp::reply::json(&Envelope {
                            code: 200,
                            message: "ok".to_string(),
                            data: scan.clone(),
                        }),
                        StatusCode::OK,
                    ),
                    None => warp::reply::with_status(
                        warp::reply::json(&Envelope {
                            code: 404,
                            message: format!("scan {scan_id} not found"),
                            data: Value::Null,
                        }),
                        StatusCode::NOT_FOUND,
                    ),
                }
            });

        let fleet_route = warp::path("fleet")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<BridgeState>>| {
                warp::reply::json(&state.read().unwrap().fleet)
            });

        let address = SocketAddr::from(([127, 0, 0, 1], port));
        thread::spawn(move || {
            let routes = list_route.or(detail_route).or(fleet_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build bridge runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });

        Self {
            state,
            log: EventLog::new("bridge"),
        }
    }

    /// Publishes a fresh fleet snapshot for the `/fleet` route.
    pub fn publish_fleet(&self, fleet: &[SimulatedDevice]) {
        let mut guard = self.state.write().unwrap();
        guard.fleet = fleet.to_vec();
    }

    pub fn publish_status(&self, message: &str) {
        self.log.record(message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> BridgeState {
        self.state.read().unwrap().clone()
    }
}

/// Applies the time-range filter and limit; `total` counts every matching
/// record, `count` the records actually returned.
fn list_response(scans: &[ScanItem], query: &ListQuery) -> Envelope<ListData> {
    let begin = parse_capture(&query.bgng_dt);
    let end = parse_capture(&query.end_dt);

    let matching: Vec<ScanItem> = scans
        .iter()
        .filter(|scan| match scan.capture_time() {
            Some(t) => {
                begin.map_or(true, |b| t >= b) && end.map_or(true, |e| t <= e)
            }
            None => false,
        })
        .cloned()
        .collect();

    let total = matching.len();
    let items: Vec<ScanItem> = matching.into_iter().take(query.limit).collect();
    Envelope {
        code: 200,
        message: "ok".to_string(),
        data: ListData {
            total,
            count: items.len(),
            items,
        },
    }
}
