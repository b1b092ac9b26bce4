use crate::analytics::stats::mean_rounded;
use crate::record::device::{HazardType, Severity, SimulatedDevice, SOURCES};

/// How many of the most recent raw records feed the time series.
pub const TIME_SERIES_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: usize,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceBucket {
    pub name: &'static str,
    pub count: usize,
    pub avg_severity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub name: &'static str,
    pub count: usize,
    pub avg_severity: i64,
    pub max_value: i64,
}

/// One time-series sample with cumulative severity counts up to its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub label: String,
    pub value: f64,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub pie: Vec<PieSlice>,
    pub sources: Vec<SourceBucket>,
    pub radar: Vec<RadarAxis>,
    pub time_series: Vec<TimePoint>,
}

/// Chart-ready groupings: per-type and per-source aggregates over the
/// filtered set, and a cumulative time series over the most recent raw
/// records (unfiltered, so the trend survives narrow filters).
pub fn build_chart_data(filtered: &[SimulatedDevice], raw: &[SimulatedDevice]) -> ChartData {
    let pie = HazardType::ALL
        .iter()
        .map(|hazard| PieSlice {
            name: hazard.label(),
            value: filtered.iter().filter(|d| d.hazard_type == *hazard).count(),
            color: hazard.color(),
        })
        .collect();

    let sources = SOURCES
        .iter()
        .map(|source| {
            let of_source: Vec<&SimulatedDevice> =
                filtered.iter().filter(|d| d.source == *source).collect();
            SourceBucket {
                name: *source,
                count: of_source.len(),
                avg_severity: mean_rounded(
                    of_source.iter().map(|d| d.value).sum(),
                    of_source.len(),
                ),
            }
        })
        .collect();

    let radar = HazardType::ALL
        .iter()
        .map(|hazard| {
            let of_type: Vec<&SimulatedDevice> = filtered
                .iter()
                .filter(|d| d.hazard_type == *hazard)
                .collect();
            RadarAxis {
                name: hazard.label(),
                count: of_type.len(),
                avg_severity: mean_rounded(of_type.iter().map(|d| d.value).sum(), of_type.len()),
                max_value: 100,
            }
        })
        .collect();

    let start = raw.len().saturating_sub(TIME_SERIES_WINDOW);
    let recent = &raw[start..];
    let time_series = recent
        .iter()
        .enumerate()
        .map(|(i, device)| {
            let prefix = &recent[..=i];
            let count_level =
                |level: Severity| prefix.iter().filter(|d| d.level == level).count();
            TimePoint {
                label: format!("{:02}:{:02}", i / 2, (i % 2) * 30),
                value: device.value,
                high: count_level(Severity::High),
                medium: count_level(Severity::Medium),
                low: count_level(Severity::Low),
            }
        })
        .collect();

    ChartData {
        pie,
        sources,
        radar,
        time_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::device::tests::test_device;

    fn fleet(count: usize) -> Vec<SimulatedDevice> {
        (0..count)
            .map(|i| {
                let mut device = test_device(i as u32);
                device.hazard_type = HazardType::ALL[i % HazardType::ALL.len()];
                device.level = Severity::ALL[i % Severity::ALL.len()];
                device.source = SOURCES[i % SOURCES.len()].to_string();
                device.value = 10.0 + i as f64;
                device
            })
            .collect()
    }

    #[test]
    fn pie_counts_cover_every_hazard_type() {
        let fleet = fleet(12);
        let charts = build_chart_data(&fleet, &fleet);
        assert_eq!(charts.pie.len(), HazardType::ALL.len());
        let total: usize = charts.pie.iter().map(|slice| slice.value).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn source_buckets_average_to_zero_when_empty() {
        let charts = build_chart_data(&[], &[]);
        assert!(charts.sources.iter().all(|bucket| bucket.avg_severity == 0));
        assert!(charts.time_series.is_empty());
    }

    #[test]
    fn time_series_is_bounded_and_cumulative() {
        let fleet = fleet(45);
        let charts = build_chart_data(&fleet, &fleet);
        assert_eq!(charts.time_series.len(), TIME_SERIES_WINDOW);

        let totals: Vec<usize> = charts
            .time_series
            .iter()
            .map(|p| p.high + p.medium + p.low)
            .collect();
        // Each prefix position accounts for exactly the records seen so far.
        assert_eq!(totals, (1..=TIME_SERIES_WINDOW).collect::<Vec<_>>());
        assert_eq!(charts.time_series[0].label, "00:00");
        assert_eq!(charts.time_series[1].label, "00:30");
        assert_eq!(charts.time_series[2].label, "01:00");
    }
}
