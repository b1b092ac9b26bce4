use crate::geo::time;
use crate::record::scan::ScanItem;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Records of one calendar day, with a display label for the filter panel.
/// Derived on demand, rebuilt whenever the source list changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub label: String,
    pub items: Vec<ScanItem>,
}

/// Groups records by capture date, ascending. Records without a parsable
/// capture timestamp are skipped (they still live in the raw list).
pub fn group_by_date(items: &[ScanItem]) -> Vec<DateGroup> {
    let mut grouped: BTreeMap<NaiveDate, Vec<ScanItem>> = BTreeMap::new();
    for item in items {
        if let Some(t) = item.capture_time() {
            grouped.entry(time::date_key(&t)).or_default().push(item.clone());
        }
    }
    grouped
        .into_iter()
        .map(|(date, items)| DateGroup {
            date,
            label: time::format_day(&date),
            items,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(id: &str, capture: Option<&str>) -> ScanItem {
        ScanItem {
            scan_id: Some(id.into()),
            capture_dt: capture.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn groups_sort_ascending_by_date() {
        let items = vec![
            scan("c", Some("2025-07-22T08:00:00")),
            scan("a", Some("2025-07-20T08:00:00")),
            scan("b", Some("2025-07-20T17:30:00")),
            scan("skip", None),
            scan("bad", Some("garbled")),
        ];
        let groups = group_by_date(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date.to_string(), "2025-07-20");
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].date.to_string(), "2025-07-22");
        assert!(!groups[0].label.is_empty());
    }
}
