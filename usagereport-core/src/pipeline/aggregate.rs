//! Per-zone aggregation

use super::classify::ClassifiedRecord;
use crate::reader::CellValue;
use std::collections::HashMap;
use tracing::debug;

/// Summed usage of one zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAggregate {
    pub zone: String,
    pub sms_count: f64,
    pub mobile_minutes: f64,
    pub fixed_minutes: f64,
    /// Number of records folded into this aggregate
    pub record_count: usize,
    /// First period seen for this zone, in read order
    pub first_period: CellValue,
    pub first_period_row: u32,
}

/// Group records by exact zone label and sum their usage.
///
/// Aggregates come out in first-seen order. Records without a zone have no
/// group and are skipped.
pub fn aggregate_by_zone(records: &[ClassifiedRecord]) -> Vec<ZoneAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut aggregates: Vec<ZoneAggregate> = Vec::new();
    let mut skipped = 0usize;

    for classified in records {
        let Some(zone) = classified.record.zone.as_deref() else {
            skipped += 1;
            continue;
        };

        let slot = *index.entry(zone).or_insert_with(|| {
            aggregates.push(ZoneAggregate {
                zone: zone.to_string(),
                sms_count: 0.0,
                mobile_minutes: 0.0,
                fixed_minutes: 0.0,
                record_count: 0,
                first_period: classified.record.period.clone(),
                first_period_row: classified.record.sheet_row,
            });
            aggregates.len() - 1
        });

        let aggregate = &mut aggregates[slot];
        aggregate.sms_count += classified.record.sms_count.unwrap_or(0.0);
        aggregate.mobile_minutes += classified.mobile_duration_minutes().unwrap_or(0.0);
        aggregate.fixed_minutes += classified.fixed_duration_minutes().unwrap_or(0.0);
        aggregate.record_count += 1;
    }

    if skipped > 0 {
        debug!(skipped, "records without a zone left out of aggregation");
    }
    for aggregate in &aggregates {
        debug!(
            zone = %aggregate.zone,
            records = aggregate.record_count,
            sms = aggregate.sms_count,
            "zone aggregate"
        );
    }
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationConfig;
    use crate::pipeline::classify::classify;
    use crate::pipeline::normalize::UsageRecord;

    fn classified(zone: Option<&str>, operator: &str, sms: Option<f64>, minutes: f64) -> ClassifiedRecord {
        classify(
            UsageRecord {
                sheet_row: 7,
                period: CellValue::Text("15/03/2024".to_string()),
                zone: zone.map(str::to_string),
                country: None,
                operator: Some(operator.to_string()),
                sms_count: sms,
                call_count: None,
                call_duration_minutes: Some(minutes),
            },
            &ClassificationConfig::default(),
        )
    }

    fn find<'a>(aggregates: &'a [ZoneAggregate], zone: &str) -> &'a ZoneAggregate {
        aggregates.iter().find(|a| a.zone == zone).unwrap()
    }

    #[test]
    fn test_sums_per_zone() {
        let records = vec![
            classified(Some("Zone A Mobile"), "X", Some(5.0), 10.0),
            classified(Some("Zone B"), "Z", Some(2.0), 6.0),
            classified(Some("Zone A Mobile"), "Y-Mob", Some(3.0), 4.0),
        ];

        let aggregates = aggregate_by_zone(&records);

        assert_eq!(aggregates.len(), 2);
        let a = find(&aggregates, "Zone A Mobile");
        assert_eq!((a.sms_count, a.mobile_minutes, a.fixed_minutes), (8.0, 14.0, 0.0));
        assert_eq!(a.record_count, 2);
        let b = find(&aggregates, "Zone B");
        assert_eq!((b.sms_count, b.mobile_minutes, b.fixed_minutes), (2.0, 0.0, 6.0));
        assert_eq!(b.record_count, 1);
    }

    #[test]
    fn test_exact_zone_matching() {
        let records = vec![
            classified(Some("Zone A"), "X", Some(1.0), 1.0),
            classified(Some("Zone A "), "X", Some(1.0), 1.0),
            classified(Some("zone a"), "X", Some(1.0), 1.0),
        ];

        assert_eq!(aggregate_by_zone(&records).len(), 3);
    }

    #[test]
    fn test_missing_values() {
        let records = vec![
            classified(Some("Zone A"), "X", None, 2.0),
            classified(None, "X", Some(100.0), 100.0),
        ];

        let aggregates = aggregate_by_zone(&records);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].sms_count, 0.0);
        assert_eq!(aggregates[0].fixed_minutes, 2.0);
        // The zoneless record is not counted anywhere
        assert_eq!(aggregates[0].record_count, 1);
    }

    #[test]
    fn test_order_independent() {
        let mut records = vec![
            classified(Some("Zone B"), "X", Some(1.0), 3.0),
            classified(Some("Zone A"), "X-Mob", Some(2.0), 5.0),
            classified(Some("Zone B"), "X-Mob", Some(4.0), 7.0),
        ];
        let forward = aggregate_by_zone(&records);
        records.reverse();
        let backward = aggregate_by_zone(&records);

        for zone in ["Zone A", "Zone B"] {
            let f = find(&forward, zone);
            let b = find(&backward, zone);
            assert_eq!(
                (f.sms_count, f.mobile_minutes, f.fixed_minutes),
                (b.sms_count, b.mobile_minutes, b.fixed_minutes)
            );
        }
    }
}
