//! Mobile/fixed classification of call minutes

use super::normalize::UsageRecord;
use crate::config::ClassificationConfig;

/// Bucket receiving a record's call minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    Mobile,
    Fixed,
}

/// A usage record with its derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: UsageRecord,
    pub is_mobile_zone: bool,
    pub bucket: DurationBucket,
}

impl ClassifiedRecord {
    /// Call minutes when the record is mobile traffic, absent otherwise
    pub fn mobile_duration_minutes(&self) -> Option<f64> {
        (self.bucket == DurationBucket::Mobile).then(|| self.minutes())
    }

    /// Call minutes when the record is fixed-line traffic, absent otherwise
    pub fn fixed_duration_minutes(&self) -> Option<f64> {
        (self.bucket == DurationBucket::Fixed).then(|| self.minutes())
    }

    fn minutes(&self) -> f64 {
        self.record.call_duration_minutes.unwrap_or(0.0)
    }
}

/// Derive the zone flag and duration bucket of one record.
///
/// Minutes are mobile when the zone name carries the mobile-zone marker or
/// the operator carries the mobile-operator marker; fixed otherwise. A
/// missing zone or operator never matches.
pub fn classify(record: UsageRecord, rules: &ClassificationConfig) -> ClassifiedRecord {
    let contains = |field: &Option<String>, marker: &str| {
        field.as_deref().is_some_and(|value| value.contains(marker))
    };

    let is_mobile_zone = contains(&record.zone, &rules.mobile_zone_marker);
    let is_mobile_operator = contains(&record.operator, &rules.mobile_operator_marker);

    let bucket = if is_mobile_zone || is_mobile_operator {
        DurationBucket::Mobile
    } else {
        DurationBucket::Fixed
    };

    ClassifiedRecord {
        record,
        is_mobile_zone,
        bucket,
    }
}

/// Classify every record, preserving order
pub fn classify_all(records: Vec<UsageRecord>, rules: &ClassificationConfig) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|record| classify(record, rules))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CellValue;

    fn record(zone: Option<&str>, operator: Option<&str>, minutes: Option<f64>) -> UsageRecord {
        UsageRecord {
            sheet_row: 7,
            period: CellValue::Empty,
            zone: zone.map(str::to_string),
            country: None,
            operator: operator.map(str::to_string),
            sms_count: None,
            call_count: None,
            call_duration_minutes: minutes,
        }
    }

    #[test]
    fn test_mobile_zone() {
        let rules = ClassificationConfig::default();
        let classified = classify(record(Some("Zone Mobile Nord"), Some("ACME"), Some(10.0)), &rules);

        assert!(classified.is_mobile_zone);
        assert_eq!(classified.bucket, DurationBucket::Mobile);
        assert_eq!(classified.mobile_duration_minutes(), Some(10.0));
        assert_eq!(classified.fixed_duration_minutes(), None);
    }

    #[test]
    fn test_mobile_operator_in_fixed_zone() {
        let rules = ClassificationConfig::default();
        let classified = classify(record(Some("Zone A"), Some("ACME-Mob"), Some(4.0)), &rules);

        assert!(!classified.is_mobile_zone);
        assert_eq!(classified.mobile_duration_minutes(), Some(4.0));
        assert_eq!(classified.fixed_duration_minutes(), None);
    }

    #[test]
    fn test_fixed() {
        let rules = ClassificationConfig::default();
        // Markers are case-sensitive
        let classified = classify(record(Some("zone mobile"), Some("ACME-MOB"), Some(6.0)), &rules);

        assert_eq!(classified.bucket, DurationBucket::Fixed);
        assert_eq!(classified.mobile_duration_minutes(), None);
        assert_eq!(classified.fixed_duration_minutes(), Some(6.0));
    }

    #[test]
    fn test_missing_fields_never_match() {
        let rules = ClassificationConfig::default();
        let classified = classify(record(None, None, None), &rules);

        assert!(!classified.is_mobile_zone);
        assert_eq!(classified.bucket, DurationBucket::Fixed);
        assert_eq!(classified.fixed_duration_minutes(), Some(0.0));
    }

    #[test]
    fn test_exactly_one_bucket_populated() {
        let rules = ClassificationConfig::default();
        let zones = [Some("Zone A"), Some("Mobile"), None];
        let operators = [Some("X"), Some("Y-Mob"), None];
        let minutes = [Some(3.0), None];

        for zone in zones {
            for operator in operators {
                for m in minutes {
                    let c = classify(record(zone, operator, m), &rules);
                    assert!(
                        c.mobile_duration_minutes().is_some() != c.fixed_duration_minutes().is_some(),
                        "zone={:?} operator={:?}",
                        zone,
                        operator
                    );
                }
            }
        }
    }

    #[test]
    fn test_custom_markers() {
        let rules = ClassificationConfig {
            mobile_zone_marker: "GSM".to_string(),
            mobile_operator_marker: "_M".to_string(),
        };
        assert_eq!(
            classify(record(Some("Zone GSM"), Some("X"), Some(1.0)), &rules).bucket,
            DurationBucket::Mobile
        );
        assert_eq!(
            classify(record(Some("Zone Mobile"), Some("X-Mob"), Some(1.0)), &rules).bucket,
            DurationBucket::Fixed
        );
    }
}
