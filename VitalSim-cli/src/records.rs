//! Mapping from patients and readings to metric points

use chrono::{DateTime, Utc};
use vital_sim_data::MetricPoint;
use vital_sim_domain::{PatientProfile, VitalsReading};

/// Measurement holding one reading per patient per tick
pub const VITALS_MEASUREMENT: &str = "patient_vitals";

/// Measurement holding the configured ranges of each patient
pub const METADATA_MEASUREMENT: &str = "patient_metadata";

fn tagged(measurement: &str, profile: &PatientProfile) -> MetricPoint {
    MetricPoint::new(measurement)
        .tag("patient_id", profile.id.as_str())
        .tag("patient_name", profile.name.as_str())
        .tag("condition", profile.condition.as_str())
}

/// Point for one generated reading
pub fn vitals_point(
    profile: &PatientProfile,
    reading: &VitalsReading,
    timestamp: DateTime<Utc>,
) -> MetricPoint {
    tagged(VITALS_MEASUREMENT, profile)
        .field("pulse", reading.pulse)
        .field("spo2", reading.spo2)
        .field("bp_systolic", reading.systolic)
        .field("bp_diastolic", reading.diastolic)
        .timestamp(timestamp)
}

/// Point describing a patient's configured ranges; stamped by the server
pub fn metadata_point(profile: &PatientProfile) -> MetricPoint {
    tagged(METADATA_MEASUREMENT, profile)
        .field("bp_min", profile.systolic_range.min)
        .field("bp_max", profile.systolic_range.max)
        .field("spo2_min", profile.spo2_range.min)
        .field("spo2_max", profile.spo2_range.max)
        .field("pulse_min", profile.pulse_range.min)
        .field("pulse_max", profile.pulse_range.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vital_sim_data::FieldValue;
    use vital_sim_domain::{Condition, PatientRoster};

    fn pneumonia_patient() -> PatientProfile {
        PatientRoster::default().get("P003").cloned().unwrap()
    }

    #[test]
    fn test_vitals_point_line_protocol() {
        let profile = pneumonia_patient();
        let reading = VitalsReading {
            pulse: 112,
            spo2: 88.4,
            systolic: 121,
            diastolic: 80,
            condition: Condition::Pneumonia,
        };
        let timestamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let line = vitals_point(&profile, &reading, timestamp)
            .to_line_protocol()
            .unwrap();

        assert_eq!(
            line,
            "patient_vitals,condition=Pneumonia,patient_id=P003,patient_name=Patient3 \
             bp_diastolic=80i,bp_systolic=121i,pulse=112i,spo2=88.4 1700000000000000000"
        );
    }

    #[test]
    fn test_metadata_point_fields() {
        let profile = pneumonia_patient();
        let point = metadata_point(&profile);

        assert_eq!(point.measurement, METADATA_MEASUREMENT);
        assert!(point.timestamp.is_none());
        assert_eq!(point.tags["condition"], "Pneumonia");
        assert_eq!(point.fields["bp_min"], FieldValue::Integer(110));
        assert_eq!(point.fields["bp_max"], FieldValue::Integer(130));
        assert_eq!(point.fields["spo2_min"], FieldValue::Float(85.0));
        assert_eq!(point.fields["pulse_max"], FieldValue::Integer(130));
    }
}
