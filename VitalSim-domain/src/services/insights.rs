use crate::entities::vitals::{BloodPressureCategory, VitalsReading};

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

impl VitalsReading {
    /// Blood pressure category of this reading
    pub fn blood_pressure_category(&self) -> BloodPressureCategory {
        categorize_blood_pressure(self.systolic, self.diastolic)
    }
}
