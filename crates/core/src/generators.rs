//! Value generators for individual record fields.
//!
//! Each generator takes the random source explicitly and returns one typed value inside a
//! documented inclusive range. Decimal values are rounded at generation time so the
//! stored value is exactly what a document shows.

use crate::constants::{CM_PER_INCH, KG_PER_LB};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rounds to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, places: i32) -> f64 {
    round_to(rng.gen_range(min..=max), places)
}

macro_rules! display_serialize {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

/// An SSN-shaped identifier, `NNN-NN-NNNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialSecurityNumber {
    area: u16,
    group: u8,
    serial: u16,
}

impl SocialSecurityNumber {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            area: rng.gen_range(100..=999),
            group: rng.gen_range(10..=99),
            serial: rng.gen_range(1000..=9999),
        }
    }
}

impl fmt::Display for SocialSecurityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.area, self.group, self.serial)
    }
}

display_serialize!(SocialSecurityNumber);

/// A medical record number, `MRN-NNNNNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedicalRecordNumber(u32);

impl MedicalRecordNumber {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(100_000..=999_999))
    }

    /// The six digits without the `MRN-` prefix.
    pub fn digits(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for MedicalRecordNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MRN-{}", self.0)
    }
}

display_serialize!(MedicalRecordNumber);

/// A 10-digit National Provider Identifier. No Luhn check digit is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npi(u64);

impl Npi {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(1_000_000_000..=9_999_999_999))
    }
}

impl fmt::Display for Npi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

display_serialize!(Npi);

/// Supplemental oxygen at the time SpO2 was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OxygenDelivery {
    #[serde(rename = "2L NC")]
    TwoLitresNasalCannula,
    #[serde(rename = "3L NC")]
    ThreeLitresNasalCannula,
    #[serde(rename = "4L NC")]
    FourLitresNasalCannula,
    #[serde(rename = "Room air")]
    RoomAir,
}

impl OxygenDelivery {
    pub const ALL: [OxygenDelivery; 4] = [
        OxygenDelivery::TwoLitresNasalCannula,
        OxygenDelivery::ThreeLitresNasalCannula,
        OxygenDelivery::FourLitresNasalCannula,
        OxygenDelivery::RoomAir,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OxygenDelivery::TwoLitresNasalCannula => "2L NC",
            OxygenDelivery::ThreeLitresNasalCannula => "3L NC",
            OxygenDelivery::FourLitresNasalCannula => "4L NC",
            OxygenDelivery::RoomAir => "Room air",
        }
    }
}

/// Admission vital signs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vitals {
    pub systolic: u16,
    pub diastolic: u16,
    pub heart_rate: u16,
    /// Degrees Fahrenheit, 1 dp
    pub temperature_f: f64,
    pub respiratory_rate: u16,
    pub spo2: u8,
    pub oxygen_delivery: OxygenDelivery,
    /// Out of 10
    pub pain: u8,
}

impl Vitals {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            systolic: rng.gen_range(135..=170),
            diastolic: rng.gen_range(70..=100),
            heart_rate: rng.gen_range(75..=115),
            temperature_f: uniform(rng, 97.5, 99.8, 1),
            respiratory_rate: rng.gen_range(16..=26),
            spo2: rng.gen_range(88..=96),
            oxygen_delivery: *OxygenDelivery::ALL
                .choose(rng)
                .unwrap_or(&OxygenDelivery::RoomAir),
            pain: rng.gen_range(3..=9),
        }
    }

    pub fn blood_pressure(&self) -> String {
        format!("{}/{}", self.systolic, self.diastolic)
    }
}

/// Weight and height, with the metric values derived from the sampled imperial ones.
///
/// BMI is never stored: [`Anthropometrics::bmi`] computes it from the recorded metric
/// values, so it cannot drift from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anthropometrics {
    pub weight_lb: u16,
    /// `weight_lb * 0.453592`, 1 dp
    pub weight_kg: f64,
    pub height_in: u16,
    /// `height_in * 2.54`, 1 dp
    pub height_cm: f64,
}

impl Anthropometrics {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_imperial(rng.gen_range(140..=280), rng.gen_range(60..=76))
    }

    pub fn from_imperial(weight_lb: u16, height_in: u16) -> Self {
        Self {
            weight_lb,
            weight_kg: round_to(f64::from(weight_lb) * KG_PER_LB, 1),
            height_in,
            height_cm: round_to(f64::from(height_in) * CM_PER_INCH, 1),
        }
    }

    /// Body-mass index, kg/m², from the recorded metric values.
    pub fn bmi(&self) -> f64 {
        let metres = self.height_cm / 100.0;
        self.weight_kg / (metres * metres)
    }

    /// Height as feet and inches, e.g. `5'9"`.
    pub fn height_feet_inches(&self) -> String {
        format!("{}'{}\"", self.height_in / 12, self.height_in % 12)
    }
}

/// Complete blood count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteBloodCount {
    /// K/µL
    pub wbc: f64,
    /// g/dL
    pub hemoglobin: f64,
    /// %
    pub hematocrit: f64,
    /// K/µL
    pub platelets: u16,
}

impl CompleteBloodCount {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            wbc: uniform(rng, 6.5, 15.2, 1),
            hemoglobin: uniform(rng, 10.5, 15.8, 1),
            hematocrit: uniform(rng, 32.0, 47.5, 1),
            platelets: rng.gen_range(150..=380),
        }
    }
}

/// Basic metabolic panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicMetabolicPanel {
    pub sodium: u16,
    pub potassium: f64,
    pub chloride: u16,
    pub co2: u16,
    pub bun: u16,
    pub creatinine: f64,
    pub glucose: u16,
    pub egfr: u16,
}

impl BasicMetabolicPanel {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            sodium: rng.gen_range(135..=145),
            potassium: uniform(rng, 3.5, 5.2, 1),
            chloride: rng.gen_range(98..=108),
            co2: rng.gen_range(20..=28),
            bun: rng.gen_range(15..=45),
            creatinine: uniform(rng, 0.9, 2.1, 1),
            glucose: rng.gen_range(95..=245),
            egfr: rng.gen_range(35..=75),
        }
    }
}

/// Cardiac markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardiacMarkers {
    /// ng/mL, 2 dp
    pub troponin_i: f64,
    /// ng/mL
    pub ck_mb: f64,
    /// pg/mL
    pub bnp: u16,
}

impl CardiacMarkers {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            troponin_i: uniform(rng, 0.40, 2.50, 2),
            ck_mb: uniform(rng, 5.0, 15.0, 1),
            bnp: rng.gen_range(200..=650),
        }
    }
}

/// Lipid panel, mg/dL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LipidPanel {
    pub total_cholesterol: u16,
    pub ldl: u16,
    pub hdl: u16,
    pub triglycerides: u16,
}

impl LipidPanel {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            total_cholesterol: rng.gen_range(180..=280),
            ldl: rng.gen_range(100..=180),
            hdl: rng.gen_range(30..=60),
            triglycerides: rng.gen_range(120..=280),
        }
    }
}

/// A BMI-like figure embedded in the obesity diagnosis, 28.0-40.9.
pub fn obesity_bmi_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}.{}", rng.gen_range(28..=40), rng.gen_range(0..=9))
}

/// Room assignment such as `3B-317`.
pub fn room_assignment<R: Rng + ?Sized>(rng: &mut R) -> String {
    const UNITS: [&str; 6] = ["2A", "2B", "3A", "3B", "4A", "4B"];
    let unit = UNITS.choose(rng).copied().unwrap_or("2A");
    format!("{unit}-{}", rng.gen_range(201..=499))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::make_rng;

    fn in_range(value: f64, min: f64, max: f64) -> bool {
        value >= min - 1e-9 && value <= max + 1e-9
    }

    #[test]
    fn test_identifier_shapes() {
        for seed in 0..100 {
            let mut rng = make_rng(seed, "ids");
            let ssn = SocialSecurityNumber::generate(&mut rng).to_string();
            let parts: Vec<&str> = ssn.split('-').collect();
            assert_eq!(
                parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
                vec![3, 2, 4]
            );

            let mrn = MedicalRecordNumber::generate(&mut rng);
            assert!(mrn.to_string().starts_with("MRN-"));
            assert_eq!(mrn.digits().len(), 6);

            let npi = Npi::generate(&mut rng).to_string();
            assert_eq!(npi.len(), 10);
            assert!(npi.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_identifiers_serialize_as_display() {
        let mrn = MedicalRecordNumber(123456);
        assert_eq!(serde_json::to_string(&mrn).unwrap(), "\"MRN-123456\"");
    }

    #[test]
    fn test_vitals_ranges() {
        for seed in 0..300 {
            let mut rng = make_rng(seed, "vitals");
            let v = Vitals::generate(&mut rng);
            assert!((135..=170).contains(&v.systolic));
            assert!((70..=100).contains(&v.diastolic));
            assert!((75..=115).contains(&v.heart_rate));
            assert!(in_range(v.temperature_f, 97.5, 99.8));
            assert!((16..=26).contains(&v.respiratory_rate));
            assert!((88..=96).contains(&v.spo2));
            assert!((3..=9).contains(&v.pain));
        }
    }

    #[test]
    fn test_bmi_consistent_with_recorded_values() {
        for seed in 0..300 {
            let mut rng = make_rng(seed, "body");
            let a = Anthropometrics::generate(&mut rng);
            assert!((140..=280).contains(&a.weight_lb));
            assert!((60..=76).contains(&a.height_in));
            let kg = f64::from(a.weight_lb) * 0.453592;
            let cm = f64::from(a.height_in) * 2.54;
            assert!((a.weight_kg - kg).abs() <= 0.05 + 1e-9);
            assert!((a.height_cm - cm).abs() <= 0.05 + 1e-9);
            // Rounding both inputs to 1 dp moves BMI by well under 0.1.
            let unrounded_bmi = kg / (cm / 100.0).powi(2);
            assert!((a.bmi() - unrounded_bmi).abs() < 0.1);
        }
    }

    #[test]
    fn test_bmi_for_known_body() {
        let body = Anthropometrics::from_imperial(200, 70);
        assert_eq!(body.weight_kg, 90.7);
        assert_eq!(body.height_cm, 177.8);
        assert!((body.bmi() - 28.69).abs() < 0.01);
    }

    #[test]
    fn test_height_feet_inches() {
        assert_eq!(Anthropometrics::from_imperial(180, 69).height_feet_inches(), "5'9\"");
        assert_eq!(Anthropometrics::from_imperial(180, 72).height_feet_inches(), "6'0\"");
    }

    #[test]
    fn test_lab_ranges() {
        for seed in 0..300 {
            let mut rng = make_rng(seed, "labs");
            let cbc = CompleteBloodCount::generate(&mut rng);
            assert!(in_range(cbc.wbc, 6.5, 15.2));
            assert!(in_range(cbc.hemoglobin, 10.5, 15.8));
            assert!(in_range(cbc.hematocrit, 32.0, 47.5));
            assert!((150..=380).contains(&cbc.platelets));

            let bmp = BasicMetabolicPanel::generate(&mut rng);
            assert!((135..=145).contains(&bmp.sodium));
            assert!(in_range(bmp.potassium, 3.5, 5.2));
            assert!(in_range(bmp.creatinine, 0.9, 2.1));
            assert!((95..=245).contains(&bmp.glucose));
            assert!((35..=75).contains(&bmp.egfr));

            let cardiac = CardiacMarkers::generate(&mut rng);
            assert!(in_range(cardiac.troponin_i, 0.40, 2.50));
            assert_eq!(round_to(cardiac.troponin_i, 2), cardiac.troponin_i);
            assert!(in_range(cardiac.ck_mb, 5.0, 15.0));
            assert!((200..=650).contains(&cardiac.bnp));

            let lipids = LipidPanel::generate(&mut rng);
            assert!((180..=280).contains(&lipids.total_cholesterol));
            assert!((30..=60).contains(&lipids.hdl));
        }
    }

    #[test]
    fn test_obesity_bmi_label_range() {
        for seed in 0..100 {
            let mut rng = make_rng(seed, "obesity");
            let value: f64 = obesity_bmi_label(&mut rng).parse().unwrap();
            assert!(in_range(value, 28.0, 40.9));
        }
    }
}
