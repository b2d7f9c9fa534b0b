use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{positive, PlanError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DoseInputs {
    pub dose_l_ha: f64,
    pub nozzle_rate_l_min: f64,
    pub nozzle_count: u32,
    pub spray_width_m: f64,
    pub parcel_width_m: f64,
    pub parcel_height_m: f64,
    pub parcels_to_spray: usize,
}

/// Every intermediate of the ground speed calculation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DoseBreakdown {
    pub applied_area_m2: f64,
    pub required_liquid_l: f64,
    /// Liquid for one pass along the parcel height.
    pub liquid_per_pass_l: f64,
    pub flow_l_min: f64,
    pub flow_l_s: f64,
    pub time_per_pass_s: f64,
    pub ground_speed_m_s: f64,
    pub ground_speed_km_h: f64,
}

pub fn dose_breakdown(inputs: &DoseInputs) -> Result<DoseBreakdown, PlanError> {
    let dose = positive("dose_l_ha", inputs.dose_l_ha)?;
    let nozzle_rate = positive("nozzle_rate_l_min", inputs.nozzle_rate_l_min)?;
    let nozzle_count = positive("nozzle_count", inputs.nozzle_count as f64)?;
    let spray_width = positive("spray_width_m", inputs.spray_width_m)?;
    let parcel_width = positive("parcel_width_m", inputs.parcel_width_m)?;
    let parcel_height = positive("parcel_height_m", inputs.parcel_height_m)?;
    let parcels = positive("parcels_to_spray", inputs.parcels_to_spray as f64)?;

    let applied_area_m2 = parcels * parcel_width * parcel_height;
    let required_liquid_l = dose * applied_area_m2 / 10_000.0;
    let liquid_per_pass_l = required_liquid_l / (parcels * parcel_width / spray_width);
    let flow_l_min = nozzle_rate * nozzle_count;
    let flow_l_s = flow_l_min / 60.0;
    let time_per_pass_s = liquid_per_pass_l / flow_l_s;
    let ground_speed_m_s = parcel_height / time_per_pass_s;

    let breakdown = DoseBreakdown {
        applied_area_m2,
        required_liquid_l,
        liquid_per_pass_l,
        flow_l_min,
        flow_l_s,
        time_per_pass_s,
        ground_speed_m_s,
        ground_speed_km_h: ground_speed_m_s * 3.6,
    };
    debug!("dose breakdown {:?}", breakdown);
    Ok(breakdown)
}

/// Ground speed in m/s that delivers `dose_l_ha` with the given nozzles.
pub fn required_speed(
    dose_l_ha: f64,
    nozzle_rate_l_min: f64,
    nozzle_count: u32,
    spray_width_m: f64,
    parcel_width_m: f64,
    parcel_height_m: f64,
    parcels_to_spray: usize,
) -> Result<f64, PlanError> {
    dose_breakdown(&DoseInputs {
        dose_l_ha,
        nozzle_rate_l_min,
        nozzle_count,
        spray_width_m,
        parcel_width_m,
        parcel_height_m,
        parcels_to_spray,
    })
    .map(|b| b.ground_speed_m_s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_speed() {
        let speed = required_speed(300.0, 0.8, 4, 1.5, 3.0, 5.0, 1).unwrap();
        // 0.225 L per pass at 3.2 L/min takes 4.21875 s over 5 m.
        assert!((speed - 5.0 / 4.21875).abs() < 1e-9, "{}", speed);
        assert!(speed.is_finite() && speed > 0.0);
        assert_eq!(speed, required_speed(300.0, 0.8, 4, 1.5, 3.0, 5.0, 1).unwrap());
    }

    #[test]
    fn breakdown_intermediates() {
        let b = dose_breakdown(&DoseInputs {
            dose_l_ha: 300.0,
            nozzle_rate_l_min: 0.8,
            nozzle_count: 4,
            spray_width_m: 1.5,
            parcel_width_m: 3.0,
            parcel_height_m: 5.0,
            parcels_to_spray: 1,
        })
        .unwrap();
        assert!((b.applied_area_m2 - 15.0).abs() < 1e-12);
        assert!((b.required_liquid_l - 0.45).abs() < 1e-12);
        assert!((b.liquid_per_pass_l - 0.225).abs() < 1e-12);
        assert!((b.flow_l_min - 3.2).abs() < 1e-12);
        assert!((b.ground_speed_km_h - b.ground_speed_m_s * 3.6).abs() < 1e-12);
    }

    #[test]
    fn speed_independent_of_parcel_count() {
        let one = required_speed(300.0, 0.8, 4, 1.5, 3.0, 5.0, 1).unwrap();
        let many = required_speed(300.0, 0.8, 4, 1.5, 3.0, 5.0, 7).unwrap();
        assert!((one - many).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let cases = [
            (0.0, 0.8, 4, 1.5, "dose_l_ha"),
            (300.0, -0.8, 4, 1.5, "nozzle_rate_l_min"),
            (300.0, 0.8, 0, 1.5, "nozzle_count"),
            (300.0, 0.8, 4, 0.0, "spray_width_m"),
        ];
        for (dose, rate, count, width, field) in cases {
            match required_speed(dose, rate, count, width, 3.0, 5.0, 1) {
                Err(PlanError::InvalidInput { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidInput for {}, got {:?}", field, other),
            }
        }
        assert!(matches!(
            required_speed(300.0, 0.8, 4, 1.5, 3.0, 5.0, 0),
            Err(PlanError::InvalidInput { name: "parcels_to_spray", .. })
        ));
    }
}
