//! Per-type completeness checks.
//!
//! A record failing its check never takes part in matching.

use crate::frame::{FrameRecord, FrameType};

fn has_bias_fields(r: &FrameRecord) -> bool {
    r.setup.is_some()
        && r.readout.is_some()
        && r.gain.is_some()
        && r.offset.is_some()
        && r.usb.is_some()
        && r.binning.is_some()
        && r.temp_c.is_some()
        && r.date.is_some()
}

/// Lights carry every matching field plus the target name.
///
/// The type tag is not checked: anything fed in as a light is treated as one.
pub fn is_valid_light(r: &FrameRecord) -> bool {
    has_bias_fields(r) && r.object.is_some() && r.filter.is_some() && r.exposure_sec.is_some()
}

pub fn is_valid_bias(r: &FrameRecord) -> bool {
    r.frame_type == Some(FrameType::Bias) && has_bias_fields(r)
}

pub fn is_valid_dark(r: &FrameRecord) -> bool {
    r.frame_type == Some(FrameType::Dark) && has_bias_fields(r) && r.exposure_sec.is_some()
}

/// Flats depend on optics only: setup, filter and binning.
pub fn is_valid_flat(r: &FrameRecord) -> bool {
    r.frame_type == Some(FrameType::Flat)
        && r.setup.is_some()
        && r.filter.is_some()
        && r.binning.is_some()
        && r.date.is_some()
}

/// Checks `r` against the rules of its own type tag. Untyped records are invalid.
pub fn is_valid(r: &FrameRecord) -> bool {
    match r.frame_type {
        Some(FrameType::Light) => is_valid_light(r),
        Some(FrameType::Bias) => is_valid_bias(r),
        Some(FrameType::Dark) => is_valid_dark(r),
        Some(FrameType::Flat) => is_valid_flat(r),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bias() -> FrameRecord {
        FrameRecord {
            path: "/masters/bias.xisf".into(),
            frame_type: Some(FrameType::Bias),
            setup: Some("T1_CAM1".into()),
            readout: Some("Normal".into()),
            gain: Some(100),
            offset: Some(10),
            usb: Some(40),
            binning: Some("1x1".into()),
            temp_c: Some(-10),
            date: Some("2024-09-09".into()),
            ..Default::default()
        }
    }

    #[test]
    fn zero_is_a_present_value() {
        let r = FrameRecord {
            gain: Some(0),
            offset: Some(0),
            usb: Some(0),
            temp_c: Some(0),
            ..bias()
        };
        assert!(is_valid_bias(&r));
    }

    #[test]
    fn bias_requires_exact_tag() {
        assert!(is_valid_bias(&bias()));
        let dark_tagged = FrameRecord {
            frame_type: Some(FrameType::Dark),
            ..bias()
        };
        assert!(!is_valid_bias(&dark_tagged));
        assert!(!is_valid_bias(&FrameRecord {
            frame_type: None,
            ..bias()
        }));
    }

    #[test]
    fn each_bias_field_is_mandatory() {
        let cases = [
            FrameRecord { setup: None, ..bias() },
            FrameRecord { readout: None, ..bias() },
            FrameRecord { gain: None, ..bias() },
            FrameRecord { offset: None, ..bias() },
            FrameRecord { usb: None, ..bias() },
            FrameRecord { binning: None, ..bias() },
            FrameRecord { temp_c: None, ..bias() },
            FrameRecord { date: None, ..bias() },
        ];
        for (i, r) in cases.iter().enumerate() {
            assert!(!is_valid_bias(r), "case {i} should be invalid");
        }
    }

    #[test]
    fn dark_needs_exposure() {
        let dark = FrameRecord {
            frame_type: Some(FrameType::Dark),
            ..bias()
        };
        assert!(!is_valid_dark(&dark));
        let dark = FrameRecord {
            exposure_sec: Some(300.0),
            ..dark
        };
        assert!(is_valid_dark(&dark));
        assert!(is_valid(&dark));
    }

    #[test]
    fn flat_ignores_electronic_settings() {
        let flat = FrameRecord {
            path: "/masters/flat_L.xisf".into(),
            frame_type: Some(FrameType::Flat),
            setup: Some("T1_CAM1".into()),
            filter: Some("L".into()),
            binning: Some("1x1".into()),
            date: Some("2024-09-10".into()),
            ..Default::default()
        };
        assert!(is_valid_flat(&flat));
        assert!(!is_valid_flat(&FrameRecord { filter: None, ..flat.clone() }));
        assert!(!is_valid_flat(&FrameRecord { date: None, ..flat }));
    }

    #[test]
    fn light_needs_target_filter_and_exposure() {
        let light = FrameRecord {
            path: "/lights/m31_001.fits".into(),
            object: Some("M31".into()),
            filter: Some("L".into()),
            exposure_sec: Some(300.0),
            ..bias()
        };
        assert!(is_valid_light(&light));
        assert!(!is_valid_light(&FrameRecord { object: None, ..light.clone() }));
        assert!(!is_valid_light(&FrameRecord { filter: None, ..light.clone() }));
        assert!(!is_valid_light(&FrameRecord { exposure_sec: None, ..light }));
    }

    #[test]
    fn untyped_records_are_rejected() {
        assert!(!is_valid(&FrameRecord::default()));
    }
}
