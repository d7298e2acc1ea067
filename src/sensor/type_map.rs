//! Bijective mapping between platform (AP) and CHRE sensor type constants.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ValidationError;

/// CHRE sensor type constants, see `chre_api/include/chre_api/chre/sensor_types.h`.
pub mod chre {
    pub const ACCELEROMETER: i32 = 1;
    pub const GYROSCOPE: i32 = 6;
    pub const GEOMAGNETIC_FIELD: i32 = 8;
    pub const PRESSURE: i32 = 10;
    pub const LIGHT: i32 = 12;
    pub const PROXIMITY: i32 = 13;
    pub const STEP_COUNTER: i32 = 24;
}

const STANDARD_PAIRS: [(i32, i32); 7] = [
    (1, chre::ACCELEROMETER),
    (4, chre::GYROSCOPE),
    (2, chre::GEOMAGNETIC_FIELD),
    (6, chre::PRESSURE),
    (5, chre::LIGHT),
    (8, chre::PROXIMITY),
    (19, chre::STEP_COUNTER),
];

/// One-to-one table with forward (AP to CHRE) and inverse lookup.
#[derive(Debug, Clone)]
pub struct SensorTypeMap {
    forward: HashMap<i32, i32>,
    inverse: HashMap<i32, i32>,
}

impl SensorTypeMap {
    /// Build a map, rejecting duplicate keys on either side.
    pub fn from_pairs(pairs: &[(i32, i32)]) -> Result<Self, ValidationError> {
        let mut forward = HashMap::with_capacity(pairs.len());
        let mut inverse = HashMap::with_capacity(pairs.len());
        for &(ap, chre) in pairs {
            if forward.insert(ap, chre).is_some() {
                return Err(ValidationError::InvalidTypeMap(format!(
                    "duplicate AP sensor type {}",
                    ap
                )));
            }
            if inverse.insert(chre, ap).is_some() {
                return Err(ValidationError::InvalidTypeMap(format!(
                    "duplicate CHRE sensor type {}",
                    chre
                )));
            }
        }
        Ok(Self { forward, inverse })
    }

    /// The table for every sensor type this crate knows how to compare.
    pub fn standard() -> &'static SensorTypeMap {
        static MAP: OnceLock<SensorTypeMap> = OnceLock::new();
        // STANDARD_PAIRS is a constant with no duplicates on either side.
        MAP.get_or_init(|| {
            Self::from_pairs(&STANDARD_PAIRS).expect("Failed to build standard sensor map")
        })
    }

    pub fn to_chre(&self, ap_type: i32) -> Option<i32> {
        self.forward.get(&ap_type).copied()
    }

    pub fn to_ap(&self, chre_type: i32) -> Option<i32> {
        self.inverse.get(&chre_type).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorType;

    #[test]
    fn test_standard_pairs_form_a_valid_map() {
        let map = SensorTypeMap::from_pairs(&STANDARD_PAIRS).unwrap();
        assert_eq!(map.len(), STANDARD_PAIRS.len());
    }

    #[test]
    fn test_standard_covers_every_sensor_type() {
        let map = SensorTypeMap::standard();
        assert_eq!(map.len(), SensorType::ALL.len());
        for t in SensorType::ALL {
            let chre = map.to_chre(t.ap_type()).unwrap();
            assert_eq!(map.to_ap(chre), Some(t.ap_type()));
        }
    }

    #[test]
    fn test_gyroscope_codes_differ_between_sides() {
        let map = SensorTypeMap::standard();
        assert_eq!(map.to_chre(SensorType::Gyroscope.ap_type()), Some(chre::GYROSCOPE));
        assert_eq!(map.to_ap(chre::PROXIMITY), Some(SensorType::Proximity.ap_type()));
        assert_eq!(map.to_ap(99), None);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        assert!(SensorTypeMap::from_pairs(&[(1, 1), (1, 2)]).is_err());
        assert!(SensorTypeMap::from_pairs(&[(1, 1), (2, 1)]).is_err());
        assert!(SensorTypeMap::from_pairs(&[]).unwrap().is_empty());
    }
}
