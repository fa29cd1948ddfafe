//! Reference ellipsoids of the two frames the converter works in.

/// Rotational ellipsoid given by semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in metres.
    pub a: f64,
    pub inv_f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        inv_f: 298.257223563,
    };

    /// Krassovsky 1942, the ellipsoid of the local systems.
    pub const KRASSOVSKY: Ellipsoid = Ellipsoid {
        a: 6378245.0,
        inv_f: 298.3,
    };

    pub const KRASSOVSKY_NAME: &'static str = "Krassovsky, 1942";

    pub fn new(a: f64, inv_f: f64) -> Self {
        Self { a, inv_f }
    }

    /// PROJ ellipsoid parameters, using the built-in names where PROJ has
    /// them.
    pub fn proj_params(&self) -> String {
        if *self == Self::WGS84 {
            "+ellps=WGS84".to_string()
        } else if *self == Self::KRASSOVSKY {
            "+ellps=krass".to_string()
        } else {
            format!("+a={} +rf={}", self.a, self.inv_f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ellipsoids_use_proj_names() {
        assert_eq!(Ellipsoid::WGS84.proj_params(), "+ellps=WGS84");
        assert_eq!(Ellipsoid::KRASSOVSKY.proj_params(), "+ellps=krass");
        assert_eq!(
            Ellipsoid::new(6378140.0, 298.257).proj_params(),
            "+a=6378140 +rf=298.257"
        );
    }
}
