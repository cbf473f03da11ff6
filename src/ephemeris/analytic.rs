//! Closed-form ephemeris.
//!
//! - Sun: Meeus low-precision apparent longitude (about 0.01°)
//! - Moon: main periodic terms of the Meeus lunar theory (about 0.3°)
//! - North node: mean node plus the five largest true-node terms
//! - Planets: JPL approximate Keplerian elements (1800-2050 fit), geocentric
//!   via the Earth-Moon barycenter, precessed to the equinox of date
//!
//! Good enough to place a body in the right line almost everywhere, and to
//! drive the design-moment solver. Not a replacement for a full ephemeris.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{in_supported_range, EphemerisError, EphemerisProvider, Reading};
use crate::mapper::normalize_degrees;
use crate::types::Body;

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// General precession in longitude, degrees per Julian century.
const PRECESSION_DEG_PER_CENTURY: f64 = 1.396_971;

/// Julian day (UT) of an instant.
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Julian centuries since J2000.
pub fn centuries_since_j2000(instant: DateTime<Utc>) -> f64 {
    (julian_day(instant) - J2000) / DAYS_PER_CENTURY
}

fn sin_d(deg: f64) -> f64 {
    deg.to_radians().sin()
}

fn cos_d(deg: f64) -> f64 {
    deg.to_radians().cos()
}

/// Apparent geocentric longitude of the Sun.
pub fn sun_longitude(t: f64) -> f64 {
    let l0 = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
    let m = 357.52911 + 35999.05029 * t - 0.0001537 * t * t;
    let c = (1.914602 - 0.004817 * t - 0.000014 * t * t) * sin_d(m)
        + (0.019993 - 0.000101 * t) * sin_d(2.0 * m)
        + 0.000289 * sin_d(3.0 * m);
    let omega = 125.04 - 1934.136 * t;
    normalize_degrees(l0 + c - 0.00569 - 0.00478 * sin_d(omega))
}

/// Fundamental lunar arguments (degrees).
struct LunarArguments {
    l: f64,
    d: f64,
    m: f64,
    mp: f64,
    f: f64,
}

impl LunarArguments {
    fn at(t: f64) -> Self {
        Self {
            l: 218.3164477 + 481267.88123421 * t,
            d: 297.8501921 + 445267.1114034 * t,
            m: 357.5291092 + 35999.0502909 * t,
            mp: 134.9633964 + 477198.8675055 * t,
            f: 93.2720950 + 483202.0175233 * t,
        }
    }
}

/// Geocentric longitude of the Moon.
pub fn moon_longitude(t: f64) -> f64 {
    let LunarArguments { l, d, m, mp, f } = LunarArguments::at(t);
    let sum = 6.288774 * sin_d(mp)
        + 1.274027 * sin_d(2.0 * d - mp)
        + 0.658314 * sin_d(2.0 * d)
        + 0.213618 * sin_d(2.0 * mp)
        - 0.185116 * sin_d(m)
        - 0.114332 * sin_d(2.0 * f)
        + 0.058793 * sin_d(2.0 * d - 2.0 * mp)
        + 0.057066 * sin_d(2.0 * d - m - mp)
        + 0.053322 * sin_d(2.0 * d + mp)
        + 0.045758 * sin_d(2.0 * d - m)
        - 0.040923 * sin_d(m - mp)
        - 0.034720 * sin_d(d)
        - 0.030383 * sin_d(m + mp);
    normalize_degrees(l + sum)
}

/// Longitude of the true ascending lunar node.
pub fn true_node_longitude(t: f64) -> f64 {
    let LunarArguments { d, m, mp, f, .. } = LunarArguments::at(t);
    let mean = 125.0445479 - 1934.1362891 * t + 0.0020754 * t * t + t * t * t / 467_441.0
        - t * t * t * t / 60_616_000.0;
    let correction = -1.4979 * sin_d(2.0 * (d - f)) - 0.1500 * sin_d(m) - 0.1226 * sin_d(2.0 * d)
        + 0.1176 * sin_d(2.0 * f)
        - 0.0801 * sin_d(2.0 * (mp - f));
    normalize_degrees(mean + correction)
}

/// Keplerian elements at J2000 and their rates per century.
///
/// Fields: a (AU), e, I, L, longitude of perihelion, longitude of node
/// (degrees).
#[derive(Debug, Clone, Copy)]
struct Elements {
    base: [f64; 6],
    rate: [f64; 6],
}

const MERCURY: Elements = Elements {
    base: [0.38709927, 0.20563593, 7.00497902, 252.25032350, 77.45779628, 48.33076593],
    rate: [0.00000037, 0.00001906, -0.00594749, 149472.67411175, 0.16047689, -0.12534081],
};
const VENUS: Elements = Elements {
    base: [0.72333566, 0.00677672, 3.39467605, 181.97909950, 131.60246718, 76.67984255],
    rate: [0.00000390, -0.00004107, -0.00078890, 58517.81538729, 0.00268329, -0.27769418],
};
const EARTH_MOON_BARYCENTER: Elements = Elements {
    base: [1.00000261, 0.01671123, -0.00001531, 100.46457166, 102.93768193, 0.0],
    rate: [0.00000562, -0.00004392, -0.01294668, 35999.37244981, 0.32327364, 0.0],
};
const MARS: Elements = Elements {
    base: [1.52371034, 0.09339410, 1.84969142, -4.55343205, -23.94362959, 49.55953891],
    rate: [0.00001847, 0.00007882, -0.00813131, 19140.30268499, 0.44441088, -0.29257343],
};
const JUPITER: Elements = Elements {
    base: [5.20288700, 0.04838624, 1.30439695, 34.39644051, 14.72847983, 100.47390909],
    rate: [-0.00011607, -0.00013253, -0.00183714, 3034.74612775, 0.21252668, 0.20469106],
};
const SATURN: Elements = Elements {
    base: [9.53667594, 0.05386179, 2.48599187, 49.95424423, 92.59887831, 113.66242448],
    rate: [-0.00125060, -0.00050991, 0.00193609, 1222.49362201, -0.41897216, -0.28867794],
};
const URANUS: Elements = Elements {
    base: [19.18916464, 0.04725744, 0.77263783, 313.23810451, 170.95427630, 74.01692503],
    rate: [-0.00196176, -0.00004397, -0.00242939, 428.48202785, 0.40805281, 0.04240589],
};
const NEPTUNE: Elements = Elements {
    base: [30.06992276, 0.00859048, 1.77004347, -55.12002969, 44.96476227, 131.78422574],
    rate: [0.00026291, 0.00005105, 0.00035372, 218.45945325, -0.32241464, -0.00508664],
};
const PLUTO: Elements = Elements {
    base: [39.48211675, 0.24882730, 17.14001206, 238.92903833, 224.06891629, 110.30393684],
    rate: [-0.00031596, 0.00005170, 0.00004818, 145.20780515, -0.04062942, -0.01183482],
};

const KEPLER_MAX_ITERATIONS: usize = 30;
const KEPLER_TOLERANCE: f64 = 1e-12;

impl Elements {
    /// Heliocentric ecliptic coordinates (J2000 frame) at `t` centuries.
    fn heliocentric(&self, t: f64) -> [f64; 3] {
        let at = |i: usize| self.base[i] + self.rate[i] * t;
        let (a, e, incl, l, peri, node) = (at(0), at(1), at(2), at(3), at(4), at(5));

        let omega = peri - node;
        let mean_anomaly = (l - peri + 180.0).rem_euclid(360.0) - 180.0;

        let m = mean_anomaly.to_radians();
        let mut ecc = m + e * m.sin();
        for _ in 0..KEPLER_MAX_ITERATIONS {
            let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
            ecc -= delta;
            if delta.abs() < KEPLER_TOLERANCE {
                break;
            }
        }

        let xp = a * (ecc.cos() - e);
        let yp = a * (1.0 - e * e).sqrt() * ecc.sin();

        let (so, co) = (sin_d(omega), cos_d(omega));
        let (sn, cn) = (sin_d(node), cos_d(node));
        let (si, ci) = (sin_d(incl), cos_d(incl));

        [
            (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
            (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
            (so * si) * xp + (co * si) * yp,
        ]
    }
}

/// Geocentric longitude of a planet, equinox of date.
fn planet_longitude(elements: &Elements, t: f64) -> f64 {
    let p = elements.heliocentric(t);
    let earth = EARTH_MOON_BARYCENTER.heliocentric(t);
    let (x, y) = (p[0] - earth[0], p[1] - earth[1]);
    normalize_degrees(y.atan2(x).to_degrees() + PRECESSION_DEG_PER_CENTURY * t)
}

/// Local closed-form ephemeris. Pure and infallible inside the supported
/// range.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }

    /// Synchronous longitude computation.
    pub fn compute(&self, instant: DateTime<Utc>, body: Body) -> Result<f64, EphemerisError> {
        if !in_supported_range(instant) {
            return Err(EphemerisError::OutOfRange { body, instant });
        }

        let t = centuries_since_j2000(instant);
        let longitude = match body {
            Body::Sun => sun_longitude(t),
            Body::Earth => normalize_degrees(sun_longitude(t) + 180.0),
            Body::Moon => moon_longitude(t),
            Body::NorthNode => true_node_longitude(t),
            Body::SouthNode => normalize_degrees(true_node_longitude(t) + 180.0),
            Body::Mercury => planet_longitude(&MERCURY, t),
            Body::Venus => planet_longitude(&VENUS, t),
            Body::Mars => planet_longitude(&MARS, t),
            Body::Jupiter => planet_longitude(&JUPITER, t),
            Body::Saturn => planet_longitude(&SATURN, t),
            Body::Uranus => planet_longitude(&URANUS, t),
            Body::Neptune => planet_longitude(&NEPTUNE, t),
            Body::Pluto => planet_longitude(&PLUTO, t),
        };
        Ok(longitude)
    }
}

#[async_trait]
impl EphemerisProvider for AnalyticEphemeris {
    async fn longitude(&self, instant: DateTime<Utc>, body: Body) -> Result<Reading, EphemerisError> {
        self.compute(instant, body).map(Reading::exact)
    }

    fn name(&self) -> &str {
        "analytic"
    }
}
