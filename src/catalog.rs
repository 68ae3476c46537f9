//! The fixed, ordered set of bodies the scenes render and the selector indexes.

/// Number of catalog entries.
pub const BODY_COUNT: usize = 10;

/// Texture id of the panorama behind the overview.
pub const BACKGROUND_TEXTURE_ID: &str = "background";

/// Index of Earth, the Moon's parent.
pub const EARTH: usize = 3;

/// Index of the Moon.
pub const MOON: usize = 4;

/// A secondary orbit around the point reached by the primary one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Satellite {
    /// Distance from the parent, before global scaling.
    pub offset: f32,
    /// Degrees per clock unit.
    pub speed: f32,
}

/// One catalog entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    pub name: &'static str,
    /// Identifier passed to the texture source.
    pub texture_id: &'static str,
    /// Colour used when the texture is unavailable.
    pub color: [f32; 4],
    pub orbit_radius: f32,
    /// Visual radius, before global scaling.
    pub size: f32,
    /// Degrees per clock unit around the vertical axis.
    pub orbit_speed: f32,
    /// Axial spin in degrees per clock unit.
    pub spin: f32,
    pub satellite: Option<Satellite>,
}

const fn planet(
    name: &'static str,
    texture_id: &'static str,
    color: [f32; 4],
    orbit_radius: f32,
    size: f32,
    orbit_speed: f32,
) -> BodySpec {
    BodySpec {
        name,
        texture_id,
        color,
        orbit_radius,
        size,
        orbit_speed,
        spin: 1.0,
        satellite: None,
    }
}

/// Sun, Mercury, Venus, Earth, Moon, Mars, Jupiter, Saturn, Uranus, Neptune.
pub const CATALOG: [BodySpec; BODY_COUNT] = [
    planet("Sun", "sun", [1.0, 1.0, 0.0, 1.0], 0.0, 0.5, 0.0),
    planet("Mercury", "mercury", [0.7, 0.7, 0.7, 1.0], 0.8, 0.10, 4.0),
    planet("Venus", "venus", [1.0, 0.6, 0.1, 1.0], 1.2, 0.15, 3.0),
    planet("Earth", "earth", [0.0, 0.5, 1.0, 1.0], 1.6, 0.18, 2.0),
    BodySpec {
        name: "Moon",
        texture_id: "moon",
        color: [0.85, 0.85, 0.85, 1.0],
        orbit_radius: 1.6,
        size: 0.08,
        orbit_speed: 2.0,
        spin: 0.0,
        satellite: Some(Satellite {
            offset: 0.3,
            speed: 4.0,
        }),
    },
    planet("Mars", "mars", [1.0, 0.3, 0.2, 1.0], 2.2, 0.14, 1.6),
    planet("Jupiter", "jupiter", [1.0, 0.8, 0.5, 1.0], 2.8, 0.30, 1.2),
    planet("Saturn", "saturn", [1.0, 1.0, 0.6, 1.0], 3.6, 0.26, 1.0),
    planet("Uranus", "uranus", [0.5, 1.0, 1.0, 1.0], 4.0, 0.22, 0.8),
    planet("Neptune", "neptune", [0.3, 0.3, 1.0, 1.0], 4.4, 0.20, 0.6),
];

/// Returns the entry at `index`, if any.
pub fn body(index: usize) -> Option<&'static BodySpec> {
    CATALOG.get(index)
}

/// Looks an entry up by its texture id.
pub fn by_texture_id(id: &str) -> Option<&'static BodySpec> {
    CATALOG.iter().find(|b| b.texture_id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_fixed() {
        let names: Vec<_> = CATALOG.iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            [
                "Sun", "Mercury", "Venus", "Earth", "Moon", "Mars", "Jupiter", "Saturn", "Uranus",
                "Neptune"
            ]
        );
    }

    #[test]
    fn sun_is_stationary_and_only_moon_has_a_satellite_orbit() {
        assert_eq!(CATALOG[0].orbit_radius, 0.0);
        assert_eq!(CATALOG[0].orbit_speed, 0.0);

        for (i, body) in CATALOG.iter().enumerate() {
            assert_eq!(body.satellite.is_some(), i == MOON, "{}", body.name);
            assert!(body.size > 0.0);
            assert!(body.orbit_radius >= 0.0);
        }
    }

    #[test]
    fn moon_follows_earth() {
        let earth = CATALOG[EARTH];
        let moon = CATALOG[MOON];
        assert_eq!(moon.orbit_radius, earth.orbit_radius);
        assert_eq!(moon.orbit_speed, earth.orbit_speed);
    }

    #[test]
    fn lookup_by_texture_id() {
        assert_eq!(by_texture_id("saturn").map(|b| b.name), Some("Saturn"));
        assert!(by_texture_id(BACKGROUND_TEXTURE_ID).is_none());
        assert!(body(BODY_COUNT).is_none());
    }
}
