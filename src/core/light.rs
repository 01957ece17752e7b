//! Dynamic point lights and their blink patterns.
use raylib::prelude::Color;
use serde::Deserialize;

/// 'm' = on, anything else = off. Sampled 10 times per second.
const FLICKER_PATTERN: &[u8] = b"mmamammmmammamamaaamammma";
const FLICKER_RATE: f32 = 10.0;
const PULSE_SPEED: f32 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkPattern {
    #[default]
    Constant,
    Pulse,
    Flicker,
}

#[derive(Clone, Debug)]
pub struct DynamicLight {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
    /// Intensity the pattern modulates.
    pub base_intensity: f32,
    /// Intensity after the last `advance`.
    pub intensity: f32,
    pub pattern: BlinkPattern,
    pub time: f32,
}

impl DynamicLight {
    pub fn new(x: f32, y: f32, radius: f32, color: Color, intensity: f32, pattern: BlinkPattern) -> Self {
        Self {
            x,
            y,
            radius,
            color,
            base_intensity: intensity,
            intensity,
            pattern,
            time: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        self.intensity = match self.pattern {
            BlinkPattern::Constant => self.base_intensity,
            BlinkPattern::Pulse => self.base_intensity * (0.5 + 0.5 * (self.time * PULSE_SPEED).sin()),
            BlinkPattern::Flicker => {
                let idx = (self.time * FLICKER_RATE) as usize % FLICKER_PATTERN.len();
                if FLICKER_PATTERN[idx] == b'm' { self.base_intensity } else { 0.0 }
            }
        };
    }

    /// `(r² - d²)² / r²` inside the radius, 0 at or beyond it.
    #[inline]
    pub fn influence_at(&self, px: f32, py: f32) -> f32 {
        let dx = px - self.x;
        let dy = py - self.y;
        let dist2 = dx * dx + dy * dy;
        let radius2 = self.radius * self.radius;
        if dist2 >= radius2 {
            return 0.0;
        }
        let k = radius2 - dist2;
        (k * k) / radius2
    }

    /// Additive weight applied to the light color at a point, in [0, intensity].
    #[inline]
    pub fn weight_at(&self, px: f32, py: f32) -> f32 {
        let radius2 = self.radius * self.radius;
        if radius2 <= 0.0 {
            return 0.0;
        }
        self.intensity * self.influence_at(px, py) / radius2
    }
}

/// Lights active this frame. Advanced once per frame before shading.
#[derive(Clone, Debug, Default)]
pub struct LightSet {
    lights: Vec<DynamicLight>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the light's index for `get_mut`.
    pub fn add(&mut self, light: DynamicLight) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn advance(&mut self, dt: f32) {
        for light in &mut self.lights {
            light.advance(dt);
        }
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut DynamicLight> {
        self.lights.get_mut(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicLight> {
        self.lights.iter()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Back-and-forth motion along x between two bounds.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct Sweep {
    pub min_x: f32,
    pub max_x: f32,
    pub speed: f32,
    #[serde(skip, default = "forward")]
    heading: f32,
}

fn forward() -> f32 {
    1.0
}

impl Sweep {
    pub fn new(min_x: f32, max_x: f32, speed: f32) -> Self {
        Self { min_x, max_x, speed, heading: 1.0 }
    }

    pub fn advance(&mut self, x: &mut f32, dt: f32) {
        *x += self.heading * self.speed * dt;
        if *x > self.max_x {
            self.heading = -1.0;
        }
        if *x < self.min_x {
            self.heading = 1.0;
        }
    }
}
