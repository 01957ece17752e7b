//! Per-pixel color transforms shared by every rasterized surface.
//!
//! Surfaces are shaded tonemap → fog → lights; the viewmodel skips fog.
use raylib::prelude::Color;

use crate::config::RenderConfig;
use crate::core::light::LightSet;

#[derive(Clone, Debug)]
pub struct Shader {
    pub sky_color: Color,
    pub fog_density: f32,
    pub tonemap_influence: f32,
    /// Pixels darker than this (mean of r, g, b) skip the tonemap.
    pub tonemap_threshold: f32,
}

impl Default for Shader {
    fn default() -> Self {
        Self {
            sky_color: Color::new(255, 255, 255, 255),
            fog_density: 0.2,
            tonemap_influence: 0.5,
            tonemap_threshold: 20.0,
        }
    }
}

impl Shader {
    pub fn from_config(cfg: &RenderConfig) -> Self {
        let [r, g, b] = cfg.sky_color;
        Self {
            sky_color: Color::new(r, g, b, 255),
            fog_density: cfg.fog_density,
            tonemap_influence: cfg.tonemap_influence,
            tonemap_threshold: cfg.tonemap_threshold,
        }
    }

    /// Linear fade to black; identity at distance 0.
    #[inline]
    pub fn apply_fog(&self, color: Color, distance: f32) -> Color {
        let f = (distance * self.fog_density).clamp(0.0, 1.0);
        let keep = 1.0 - f;
        let mul = |v: u8| -> u8 { (v as f32 * keep) as u8 };
        Color::new(mul(color.r), mul(color.g), mul(color.b), color.a)
    }

    /// Pulls bright pixels toward the sky color. A brighter sky pulls less.
    #[inline]
    pub fn apply_tonemap(&self, color: Color) -> Color {
        let brightness = (color.r as f32 + color.g as f32 + color.b as f32) / 3.0;
        if brightness < self.tonemap_threshold {
            return color;
        }
        let sky = self.sky_color;
        let sky_brightness = (sky.r as f32 + sky.g as f32 + sky.b as f32) / 3.0;
        let k = self.tonemap_influence * (1.0 - sky_brightness / 255.0);
        let mix = |c: u8, s: u8| -> u8 { (c as f32 * (1.0 - k) + s as f32 * k) as u8 };
        Color::new(mix(color.r, sky.r), mix(color.g, sky.g), mix(color.b, sky.b), color.a)
    }

    /// Adds each light in range, clamping after every light.
    #[inline]
    pub fn apply_lights(&self, color: Color, lights: &LightSet, x: f32, y: f32) -> Color {
        let mut r = color.r as f32;
        let mut g = color.g as f32;
        let mut b = color.b as f32;
        for light in lights.iter() {
            let w = light.weight_at(x, y);
            if w <= 0.0 {
                continue;
            }
            r = (r + light.color.r as f32 * w).clamp(0.0, 255.0);
            g = (g + light.color.g as f32 * w).clamp(0.0, 255.0);
            b = (b + light.color.b as f32 * w).clamp(0.0, 255.0);
        }
        Color::new(r as u8, g as u8, b as u8, color.a)
    }

    /// World surfaces: tonemap, fog, then lights at (x, y).
    #[inline]
    pub fn shade_surface(&self, color: Color, distance: f32, lights: &LightSet, x: f32, y: f32) -> Color {
        let c = self.apply_tonemap(color);
        let c = self.apply_fog(c, distance);
        self.apply_lights(c, lights, x, y)
    }

    /// Screen-anchored overlays: no fog.
    #[inline]
    pub fn shade_overlay(&self, color: Color, lights: &LightSet, x: f32, y: f32) -> Color {
        let c = self.apply_tonemap(color);
        self.apply_lights(c, lights, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::light::{BlinkPattern, DynamicLight};

    const GREY: Color = Color::new(120, 140, 160, 255);

    #[test]
    fn fog_is_identity_at_zero_and_monotone() {
        let s = Shader::default();
        assert_eq!(s.apply_fog(GREY, 0.0), GREY);
        let mut prev = s.apply_fog(GREY, 0.0);
        for i in 1..80 {
            let c = s.apply_fog(GREY, i as f32 * 0.1);
            assert!(c.r <= prev.r && c.g <= prev.g && c.b <= prev.b);
            prev = c;
        }
        assert_eq!(s.apply_fog(GREY, 5.0), Color::new(0, 0, 0, 255));
        assert_eq!(s.apply_fog(GREY, 100.0), Color::new(0, 0, 0, 255));
    }

    #[test]
    fn white_sky_disables_tonemap() {
        let s = Shader::default();
        assert_eq!(s.apply_tonemap(GREY), GREY);
    }

    #[test]
    fn tonemap_skips_dark_pixels() {
        let s = Shader { sky_color: Color::new(0, 0, 255, 255), ..Shader::default() };
        let dark = Color::new(10, 10, 10, 255);
        assert_eq!(s.apply_tonemap(dark), dark);
        let lit = s.apply_tonemap(GREY);
        assert!(lit.b > GREY.b);
        assert!(lit.r < GREY.r);
    }

    #[test]
    fn lights_add_inside_radius_only() {
        let s = Shader::default();
        let mut lights = LightSet::new();
        lights.add(DynamicLight::new(8.0, 8.0, 3.0, Color::new(100, 50, 0, 255), 1.0, BlinkPattern::Constant));
        let base = Color::new(10, 10, 10, 255);

        assert_eq!(s.apply_lights(base, &lights, 8.0, 8.0), Color::new(110, 60, 10, 255));
        assert_eq!(s.apply_lights(base, &lights, 11.0, 8.0), base);
        let inside = s.apply_lights(base, &lights, 10.0, 8.0);
        assert!(inside.r > base.r);
    }

    #[test]
    fn lights_accumulate_and_clamp() {
        let s = Shader::default();
        let mut lights = LightSet::new();
        for _ in 0..3 {
            lights.add(DynamicLight::new(0.0, 0.0, 2.0, Color::new(200, 0, 0, 255), 1.0, BlinkPattern::Constant));
        }
        let out = s.apply_lights(Color::new(0, 0, 0, 255), &lights, 0.0, 0.0);
        assert_eq!(out.r, 255);
        assert_eq!(out.g, 0);
    }

    #[test]
    fn surface_order_is_tonemap_fog_lights() {
        let s = Shader::default();
        let lights = LightSet::new();
        let out = s.shade_surface(GREY, 2.5, &lights, 0.0, 0.0);
        assert_eq!(out, Color::new(60, 70, 80, 255));
    }
}
