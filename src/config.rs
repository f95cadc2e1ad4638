use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BubbleConfig {
    /// Fraction of velocity removed every tick.
    pub velocity_decay: f32,
    pub repulsion_strength: f32,
    /// Added to every node radius when testing for overlap.
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub collision_iterations: usize,
    pub center_strength: f32,
    pub axis_strength: f32,
    /// Velocity fraction kept (inverted) after hitting a viewport edge.
    pub restitution: f32,
    pub alpha_initial: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Level alpha is raised to and held at while a bubble is dragged.
    pub drag_alpha_target: f32,
    pub rest_alpha_target: f32,
    pub min_radius: f32,
    /// Largest radius as a fraction of the shorter viewport side.
    pub max_radius_fraction: f32,
    pub poll_interval_secs: u64,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            velocity_decay: 0.6,
            repulsion_strength: 1.0,
            collision_padding: 4.0,
            collision_strength: 1.0,
            collision_iterations: 3,
            center_strength: 0.02,
            axis_strength: 0.005,
            restitution: 0.8,
            alpha_initial: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            drag_alpha_target: 0.1,
            rest_alpha_target: 0.0,
            min_radius: 6.0,
            max_radius_fraction: 0.18,
            poll_interval_secs: 60,
        }
    }
}

impl BubbleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("invalid config toml: {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Clamps every field into the range the engine can work with.
    pub fn sanitized(mut self) -> Self {
        fn unit(value: f32, fallback: f32) -> f32 {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        }

        let defaults = Self::default();
        self.velocity_decay = unit(self.velocity_decay, defaults.velocity_decay);
        self.repulsion_strength = unit(self.repulsion_strength, defaults.repulsion_strength);
        self.collision_strength = unit(self.collision_strength, defaults.collision_strength);
        self.center_strength = unit(self.center_strength, defaults.center_strength);
        self.axis_strength = unit(self.axis_strength, defaults.axis_strength);
        self.restitution = unit(self.restitution, defaults.restitution).min(0.99);
        self.alpha_initial = unit(self.alpha_initial, defaults.alpha_initial);
        self.alpha_min = unit(self.alpha_min, defaults.alpha_min);
        self.alpha_decay = unit(self.alpha_decay, defaults.alpha_decay);
        self.drag_alpha_target = unit(self.drag_alpha_target, defaults.drag_alpha_target);
        self.rest_alpha_target = unit(self.rest_alpha_target, defaults.rest_alpha_target);
        self.max_radius_fraction = unit(self.max_radius_fraction, defaults.max_radius_fraction);
        self.collision_iterations = self.collision_iterations.clamp(1, 16);
        if !self.collision_padding.is_finite() || self.collision_padding < 0.0 {
            self.collision_padding = defaults.collision_padding;
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            self.min_radius = defaults.min_radius;
        }
        self.poll_interval_secs = self.poll_interval_secs.max(5);
        self
    }
}
