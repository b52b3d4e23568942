//! Particle types: CPU simulation state and packed instance data

use crate::config::{BoundaryPolicy, EngineConfig, Palette};
use crate::rand::ParticleRng;
use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Size, Vec2};

/// One simulated particle, in logical pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alpha: f32,
    /// Direction of the alpha pulse
    pub brightening: bool,
    /// Fixed at spawn. Ignored when the palette follows the theme.
    pub color: Color,
}

impl Particle {
    /// Random particle somewhere inside `bounds`
    pub fn spawn(rng: &mut ParticleRng, bounds: Size, config: &EngineConfig) -> Self {
        let color = match config.palette {
            Palette::Hue {
                hue_min,
                hue_max,
                saturation,
                lightness,
            } => Color::from_hsl(rng.range(hue_min, hue_max), saturation, lightness),
            Palette::Theme => Color::WHITE,
        };

        let mut particle = Self {
            position: Vec2::new(rng.range(0.0, bounds.width), rng.range(0.0, bounds.height)),
            velocity: Vec2::new(
                rng.signed(config.initial_speed),
                rng.signed(config.initial_speed),
            ),
            radius: rng.range(config.radius_min, config.radius_max),
            alpha: rng
                .range(config.alpha_min, config.alpha_max)
                .clamp(config.alpha_min, config.alpha_max),
            brightening: rng.chance(0.5),
            color,
        };
        particle.velocity = particle.velocity.clamp_length(config.max_speed);
        particle.confine(bounds, BoundaryPolicy::Wrap);
        particle
    }

    /// Push the particle toward (`sign` > 0) or away from the pointer when it is
    /// strictly inside `radius`. Returns whether an impulse was applied.
    pub fn apply_pointer(
        &mut self,
        pointer: Vec2,
        radius: f32,
        strength: f32,
        sign: f32,
        frames: f32,
    ) -> bool {
        let offset = pointer - self.position;
        let distance = offset.length();
        if !(distance < radius) {
            return false;
        }
        let falloff = (radius - distance) / radius;
        let direction = Vec2::from_angle(offset.angle());
        self.velocity += direction * (sign * strength * falloff * frames);
        true
    }

    /// Bring the position back inside `[0, width) x [0, height)`
    pub fn confine(&mut self, bounds: Size, policy: BoundaryPolicy) {
        if bounds.is_empty() {
            return;
        }
        if !self.position.is_finite() || !self.velocity.is_finite() {
            self.position = bounds.center();
            self.velocity = Vec2::ZERO;
        }
        match policy {
            BoundaryPolicy::Wrap => {
                self.position.x = wrap_axis(self.position.x, bounds.width);
                self.position.y = wrap_axis(self.position.y, bounds.height);
            }
            BoundaryPolicy::Reflect => {
                reflect_axis(&mut self.position.x, &mut self.velocity.x, bounds.width);
                reflect_axis(&mut self.position.y, &mut self.velocity.y, bounds.height);
            }
        }
    }

    /// Ramp alpha toward the end of the band, turning around at either bound
    pub fn pulse(&mut self, min: f32, max: f32, rate: f32, frames: f32) {
        if max <= min {
            self.alpha = min;
            return;
        }
        let step = rate * frames;
        if self.brightening {
            self.alpha += step;
            if self.alpha >= max {
                self.alpha = max;
                self.brightening = false;
            }
        } else {
            self.alpha -= step;
            if self.alpha <= min {
                self.alpha = min;
                self.brightening = true;
            }
        }
    }
}

/// Largest float strictly below a positive finite `limit`
fn last_below(limit: f32) -> f32 {
    f32::from_bits(limit.to_bits() - 1)
}

fn wrap_axis(value: f32, limit: f32) -> f32 {
    let wrapped = value.rem_euclid(limit);
    // rem_euclid rounds tiny negatives up to `limit`
    if wrapped >= limit {
        0.0
    } else {
        wrapped
    }
}

fn reflect_axis(position: &mut f32, velocity: &mut f32, limit: f32) {
    if *position < 0.0 {
        *position = -*position;
        *velocity = velocity.abs();
    } else if *position >= limit {
        *position = 2.0 * limit - *position;
        *velocity = -velocity.abs();
    }
    // One step can overshoot by more than the whole surface
    *position = position.clamp(0.0, last_below(limit));
}

/// Packed per-particle data for hosts that draw with instancing.
/// 32 bytes (2 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// x, y, radius, alpha
    pub pos_radius_alpha: [f32; 4],
    /// Resolved rgba, alpha already multiplied in
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle, color: Color) -> Self {
        Self {
            pos_radius_alpha: [p.position.x, p.position.y, p.radius, p.alpha],
            color: [color.r, color.g, color.b, color.a * p.alpha],
        }
    }
}

/// Fixed-size pool, regenerated wholesale whenever the surface size changes
pub struct ParticlePool {
    particles: Vec<Particle>,
    bounds: Size,
    generation: u64,
    instance_buffer: Vec<ParticleInstance>,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticlePool {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            bounds: Size::default(),
            generation: 0,
            instance_buffer: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Incremented on every regeneration
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Throw away every particle and spawn `density(bounds)` new ones
    pub fn regenerate(&mut self, bounds: Size, config: &EngineConfig, rng: &mut ParticleRng) {
        let count = config.density.particle_count(bounds);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::spawn(rng, bounds, config));
        }
        self.bounds = bounds;
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.instance_buffer.clear();
    }

    /// Advance every particle by `frames` reference frames. Returns how many
    /// particles felt the pointer.
    pub fn update(&mut self, pointer: Option<Vec2>, frames: f32, config: &EngineConfig) -> usize {
        let sign = config.pointer_force.sign();
        let mut influenced = 0;
        for p in &mut self.particles {
            // Integrate position
            p.position += p.velocity * frames;

            if let Some(pointer) = pointer {
                if p.apply_pointer(
                    pointer,
                    config.interaction_radius,
                    config.force_strength,
                    sign,
                    frames,
                ) {
                    influenced += 1;
                }
            }

            p.velocity = p.velocity.clamp_length(config.max_speed);
            p.confine(self.bounds, config.boundary);
            p.pulse(config.alpha_min, config.alpha_max, config.fade_rate, frames);
        }
        influenced
    }

    /// Pack particles into the instance buffer. Call after `update()`.
    pub fn pack_instances(&mut self, color_of: impl Fn(&Particle) -> Color) -> &[ParticleInstance] {
        self.instance_buffer.clear();
        self.instance_buffer.extend(
            self.particles
                .iter()
                .map(|p| ParticleInstance::from_particle(p, color_of(p))),
        );
        &self.instance_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Density;

    fn config_with(boundary: BoundaryPolicy) -> EngineConfig {
        EngineConfig {
            boundary,
            density: Density::Area {
                pixels_per_particle: 20_000.0,
                max: None,
            },
            ..EngineConfig::loader()
        }
    }

    fn still_particle(position: Vec2) -> Particle {
        Particle {
            position,
            velocity: Vec2::ZERO,
            radius: 1.0,
            alpha: 1.0,
            brightening: false,
            color: Color::WHITE,
        }
    }

    #[test]
    fn pool_regenerates_to_density() {
        let config = config_with(BoundaryPolicy::Wrap);
        let mut rng = ParticleRng::new(1);
        let mut pool = ParticlePool::new();

        pool.regenerate(Size::new(800.0, 600.0), &config, &mut rng);
        assert_eq!(pool.len(), 24);
        assert_eq!(pool.generation(), 1);

        pool.regenerate(Size::new(1920.0, 1080.0), &config, &mut rng);
        assert_eq!(pool.len(), 103);
        assert_eq!(pool.generation(), 2);
        for p in pool.particles() {
            assert!(p.position.x >= 0.0 && p.position.x < 1920.0);
            assert!(p.position.y >= 0.0 && p.position.y < 1080.0);
        }
    }

    #[test]
    fn pointer_inside_radius_gets_impulse() {
        let pointer = Vec2::new(400.0, 300.0);

        let mut near = still_particle(Vec2::new(350.0, 300.0));
        assert!(near.apply_pointer(pointer, 100.0, 0.2, 1.0, 1.0));
        assert!(near.velocity.x > 0.0, "attraction pulls toward the pointer");
        // (100 - 50) / 100 * 0.2
        assert!((near.velocity.length() - 0.1).abs() < 1e-6);

        let mut far = still_particle(Vec2::new(250.0, 300.0));
        assert!(!far.apply_pointer(pointer, 100.0, 0.2, 1.0, 1.0));
        assert_eq!(far.velocity, Vec2::ZERO);
    }

    #[test]
    fn repulsion_pushes_away() {
        let mut p = still_particle(Vec2::new(400.0, 350.0));
        p.apply_pointer(Vec2::new(400.0, 300.0), 100.0, 0.3334, -1.0, 1.0);
        assert!(p.velocity.y > 0.0);
        assert!(p.velocity.x.abs() < 1e-6);
    }

    #[test]
    fn pointer_on_particle_stays_finite() {
        let mut p = still_particle(Vec2::new(10.0, 10.0));
        assert!(p.apply_pointer(Vec2::new(10.0, 10.0), 100.0, 0.2, 1.0, 1.0));
        assert!(p.velocity.is_finite());
    }

    #[test]
    fn wrap_keeps_half_open_bounds() {
        let bounds = Size::new(800.0, 600.0);
        let mut p = still_particle(Vec2::new(-1e-9, 600.0));
        p.confine(bounds, BoundaryPolicy::Wrap);
        assert!(p.position.x >= 0.0 && p.position.x < 800.0);
        assert_eq!(p.position.y, 0.0);

        let mut q = still_particle(Vec2::new(805.0, -5.0));
        q.confine(bounds, BoundaryPolicy::Wrap);
        assert!((q.position.x - 5.0).abs() < 1e-4);
        assert!((q.position.y - 595.0).abs() < 1e-4);
    }

    #[test]
    fn reflect_mirrors_velocity() {
        let bounds = Size::new(800.0, 600.0);
        let mut p = still_particle(Vec2::new(803.0, -2.0));
        p.velocity = Vec2::new(3.0, -2.0);
        p.confine(bounds, BoundaryPolicy::Reflect);
        assert!((p.position.x - 797.0).abs() < 1e-4);
        assert!((p.position.y - 2.0).abs() < 1e-4);
        assert!(p.velocity.x < 0.0);
        assert!(p.velocity.y > 0.0);

        let mut edge = still_particle(Vec2::new(800.0, 5000.0));
        edge.confine(bounds, BoundaryPolicy::Reflect);
        assert!(edge.position.x < 800.0);
        assert!(edge.position.y >= 0.0 && edge.position.y < 600.0);
    }

    #[test]
    fn non_finite_position_recovers() {
        let mut p = still_particle(Vec2::new(f32::NAN, 10.0));
        p.confine(Size::new(100.0, 100.0), BoundaryPolicy::Reflect);
        assert_eq!(p.position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn alpha_pulse_turns_at_band_edges() {
        let mut p = still_particle(Vec2::ZERO);
        p.alpha = 0.95;
        p.brightening = true;
        p.pulse(0.3, 1.0, 0.1, 1.0);
        assert_eq!(p.alpha, 1.0);
        assert!(!p.brightening);

        for _ in 0..100 {
            p.pulse(0.3, 1.0, 0.1, 1.0);
            assert!((0.3..=1.0).contains(&p.alpha));
        }
    }

    #[test]
    fn many_steps_stay_in_bounds_and_band() {
        for boundary in [BoundaryPolicy::Wrap, BoundaryPolicy::Reflect] {
            let config = config_with(boundary);
            let mut rng = ParticleRng::new(2024);
            let mut pool = ParticlePool::new();
            let bounds = Size::new(640.0, 480.0);
            pool.regenerate(bounds, &config, &mut rng);

            for step in 0..2_000 {
                // Sweep the pointer around and vary the frame length
                let pointer = Vec2::new((step * 7 % 640) as f32, (step * 3 % 480) as f32);
                let frames = 0.5 + (step % 5) as f32;
                pool.update(Some(pointer), frames, &config);

                for p in pool.particles() {
                    assert!(p.position.x >= 0.0 && p.position.x < bounds.width);
                    assert!(p.position.y >= 0.0 && p.position.y < bounds.height);
                    assert!(p.alpha >= config.alpha_min && p.alpha <= config.alpha_max);
                    assert!(p.velocity.length() <= config.max_speed + 1e-4);
                }
            }
        }
    }

    #[test]
    fn instances_pack_resolved_colors() {
        let config = config_with(BoundaryPolicy::Wrap);
        let mut rng = ParticleRng::new(5);
        let mut pool = ParticlePool::new();
        pool.regenerate(Size::new(400.0, 100.0), &config, &mut rng);

        let count = pool.len();
        let packed = pool.pack_instances(|_| Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(packed.len(), count);
        assert_eq!(packed[0].color[0], 1.0);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        let bytes: &[u8] = bytemuck::cast_slice(packed);
        assert_eq!(bytes.len(), count * 32);
    }
}
