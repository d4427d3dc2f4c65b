//! Scene assembly and the per-frame host loop.
//!
//! Every effect lives in a `hecs::World` as an [`EffectSlot`], optionally gated
//! by a [`StoryLayer`]. A slot that fails (say, after being disposed)
//! is disabled with a warning and the rest of the scene keeps running.

use anyhow::{ensure, Context, Result};
use fx_core::{Span, Time};
use glam::Vec3;
use hecs::World;
use particles::{
    presets, EffectError, EmitterConfig, FieldConfig, FieldStats, LayerFade, ParticleField,
    ProximityLinks, SmoothFollow, StoryTimeline, TransientEmitter, WaveSurface,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ShowcaseConfig;

// ── Story layout ───────────────────────────────────────────────────────────

pub const STORM: usize = 0;
pub const AUTUMN: usize = 1;
pub const WINTER: usize = 2;
pub const CAVE: usize = 3;
pub const SPRING: usize = 4;
pub const CHAPTERS: usize = 5;

/// Where the hero stands in each chapter. The camera trails it.
const HERO_PATH: [Vec3; CHAPTERS] = [
    Vec3::new(0.0, -1.5, 0.0),
    Vec3::new(2.0, -1.5, 3.0),
    Vec3::new(4.0, -1.5, 4.0),
    Vec3::new(2.0, -1.5, 2.0),
    Vec3::new(-3.0, -1.5, 6.0),
];

/// Every particle field the showcase builds.
pub const FIELD_NAMES: [&str; 8] =
    ["rain", "leaves", "snow", "bubbles", "embers", "pollen", "sparkles", "stars"];

/// Star links are rebuilt every this many simulation steps.
const LINK_INTERVAL: u64 = 2;

/// Progress width of a layer's fade in and fade out.
const FADE_EDGE: f32 = 0.05;

// ── Components ─────────────────────────────────────────────────────────────

/// Owns one effect until it is disposed. Any access after that is an error.
pub struct EffectSlot<T> {
    name: &'static str,
    effect: Option<T>,
    disabled: bool,
}

impl<T> EffectSlot<T> {
    pub fn new(name: &'static str, effect: T) -> Self {
        Self { name, effect: Some(effect), disabled: false }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> Result<&T, EffectError> {
        self.effect.as_ref().ok_or_else(|| self.disposed())
    }

    pub fn get_mut(&mut self) -> Result<&mut T, EffectError> {
        match self.effect.as_mut() {
            Some(effect) => Ok(effect),
            None => Err(EffectError::Disposed { effect: self.name.to_string() }),
        }
    }

    /// Take the effect out for disposal. Later access fails with `Disposed`.
    pub fn take(&mut self) -> Option<T> {
        self.effect.take()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Stop running this effect. Logs once.
    pub fn disable(&mut self, err: &EffectError) {
        if !self.disabled {
            log::warn!("Effect `{}` disabled: {}", self.name, err);
            self.disabled = true;
        }
    }

    fn disposed(&self) -> EffectError {
        EffectError::Disposed { effect: self.name.to_string() }
    }
}

pub type FieldSlot = EffectSlot<ParticleField>;
pub type EmitterSlot = EffectSlot<TransientEmitter>;
pub type SurfaceSlot = EffectSlot<WaveSurface>;

/// Gates an effect on scroll progress.
pub struct StoryLayer(pub LayerFade);

/// Marks the field whose first particles get proximity links.
pub struct Linked;

fn visible(layer: Option<&StoryLayer>, progress: f32) -> bool {
    layer.map_or(true, |l| l.0.is_visible(progress))
}

// ── Reports ────────────────────────────────────────────────────────────────

/// What happened during one host frame, summed over its simulation steps.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub chapter: usize,
    /// Fixed simulation steps run this frame. Zero when the host frame was short.
    pub steps: u32,
    pub fields_ticked: usize,
    pub recycled: usize,
    /// Brightest flash seen this frame, 0 when dark.
    pub flash: f32,
    pub links: usize,
    /// Effects that failed this frame and were disabled.
    pub failures: usize,
}

/// Totals collected when the scene is torn down.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub frames: u64,
    pub steps: u64,
    /// Simulated seconds.
    pub elapsed: f32,
    pub particles: usize,
    pub recycled: u64,
    pub flashes: u64,
    pub surface_vertices: usize,
    pub disabled: Vec<&'static str>,
}

// ── Showcase ───────────────────────────────────────────────────────────────

pub struct Showcase {
    world: World,
    time: Time,
    story: StoryTimeline,
    chapter: usize,
    scroll_seconds: f32,
    camera: SmoothFollow,
    links: ProximityLinks,
    /// Fixed steps simulated so far.
    steps: u64,
    seed: u64,
    spawned: u64,
    /// Effects that failed to build.
    failed: Vec<&'static str>,
}

impl Showcase {
    /// Build every scene. Effects with bad settings are left out with a warning.
    pub fn build(config: &ShowcaseConfig) -> Result<Self> {
        ensure!(
            config.scroll_seconds > 0.0 && config.scroll_seconds.is_finite(),
            "scroll_seconds must be positive, got {}",
            config.scroll_seconds
        );
        ensure!(
            config.sim_rate > 0.0 && config.sim_rate.is_finite(),
            "sim_rate must be positive, got {}",
            config.sim_rate
        );
        let mut time = Time::new();
        time.set_fixed_rate(config.sim_rate);
        let story = StoryTimeline::new(CHAPTERS).context("story timeline")?;
        let mut camera = SmoothFollow::new(Vec3::ZERO, presets::hero_camera()).context("hero camera")?;
        camera.snap(hero_position(0.0));
        let links = ProximityLinks::new(presets::star_links()).context("star links")?;

        let mut showcase = Self {
            world: World::new(),
            time,
            story,
            chapter: 0,
            scroll_seconds: config.scroll_seconds,
            camera,
            links,
            steps: 0,
            seed: config.seed,
            spawned: 0,
            failed: Vec::new(),
        };

        let counts = &config.counts;
        let storm = showcase.chapter_fade(STORM, 1.0)?;
        showcase.add_field("rain", presets::rain(counts.rain), Some(storm.clone()));
        let lightning = EmitterConfig {
            probability: config.lightning.probability,
            intensity: Span::new(config.lightning.intensity.0, config.lightning.intensity.1),
            duration: Span::new(config.lightning.duration.0, config.lightning.duration.1),
        };
        showcase.add_emitter("lightning", lightning, Some(storm.clone()));
        showcase.add_surface("storm sea", Some(storm));

        let autumn = showcase.chapter_fade(AUTUMN, 0.7)?;
        showcase.add_field("leaves", presets::leaves(counts.leaves), Some(autumn));
        let winter = showcase.chapter_fade(WINTER, 0.8)?;
        showcase.add_field("snow", presets::snow(counts.snow), Some(winter));

        let cave = showcase.chapter_fade(CAVE, 0.6)?;
        showcase.add_field("bubbles", presets::bubbles(counts.bubbles), Some(cave.clone()));
        let ember_seed = config.seed as u32;
        showcase.add_field("embers", presets::embers(counts.embers, ember_seed), Some(cave));

        let spring = showcase.chapter_fade(SPRING, 0.6)?;
        showcase.add_field("pollen", presets::pollen(counts.pollen), Some(spring.clone()));
        showcase.add_field("sparkles", presets::sparkles(counts.sparkles), Some(spring));

        if let Some(stars) = showcase.add_field("stars", presets::star_swirl(counts.stars), None) {
            showcase
                .world
                .insert_one(stars, Linked)
                .context("tag star field")?;
        }

        log::info!(
            "Showcase ready: {} effects, {} disabled",
            showcase.world.len(),
            showcase.failed.len()
        );
        Ok(showcase)
    }

    /// Fresh RNG per effect, derived from the run seed.
    fn next_rng(&mut self) -> StdRng {
        self.spawned += 1;
        StdRng::seed_from_u64(self.seed.wrapping_add(self.spawned))
    }

    fn spawn_slot<T: Send + Sync + 'static>(
        &mut self,
        slot: EffectSlot<T>,
        layer: Option<LayerFade>,
    ) -> hecs::Entity {
        match layer {
            Some(fade) => self.world.spawn((slot, StoryLayer(fade))),
            None => self.world.spawn((slot,)),
        }
    }

    fn reject(&mut self, name: &'static str, err: &EffectError) {
        log::warn!("Effect `{}` disabled: {}", name, err);
        self.failed.push(name);
    }

    fn add_field(
        &mut self,
        name: &'static str,
        config: FieldConfig,
        layer: Option<LayerFade>,
    ) -> Option<hecs::Entity> {
        if config.capacity == 0 {
            log::info!("Effect `{}` turned off (count 0)", name);
            return None;
        }
        let rng = self.next_rng();
        match ParticleField::new(config, rng) {
            Ok(field) => Some(self.spawn_slot(EffectSlot::new(name, field), layer)),
            Err(e) => {
                self.reject(name, &e);
                None
            }
        }
    }

    fn add_emitter(&mut self, name: &'static str, config: EmitterConfig, layer: Option<LayerFade>) {
        let rng = self.next_rng();
        match TransientEmitter::new(config, rng) {
            Ok(emitter) => {
                self.spawn_slot(EffectSlot::new(name, emitter), layer);
            }
            Err(e) => self.reject(name, &e),
        }
    }

    fn add_surface(&mut self, name: &'static str, layer: Option<LayerFade>) {
        match WaveSurface::new(presets::storm_sea()) {
            Ok(surface) => {
                self.spawn_slot(EffectSlot::new(name, surface), layer);
            }
            Err(e) => self.reject(name, &e),
        }
    }

    /// Opacity curve that holds `peak` through `chapter` and fades at its edges.
    /// The first chapter starts lit and the last one stays lit to the end.
    fn chapter_fade(&self, chapter: usize, peak: f32) -> Result<LayerFade> {
        let start = self.story.chapter_start(chapter);
        let end = if chapter + 1 >= self.story.chapters() {
            1.0
        } else {
            self.story.chapter_start(chapter + 1)
        };
        let mut keys = Vec::with_capacity(4);
        if start <= 0.0 {
            keys.push((0.0, peak));
        } else {
            keys.push(((start - FADE_EDGE).max(0.0), 0.0));
            keys.push(((start + FADE_EDGE).min(1.0), peak));
        }
        if end >= 1.0 {
            keys.push((1.0, peak));
        } else {
            keys.push(((end - FADE_EDGE).max(0.0), peak));
            keys.push(((end + FADE_EDGE).min(1.0), 0.0));
        }
        LayerFade::new(keys).with_context(|| format!("fade for chapter {}", chapter))
    }

    /// Simulated seconds: completed steps times the fixed step.
    pub fn sim_seconds(&self) -> f32 {
        self.steps as f32 * self.time.fixed_timestep_seconds()
    }

    /// Scroll progress implied by simulated time.
    pub fn progress(&self) -> f32 {
        (self.sim_seconds() / self.scroll_seconds).min(1.0)
    }

    pub fn chapter(&self) -> usize {
        self.chapter
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    /// Host frame at timestamp `now` (seconds since start). Runs every fixed
    /// simulation step the elapsed time allows.
    pub fn frame_at(&mut self, now: f32) -> FrameReport {
        self.time.advance_to(now);
        let mut report = FrameReport { chapter: self.chapter, ..FrameReport::default() };
        while self.time.should_fixed_update() {
            self.step(&mut report);
        }
        report.links = self.links.len();
        report
    }

    /// One fixed step of every visible effect.
    fn step(&mut self, report: &mut FrameReport) {
        let dt = self.time.fixed_timestep_seconds();
        self.steps += 1;
        let now = self.sim_seconds();
        let progress = self.progress();

        let chapter = self.story.chapter_at(progress);
        if chapter != self.chapter {
            log::info!("Chapter {} -> {} at t = {:.2}s", self.chapter, chapter, now);
            self.chapter = chapter;
        }
        report.chapter = chapter;
        report.steps += 1;

        for (_, (slot, layer)) in self.world.query_mut::<(&mut FieldSlot, Option<&StoryLayer>)>() {
            if slot.is_disabled() || !visible(layer, progress) {
                continue;
            }
            match slot.get_mut().map(|field| field.tick(dt, now)) {
                Ok(recycled) => {
                    report.recycled += recycled;
                    report.fields_ticked += 1;
                }
                Err(e) => {
                    slot.disable(&e);
                    report.failures += 1;
                }
            }
        }

        for (_, (slot, layer)) in self.world.query_mut::<(&mut EmitterSlot, Option<&StoryLayer>)>() {
            if slot.is_disabled() || !visible(layer, progress) {
                continue;
            }
            match slot.get_mut().map(|emitter| emitter.tick(now)) {
                Ok(pulse) if pulse.is_active() => report.flash = report.flash.max(pulse.intensity),
                Ok(_) => {}
                Err(e) => {
                    slot.disable(&e);
                    report.failures += 1;
                }
            }
        }

        for (_, (slot, layer)) in self.world.query_mut::<(&mut SurfaceSlot, Option<&StoryLayer>)>() {
            if slot.is_disabled() || !visible(layer, progress) {
                continue;
            }
            if let Err(e) = slot.get_mut().map(|surface| surface.animate(now)) {
                slot.disable(&e);
                report.failures += 1;
            }
        }

        if self.steps % LINK_INTERVAL == 1 {
            for (_, (slot, _)) in self.world.query_mut::<(&FieldSlot, &Linked)>() {
                if let Ok(field) = slot.get() {
                    self.links.rebuild(field.positions());
                }
            }
        }

        self.camera.update_dt(hero_position(progress), dt);
    }

    /// Stats of the named field, if it is still live.
    pub fn field_stats(&self, name: &str) -> Option<FieldStats> {
        let mut query = self.world.query::<&FieldSlot>();
        let stats = query
            .iter()
            .find(|(_, slot)| slot.name() == name)
            .and_then(|(_, slot)| slot.get().ok().map(|field| field.stats()));
        stats
    }

    /// Tear the scene down and collect totals.
    pub fn dispose(mut self) -> Summary {
        let mut summary = Summary {
            frames: self.time.frame_count(),
            steps: self.steps,
            elapsed: self.sim_seconds(),
            disabled: std::mem::take(&mut self.failed),
            ..Summary::default()
        };

        for (_, slot) in self.world.query_mut::<&mut FieldSlot>() {
            if slot.is_disabled() {
                summary.disabled.push(slot.name());
            }
            if let Some(field) = slot.take() {
                let stats = field.dispose();
                summary.particles += stats.capacity;
                summary.recycled += stats.recycled;
            }
        }
        for (_, slot) in self.world.query_mut::<&mut EmitterSlot>() {
            if slot.is_disabled() {
                summary.disabled.push(slot.name());
            }
            if let Some(emitter) = slot.take() {
                summary.flashes += emitter.dispose();
            }
        }
        for (_, slot) in self.world.query_mut::<&mut SurfaceSlot>() {
            if slot.is_disabled() {
                summary.disabled.push(slot.name());
            }
            if let Some(surface) = slot.take() {
                summary.surface_vertices += surface.dispose();
            }
        }
        self.world.clear();
        summary
    }
}

/// Hero position along [`HERO_PATH`] at scroll `progress`.
pub fn hero_position(progress: f32) -> Vec3 {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let scaled = p * (CHAPTERS - 1) as f32;
    let i = (scaled as usize).min(CHAPTERS - 2);
    HERO_PATH[i].lerp(HERO_PATH[i + 1], scaled - i as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectCounts;

    fn small_config() -> ShowcaseConfig {
        ShowcaseConfig {
            counts: EffectCounts {
                rain: 200,
                leaves: 40,
                snow: 40,
                bubbles: 20,
                embers: 20,
                pollen: 40,
                sparkles: 10,
                stars: 400,
            },
            ..ShowcaseConfig::default()
        }
    }

    /// Next host frame at 60 Hz.
    fn next_frame(showcase: &mut Showcase) -> FrameReport {
        let now = (showcase.time.frame_count() + 1) as f32 / 60.0;
        showcase.frame_at(now)
    }

    fn field_count(showcase: &Showcase) -> usize {
        showcase.world.query::<&FieldSlot>().iter().count()
    }

    #[test]
    fn builds_every_effect() {
        let showcase = Showcase::build(&ShowcaseConfig::default()).unwrap();
        assert_eq!(field_count(&showcase), FIELD_NAMES.len());
        for name in FIELD_NAMES {
            assert!(showcase.field_stats(name).is_some(), "{} missing", name);
        }
        assert_eq!(showcase.world.query::<&EmitterSlot>().iter().count(), 1);
        assert_eq!(showcase.world.query::<&SurfaceSlot>().iter().count(), 1);
        assert!(showcase.failed.is_empty());
        assert_eq!(showcase.field_stats("rain").unwrap().capacity, presets::RAIN_COUNT);
    }

    #[test]
    fn only_visible_layers_tick() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        let report = next_frame(&mut showcase);
        assert_eq!(report.chapter, STORM);
        assert_eq!(showcase.field_stats("rain").unwrap().ticks, 1);
        assert_eq!(showcase.field_stats("stars").unwrap().ticks, 1);
        assert_eq!(showcase.field_stats("snow").unwrap().ticks, 0);
        assert_eq!(showcase.field_stats("pollen").unwrap().ticks, 0);
    }

    #[test]
    fn walks_through_all_chapters() {
        let config = ShowcaseConfig { scroll_seconds: 2.0, ..small_config() };
        let mut showcase = Showcase::build(&config).unwrap();
        let mut seen = [false; CHAPTERS];
        for _ in 0..150 {
            seen[next_frame(&mut showcase).chapter] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(showcase.chapter(), SPRING);
        assert!(showcase.field_stats("snow").unwrap().ticks > 0);
        assert!(showcase.field_stats("pollen").unwrap().ticks > 0);
    }

    #[test]
    fn disposed_effect_is_disabled_not_fatal() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        next_frame(&mut showcase);
        for (_, slot) in showcase.world.query_mut::<&mut FieldSlot>() {
            if slot.name() == "rain" {
                slot.take().unwrap().dispose();
            }
        }

        assert_eq!(next_frame(&mut showcase).failures, 1);
        let report = next_frame(&mut showcase);
        assert_eq!(report.failures, 0);
        assert!(report.fields_ticked > 0);
        assert!(showcase.field_stats("rain").is_none());

        let summary = showcase.dispose();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.disabled, vec!["rain"]);
    }

    #[test]
    fn slot_reports_disposed() {
        let mut slot = EffectSlot::new("sea", WaveSurface::new(presets::storm_sea()).unwrap());
        assert!(slot.get().is_ok());
        slot.take().unwrap().dispose();
        let err = slot.get_mut().unwrap_err();
        assert_eq!(err, EffectError::Disposed { effect: "sea".to_string() });
        assert!(!err.is_configuration());
    }

    #[test]
    fn bad_lightning_only_drops_lightning() {
        let mut config = small_config();
        config.lightning.probability = 2.0;
        let mut showcase = Showcase::build(&config).unwrap();
        assert_eq!(showcase.failed, vec!["lightning"]);
        assert_eq!(field_count(&showcase), 8);
        assert_eq!(next_frame(&mut showcase).flash, 0.0);
    }

    #[test]
    fn zero_count_turns_effect_off() {
        let mut config = small_config();
        config.counts.rain = 0;
        let showcase = Showcase::build(&config).unwrap();
        assert_eq!(field_count(&showcase), 7);
        assert!(showcase.failed.is_empty());
    }

    #[test]
    fn lightning_flashes_when_certain() {
        let mut config = small_config();
        config.lightning.probability = 1.0;
        let mut showcase = Showcase::build(&config).unwrap();
        let report = next_frame(&mut showcase);
        assert!((2.0..=4.0).contains(&report.flash));
    }

    #[test]
    fn rejects_bad_scroll_time() {
        let config = ShowcaseConfig { scroll_seconds: 0.0, ..small_config() };
        assert!(Showcase::build(&config).is_err());
    }

    #[test]
    fn star_links_are_built() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        let report = next_frame(&mut showcase);
        assert!(report.links <= presets::star_links().max_points * presets::star_links().max_per_point);
    }

    #[test]
    fn one_step_per_frame_at_sim_rate() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        for _ in 0..600 {
            assert_eq!(next_frame(&mut showcase).steps, 1);
        }
        assert_eq!(showcase.field_stats("stars").unwrap().ticks, 600);
    }

    #[test]
    fn slow_host_frames_run_several_steps() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        assert_eq!(showcase.frame_at(1.0 / 30.0).steps, 2);
        assert_eq!(showcase.field_stats("stars").unwrap().ticks, 2);

        // Backwards timestamps hold the clock.
        assert_eq!(showcase.frame_at(0.0).steps, 0);
        assert_eq!(showcase.field_stats("stars").unwrap().ticks, 2);
    }

    #[test]
    fn rejects_bad_sim_rate() {
        let config = ShowcaseConfig { sim_rate: 0.0, ..small_config() };
        assert!(Showcase::build(&config).is_err());
    }

    #[test]
    fn hero_path_endpoints() {
        assert_eq!(hero_position(0.0), HERO_PATH[0]);
        assert_eq!(hero_position(1.0), HERO_PATH[CHAPTERS - 1]);
        assert_eq!(hero_position(f32::NAN), HERO_PATH[0]);
    }

    #[test]
    fn camera_trails_the_hero() {
        let mut showcase = Showcase::build(&small_config()).unwrap();
        let start = showcase.camera_position();
        assert_eq!(start, HERO_PATH[0] + presets::hero_camera().offset);
        for _ in 0..60 {
            next_frame(&mut showcase);
        }
        assert_ne!(showcase.camera_position(), start);
    }
}
