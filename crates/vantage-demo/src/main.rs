use anyhow::Result;
use glam::Vec3;

use vantage_engine::core::{App, AppControl, FrameCtx};
use vantage_engine::device::GpuInit;
use vantage_engine::input::{ActionMap, Key, KeyTracker, UnknownAction};
use vantage_engine::logging::{init_logging, LoggingConfig};
use vantage_engine::scene::{Camera, HemisphericLight, Mesh, Scene};
use vantage_engine::window::{Runtime, RuntimeConfig};

/// Camera speed in units per second.
const MOVE_SPEED: f32 = 6.0;

/// Camera turn rate in radians per second.
const TURN_SPEED: f32 = 1.5;

/// Engine defaults plus arrow keys for turning.
fn bindings() -> ActionMap {
    let bind = |key: Key| key.code().unwrap_or_default();
    ActionMap::new([
        ("forward", bind(Key::W)),
        ("backward", bind(Key::S)),
        ("left", bind(Key::A)),
        ("right", bind(Key::D)),
        ("jump", bind(Key::Space)),
        ("turn_left", bind(Key::ArrowLeft)),
        ("turn_right", bind(Key::ArrowRight)),
    ])
}

/// Key codes for the demo's actions, resolved once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Controls {
    forward: u32,
    backward: u32,
    left: u32,
    right: u32,
    jump: u32,
    turn_left: u32,
    turn_right: u32,
}

impl Controls {
    fn resolve(actions: &ActionMap) -> Result<Self, UnknownAction> {
        Ok(Self {
            forward: actions.resolve("forward")?,
            backward: actions.resolve("backward")?,
            left: actions.resolve("left")?,
            right: actions.resolve("right")?,
            jump: actions.resolve("jump")?,
            turn_left: actions.resolve("turn_left")?,
            turn_right: actions.resolve("turn_right")?,
        })
    }

    fn log_bindings(&self) {
        log::info!(
            "controls: move {:?}/{:?}/{:?}/{:?}, jump {:?}, turn {:?}/{:?}",
            Key::from_code(self.forward),
            Key::from_code(self.left),
            Key::from_code(self.backward),
            Key::from_code(self.right),
            Key::from_code(self.jump),
            Key::from_code(self.turn_left),
            Key::from_code(self.turn_right),
        );
    }

    /// `(forward, right)` movement axes in `[-1, 1]`.
    fn axes(&self, keys: &KeyTracker) -> (f32, f32) {
        (
            axis(keys, self.forward, self.backward),
            axis(keys, self.right, self.left),
        )
    }

    /// Turn axis in `[-1, 1]`; positive turns right.
    fn turn(&self, keys: &KeyTracker) -> f32 {
        axis(keys, self.turn_right, self.turn_left)
    }
}

fn axis(keys: &KeyTracker, plus: u32, minus: u32) -> f32 {
    let mut v = 0.0;
    if keys.is_held(plus) {
        v += 1.0;
    }
    if keys.is_held(minus) {
        v -= 1.0;
    }
    v
}

struct Demo {
    controls: Controls,
}

impl Demo {
    fn new(actions: &ActionMap) -> Result<Self, UnknownAction> {
        Ok(Self {
            controls: Controls::resolve(actions)?,
        })
    }
}

impl App for Demo {
    fn on_scene_ready(&mut self, scene: &mut Scene) {
        let mut camera = Camera::new("camera", Vec3::new(0.0, 0.0, -10.0));
        camera.look_at(Vec3::ZERO);
        scene.set_camera(camera);

        scene.add_light(HemisphericLight::new("light", Vec3::new(0.0, 1.0, 0.0)).with_intensity(0.9));
        scene.add_mesh(Mesh::cuboid("box", 2.0).with_color([0.2, 0.8, 0.6]));
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let keys = ctx.keys;

        if keys.is_held(self.controls.jump) {
            log::info!("jumped");
        }

        let dt = ctx.time.dt;
        let (forward, right) = self.controls.axes(keys);
        let turn = self.controls.turn(keys);
        if let Some(camera) = ctx.camera_mut() {
            if turn != 0.0 {
                camera.rotate(turn * TURN_SPEED * dt, 0.0);
            }
            if forward != 0.0 || right != 0.0 {
                let step = MOVE_SPEED * dt;
                camera.translate_local(forward * step, right * step, 0.0);
            }
        }

        log::trace!(
            "frame {} at {:.2}s, window {:?}, camera {:?}",
            ctx.time.frame_index,
            ctx.time.elapsed,
            ctx.window.logical_size(),
            ctx.camera().map(|c| c.position)
        );

        AppControl::Continue
    }

    fn on_scene_disposed(&mut self, scene: &mut Scene) {
        log::debug!("disposing scene with {} mesh(es)", scene.meshes().len());
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let demo = Demo::new(&bindings())?;
    demo.controls.log_bindings();

    let config = RuntimeConfig {
        title: "vantage".to_string(),
        ..Default::default()
    };

    Runtime::run(config, GpuInit::default(), demo)
}

#[cfg(test)]
mod tests {
    use vantage_engine::input::KeyboardInfo;

    use super::*;

    #[test]
    fn controls_resolve_default_bindings() {
        let controls = Controls::resolve(&bindings()).unwrap();
        assert_eq!(controls.forward, 87);
        assert_eq!(controls.jump, 32);
        assert_eq!(Key::from_code(controls.turn_left), Key::ArrowLeft);
    }

    #[test]
    fn missing_binding_fails_startup() {
        let actions = ActionMap::new([("jump", 32u32)]);
        assert_eq!(
            Demo::new(&actions).err(),
            Some(UnknownAction("forward".to_string()))
        );
    }

    #[test]
    fn opposite_keys_cancel() {
        let controls = Controls::resolve(&bindings()).unwrap();
        let keys = KeyTracker::new();

        keys.on_event(&KeyboardInfo::key_down("w", 87));
        keys.on_event(&KeyboardInfo::key_down("d", 68));
        assert_eq!(controls.axes(&keys), (1.0, 1.0));

        keys.on_event(&KeyboardInfo::key_down("s", 83));
        keys.on_event(&KeyboardInfo::key_down("a", 65));
        assert_eq!(controls.axes(&keys), (0.0, 0.0));

        keys.on_event(&KeyboardInfo::key_up("w", 87));
        assert_eq!(controls.axes(&keys), (-1.0, 0.0));
    }

    #[test]
    fn arrow_keys_turn() {
        let controls = Controls::resolve(&bindings()).unwrap();
        let keys = KeyTracker::new();
        assert_eq!(controls.turn(&keys), 0.0);

        keys.on_event(&KeyboardInfo::key_down("ArrowRight", 39));
        assert_eq!(controls.turn(&keys), 1.0);

        keys.on_event(&KeyboardInfo::key_down("ArrowLeft", 37));
        assert_eq!(controls.turn(&keys), 0.0);
    }
}
