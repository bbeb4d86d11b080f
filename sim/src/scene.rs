//! Scene description parsing from `.toml` files.
//!
//! A scene holds the controller's configuration, the level colliders, and a schedule of
//! inputs. Layer names are resolved into masks here, once; nothing downstream sees them.

use std::path::Path;

use anyhow::{Context, Result, bail};
use controller::collision::Quat;
use controller::{
    ColliderShapeDef, ControllerSettings, LayerMask, ParameterProfile, Preset, ResolveStrategy,
    Sequential, Simultaneous, Vec3, WorldStaticDef,
};
use serde::Deserialize;

controller::define_bitmask_flags!(SceneLayer, u32, {
    World,
    Ground,
    Platform,
    Wall,
    Hazard,
});

/// Resolve layer names into a mask. An empty list means every layer.
pub fn layer_mask(names: &[String]) -> Result<LayerMask> {
    if names.is_empty() {
        return Ok(LayerMask::all());
    }
    let mut mask = LayerMask::none();
    for name in names {
        let Some(layer) = SceneLayer::from_name(name) else {
            bail!("unknown layer `{name}`");
        };
        mask.add(layer);
    }
    Ok(mask)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyConfig {
    #[default]
    Sequential,
    Simultaneous,
}

/// `[controller]` section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    #[serde(flatten)]
    pub settings: ControllerSettings,
    /// Layer names the rays collide with.
    pub collide_with: Vec<String>,
    pub strategy: StrategyConfig,
    /// Sweeps for the simultaneous strategy.
    pub iterations: Option<u32>,
}

impl ControllerConfig {
    pub fn resolved_settings(&self) -> Result<ControllerSettings> {
        Ok(ControllerSettings {
            layers: layer_mask(&self.collide_with)?,
            ..self.settings
        })
    }

    pub fn strategy(&self) -> Box<dyn ResolveStrategy> {
        match self.strategy {
            StrategyConfig::Sequential => Box::new(Sequential),
            StrategyConfig::Simultaneous => Box::new(match self.iterations {
                Some(iterations) => Simultaneous { iterations },
                None => Simultaneous::default(),
            }),
        }
    }
}

/// One `[[statics]]` entry.
#[derive(Clone, Debug, Deserialize)]
pub struct StaticConfig {
    pub id: u32,
    pub translation: [f32; 3],
    /// Euler angles (roll, pitch, yaw) in degrees.
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    pub shape: ColliderShapeDef,
    #[serde(default)]
    pub layers: Vec<String>,
    /// Non-zero makes the collider a moving platform.
    #[serde(default)]
    pub velocity: [f32; 3],
}

impl StaticConfig {
    pub fn to_def(&self) -> Result<WorldStaticDef> {
        let [roll, pitch, yaw] = self.rotation_deg.map(f32::to_radians);
        Ok(WorldStaticDef {
            id: self.id,
            translation: Vec3::from(self.translation),
            rotation: Quat::from_euler_angles(roll, pitch, yaw),
            shape: self.shape.clone(),
            layers: layer_mask(&self.layers)
                .with_context(|| format!("static {}", self.id))?,
            linear_velocity: Vec3::from(self.velocity),
        })
    }
}

/// Input applied before a given tick runs.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Jump,
    Steer { direction: [f32; 3] },
    Impulse { impulse: [f32; 3] },
    SetForce { force: [f32; 3] },
    Preset { preset: Preset },
    ClearOverride,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScheduledAction {
    pub tick: u32,
    #[serde(flatten)]
    pub action: Action,
}

/// A whole scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub spawn: [f32; 3],
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub profile: ParameterProfile,
    #[serde(default)]
    pub statics: Vec<StaticConfig>,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

impl Scene {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scene: Scene = toml::from_str(content)?;
        scene.actions.sort_by_key(|a| a.tick);
        Ok(scene)
    }

    pub fn world_defs(&self) -> Result<Vec<WorldStaticDef>> {
        self.statics.iter().map(StaticConfig::to_def).collect()
    }

    /// Actions scheduled for `tick`, in file order.
    pub fn actions_at(&self, tick: u32) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |a| a.tick == tick)
            .map(|a| &a.action)
    }
}
