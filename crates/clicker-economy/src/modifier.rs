//! Modifiers: reversible effects on the world or on one generator.
//!
//! A modifier is built inert. [`World::enable_modifier`](crate::World::enable_modifier)
//! applies its effect exactly once and
//! [`World::disable_modifier`](crate::World::disable_modifier) undoes it
//! exactly once; repeated calls are no-ops. The enabled flag lives only on
//! [`Modifier`] and is toggled only by its `enable`/`disable` guards; the
//! effect variants never touch it.
//!
//! Effects compose multiplicatively. A world speed effect multiplies the
//! world's *current* speed by its own factor on enable and divides the
//! *current* speed by the same factor on disable, so any interleaving of
//! enables and disables ends at a consistent product. World effects that
//! suspend automation are reference counted: automation resumes only once
//! every suspending effect has been disabled.

use serde::{Deserialize, Serialize};

use clicker_types::{GeneratorId, ModifierId, ModifierTarget};

use crate::error::{EconomyError, EconomyResult};
use crate::generator::Generator;
use crate::item::validate_name;
use crate::world::TimeScale;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What a modifier does, as supplied at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectConfig {
    /// Scale global simulation speed and/or suspend automation.
    World {
        /// Factor applied to the world speed multiplier; finite and positive.
        speed_multiplier: f64,
        /// Whether automators stop while this modifier is enabled.
        disable_automation: bool,
    },
    /// Scale one generator's output.
    Generator {
        /// The generator affected.
        generator: GeneratorId,
        /// Factor applied to its output; finite and non-negative.
        multiplier: f64,
    },
}

impl EffectConfig {
    /// A world effect that only changes speed.
    pub const fn speed_by(factor: f64) -> Self {
        Self::World {
            speed_multiplier: factor,
            disable_automation: false,
        }
    }

    /// A world effect that only suspends automation.
    pub const fn disable_automation() -> Self {
        Self::World {
            speed_multiplier: 1.0,
            disable_automation: true,
        }
    }

    /// A generator output effect.
    pub const fn output_by(generator: GeneratorId, multiplier: f64) -> Self {
        Self::Generator {
            generator,
            multiplier,
        }
    }
}

/// Construction parameters for a [`Modifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierConfig {
    /// Display name; must not be empty.
    pub name: String,
    /// The effect applied while enabled.
    pub effect: EffectConfig,
}

impl ModifierConfig {
    /// A modifier with a name derived from its target kind.
    pub fn new(effect: EffectConfig) -> Self {
        let name = match effect {
            EffectConfig::World { .. } => "World modifier",
            EffectConfig::Generator { .. } => "Generator modifier",
        };
        Self {
            name: name.to_owned(),
            effect,
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// The parts of the world an effect may touch.
pub(crate) struct EffectScope<'a> {
    /// The modifier applying the effect.
    pub modifier: ModifierId,
    /// Global speed and automation switch.
    pub time: &'a mut TimeScale,
    /// All registered generators.
    pub generators: &'a mut [Generator],
}

/// Apply/revert pair implemented by every effect variant.
pub(crate) trait Effect {
    /// Apply the effect once.
    fn apply(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()>;

    /// Undo exactly what `apply` did.
    fn revert(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()>;
}

/// World speed before and after a speed effect was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedSpeed {
    /// World speed multiplier just before enabling.
    pub before: f64,
    /// World speed multiplier just after enabling.
    pub after: f64,
}

/// Global speed / automation effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldEffect {
    speed_multiplier: f64,
    disable_automation: bool,
    applied: Option<AppliedSpeed>,
}

impl WorldEffect {
    /// Factor this effect contributes to world speed.
    pub const fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Whether this effect suspends automation.
    pub const fn disables_automation(&self) -> bool {
        self.disable_automation
    }

    /// Speeds recorded when this effect was last applied.
    pub const fn applied(&self) -> Option<AppliedSpeed> {
        self.applied
    }

    fn changes_speed(&self) -> bool {
        (self.speed_multiplier - 1.0).abs() > f64::EPSILON
    }
}

impl Effect for WorldEffect {
    fn apply(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        if self.disable_automation {
            scope.time.suspend_automation()?;
        }
        if self.changes_speed() {
            let before = scope.time.speed_multiplier();
            let after = scope.time.scale_speed(self.speed_multiplier);
            self.applied = Some(AppliedSpeed { before, after });
        }
        Ok(())
    }

    fn revert(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        if self.changes_speed() {
            scope.time.unscale_speed(self.speed_multiplier);
        }
        if self.disable_automation {
            scope.time.resume_automation();
        }
        self.applied = None;
        Ok(())
    }
}

/// Output multiplier for one generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorEffect {
    generator: GeneratorId,
    multiplier: f64,
}

impl GeneratorEffect {
    /// The generator affected.
    pub const fn generator(&self) -> GeneratorId {
        self.generator
    }

    /// Factor applied to its output.
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Effect for GeneratorEffect {
    fn apply(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        let generator = scope
            .generators
            .iter_mut()
            .find(|g| g.id() == self.generator)
            .ok_or(EconomyError::GeneratorNotFound(self.generator))?;
        generator.attach_modifier(scope.modifier, self.multiplier);
        Ok(())
    }

    fn revert(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        // A generator removed from the world has nothing left to detach.
        if let Some(generator) = scope.generators.iter_mut().find(|g| g.id() == self.generator) {
            generator.detach_modifier(scope.modifier);
        }
        Ok(())
    }
}

/// The effect carried by a modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierEffect {
    /// Global speed / automation effect.
    World(WorldEffect),
    /// Single-generator output effect.
    Generator(GeneratorEffect),
}

impl ModifierEffect {
    fn from_config(config: EffectConfig) -> EconomyResult<Self> {
        match config {
            EffectConfig::World {
                speed_multiplier,
                disable_automation,
            } => {
                if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 {
                    return Err(EconomyError::invalid_argument(
                        "speed_multiplier",
                        format!("must be finite and positive, got {speed_multiplier}"),
                    ));
                }
                Ok(Self::World(WorldEffect {
                    speed_multiplier,
                    disable_automation,
                    applied: None,
                }))
            }
            EffectConfig::Generator {
                generator,
                multiplier,
            } => {
                if !multiplier.is_finite() || multiplier < 0.0 {
                    return Err(EconomyError::invalid_argument(
                        "multiplier",
                        format!("must be finite and non-negative, got {multiplier}"),
                    ));
                }
                Ok(Self::Generator(GeneratorEffect {
                    generator,
                    multiplier,
                }))
            }
        }
    }

    /// Which kind of entity this effect targets.
    pub const fn target(&self) -> ModifierTarget {
        match self {
            Self::World(_) => ModifierTarget::World,
            Self::Generator(_) => ModifierTarget::Generator,
        }
    }
}

impl Effect for ModifierEffect {
    fn apply(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        match self {
            Self::World(effect) => effect.apply(scope),
            Self::Generator(effect) => effect.apply(scope),
        }
    }

    fn revert(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<()> {
        match self {
            Self::World(effect) => effect.revert(scope),
            Self::Generator(effect) => effect.revert(scope),
        }
    }
}

// ---------------------------------------------------------------------------
// Modifier
// ---------------------------------------------------------------------------

/// A named, reversible effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    id: ModifierId,
    name: String,
    enabled: bool,
    effect: ModifierEffect,
}

impl Modifier {
    /// Build an inert (disabled) modifier.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the name is empty or the
    /// effect factor is out of range.
    pub fn new(config: ModifierConfig) -> EconomyResult<Self> {
        Self::with_id(ModifierId::new(), config)
    }

    pub(crate) fn with_id(id: ModifierId, config: ModifierConfig) -> EconomyResult<Self> {
        validate_name(&config.name)?;
        Ok(Self {
            id,
            name: config.name,
            enabled: false,
            effect: ModifierEffect::from_config(config.effect)?,
        })
    }

    /// This modifier's id.
    pub const fn id(&self) -> ModifierId {
        self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the effect is currently applied.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The effect carried.
    pub const fn effect(&self) -> &ModifierEffect {
        &self.effect
    }

    /// Which kind of entity this modifier targets.
    pub const fn target(&self) -> ModifierTarget {
        self.effect.target()
    }

    /// Apply the effect unless already applied. Returns `true` if the
    /// state changed. On error nothing is applied and the modifier stays
    /// disabled.
    pub(crate) fn enable(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<bool> {
        if self.enabled {
            return Ok(false);
        }
        self.effect.apply(scope)?;
        self.enabled = true;
        tracing::debug!(modifier = %self.id, name = self.name.as_str(), "modifier enabled");
        Ok(true)
    }

    /// Revert the effect if applied. Returns `true` if the state changed.
    pub(crate) fn disable(&mut self, scope: &mut EffectScope<'_>) -> EconomyResult<bool> {
        if !self.enabled {
            return Ok(false);
        }
        self.effect.revert(scope)?;
        self.enabled = false;
        tracing::debug!(modifier = %self.id, name = self.name.as_str(), "modifier disabled");
        Ok(true)
    }

    pub(crate) const fn restore_state(&mut self, enabled: bool, applied: Option<AppliedSpeed>) {
        self.enabled = enabled;
        if let ModifierEffect::World(effect) = &mut self.effect {
            effect.applied = applied;
        }
    }
}
