//! Deterministic idle-game economy: currencies, generators, automators,
//! modifiers, and the world that drives them.
//!
//! # Architecture
//!
//! - [`item`] -- Level and price progression shared by everything buyable.
//! - [`currency`] -- Named, arbitrary-precision balances.
//! - [`generator`] -- Leveled production units with remainder banking and
//!   optional probability gates.
//! - [`automator`] -- Fixed-interval triggers with offline catch-up.
//! - [`modifier`] -- Reversible world and generator effects.
//! - [`world`] -- The aggregate root and simulated-time driver.
//! - [`snapshot`] -- Serializable state records for save/load.
//! - [`numeric`] -- Exact products of big integers and `f64` factors.
//!
//! # Ownership
//!
//! The [`World`] owns every entity. Entities refer to each other by id
//! only, and every operation that spans two entities (a generator paying
//! into its currency, a purchase, a modifier touching a generator) is a
//! `World` method. Nothing here is thread-safe by itself; hosts that share
//! a world across threads must serialize access.
//!
//! The library never panics; it returns errors.
//!
//! # Usage
//!
//! ```
//! use clicker_economy::{
//!     AutomatorConfig, CurrencyConfig, EffectConfig, GeneratorConfig, ModifierConfig, World,
//! };
//! use clicker_types::PurchaseResult;
//! use num_bigint::BigInt;
//!
//! let mut world = World::new(1);
//! let gold = world.add_currency(CurrencyConfig::named("Gold")).ok().unwrap_or_default();
//! let mine = world
//!     .add_generator(GeneratorConfig {
//!         name: "Mine".to_owned(),
//!         base_amount: BigInt::from(5),
//!         ..GeneratorConfig::for_currency(gold)
//!     })
//!     .ok()
//!     .unwrap_or_default();
//!
//! // The first level costs the base price of 1.
//! world.currency_mut(gold).map(|c| c.add(&BigInt::from(1)));
//! assert_eq!(world.buy_generator(mine, gold).ok(), Some(PurchaseResult::Ok));
//!
//! world.add_automator(AutomatorConfig::for_generator(mine)).ok();
//! let double = world
//!     .add_modifier(ModifierConfig::new(EffectConfig::speed_by(2.0)))
//!     .ok()
//!     .unwrap_or_default();
//! world.enable_modifier(double).ok();
//!
//! // Five seconds at double speed fire the mine ten times.
//! assert_eq!(world.update(5.0), 10);
//! assert_eq!(world.currency(gold).map(|c| c.amount_string()), Some("50".to_owned()));
//! ```

pub mod automator;
pub mod currency;
pub mod error;
pub mod generator;
pub mod item;
pub mod modifier;
pub mod numeric;
pub mod snapshot;
pub mod world;

// Re-export primary types at crate root.
pub use automator::{Automator, AutomatorConfig};
pub use currency::{Currency, CurrencyConfig};
pub use error::{EconomyError, EconomyResult};
pub use generator::{Generator, GeneratorConfig, Processed, ProcessedCallback};
pub use item::Item;
pub use modifier::{EffectConfig, Modifier, ModifierConfig, ModifierEffect};
pub use snapshot::WorldSnapshot;
pub use world::{TimeScale, World};
