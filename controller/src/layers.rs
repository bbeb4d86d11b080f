//! Collision layer bitmasks.
//!
//! Layers are resolved from names once, when configuration is loaded, and only the
//! resulting [`LayerMask`] flows into the controller. Nothing in the tick looks a
//! layer up by name.

use num_traits::{One, PrimInt};
use serde::{Deserialize, Serialize};

/// The storage used for collision layers. 32 layers is plenty for a platformer scene.
pub type LayerBits = u32;

/// Mask over collision layers, used to filter ray casts.
pub type LayerMask = BitmaskFlags<LayerBits>;

/// Trait implemented by user-defined flag enums.
///
/// The enum's discriminant (via `#[repr(u8)]`) typically determines the bit index.
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container.
///
/// Serializes as its raw integer so configuration files can carry a resolved mask.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// Every bit set.
    pub fn all() -> Self {
        Self {
            bits: T::max_value(),
        }
    }

    pub fn none() -> Self {
        Self { bits: T::zero() }
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    /// Whether this mask shares at least one bit with `other`.
    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// The generated enum also gets `ALL` (every variant in declaration order) and
/// `from_name`, which matches the variant name case-insensitively. Use `from_name`
/// at configuration load only.
///
/// Example:
/// ```rust
/// controller::define_bitmask_flags!(SceneLayer, u32, {
///     Ground,
///     Platform,
///     Hazard,
/// });
///
/// assert_eq!(SceneLayer::from_name("platform"), Some(SceneLayer::Platform));
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| format!("{:?}", v).eq_ignore_ascii_case(name))
            }
        }

        impl $crate::layers::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}
