//! Type predicates the simplifier needs, standing in for the opaque
//! `struct symbol *` type pointer of the original (signedness, float-ness,
//! volatility, purity, bit width — nothing else is ever queried).

use serde::{Deserialize, Serialize};

/// Handle into `Entrypoint::types`. Opaque to everything except `TypeInfo` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub bit_size: u32,
    pub signed: bool,
    pub is_float: bool,
    pub is_pointer: bool,
    pub volatile: bool,
    /// MOD_PURE: a call to a symbol of this type has no observable side effects.
    pub pure_fn: bool,
}

impl TypeInfo {
    pub const fn int(bit_size: u32, signed: bool) -> Self {
        Self {
            bit_size,
            signed,
            is_float: false,
            is_pointer: false,
            volatile: false,
            pure_fn: false,
        }
    }

    pub const fn pointer(bit_size: u32) -> Self {
        Self {
            bit_size,
            signed: false,
            is_float: false,
            is_pointer: true,
            volatile: false,
            pure_fn: false,
        }
    }

    pub const fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    pub const fn pure_function(mut self) -> Self {
        self.pure_fn = true;
        self
    }
}
