//! Surrogate-key id newtypes.
//!
//! Every entity in the store is keyed by an auto-incrementing integer
//! primary key, assigned by the store on insert. [`define_id!`] generates a
//! small `Copy` newtype around `i64` per entity so ids for different
//! entities cannot be confused at the type level, while still behaving
//! like plain integers for ordering, hashing, and (de)serialization.

/// Generate an id newtype wrapping `i64`.
///
/// ```ignore
/// crate::define_id!(AgentId);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Construct from a raw surrogate key. Used by the store when
            /// materializing rows; callers otherwise receive ids, never mint them.
            pub fn from_raw(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
