//! Newtype IDs for type-safe references to remote ERP records.
//!
//! Every record this service touches (partners, products, sale orders,
//! invoices, countries) lives in the remote ERP and is referenced only by an
//! opaque integer identifier returned from the object API. The `define_id!`
//! macro creates type-safe wrappers so those identifiers cannot be mixed up.

/// Macro to define a type-safe ID wrapper around a remote record identifier.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use formbridge_core::define_id;
/// define_id!(PartnerId);
/// define_id!(SaleOrderId);
///
/// let partner_id = PartnerId::new(7);
/// let order_id = SaleOrderId::new(7);
///
/// // These are different types, so this won't compile:
/// // let _: PartnerId = order_id;
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
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Remote entity IDs, one per ERP model this service touches.
define_id!(PartnerId);
define_id!(ProductId);
define_id!(SaleOrderId);
define_id!(InvoiceId);
define_id!(CountryId);
