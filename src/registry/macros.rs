//! Macros generating tagged state and transition enums.

/// Generate a state enum, its kind enum and the `State` trait implementation.
///
/// Every variant wraps exactly one payload type; the payload types must be
/// distinct. `entity_id: field` additionally implements
/// [`Identified`](crate::core::Identified) by reading `field` from every payload.
///
/// # Example
///
/// ```
/// use switchyard::core::{EntityId, Identified, State};
/// use switchyard::state_enum;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Open { pub id: EntityId }
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Closed { pub id: EntityId }
///
/// state_enum! {
///     pub enum TicketState: TicketStateKind {
///         Open(Open),
///         Closed(Closed),
///     }
///     entity_id: id
///     final: [Closed]
/// }
///
/// let id = EntityId::new();
/// let state: TicketState = Closed { id }.into();
/// assert_eq!(state.entity_id(), id);
/// assert!(state.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident ( $payload:ty )
            ),* $(,)?
        }

        entity_id: $id:ident
        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $crate::state_enum! {
            $(#[$meta])*
            $vis enum $name : $kind {
                $(
                    $(#[$variant_meta])*
                    $variant ( $payload )
                ),*
            }
            $(final: [$($final),*])?
        }

        impl $crate::core::Identified for $name {
            fn entity_id(&self) -> $crate::core::EntityId {
                match self {
                    $(Self::$variant(inner) => inner.$id,)*
                }
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident ( $payload:ty )
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $crate::__variant_enum! {
            $(#[$meta])*
            $vis enum $name : $kind {
                $(
                    $(#[$variant_meta])*
                    $variant ( $payload )
                ),*
            }
        }

        impl $crate::core::State for $name {
            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match <Self as $crate::core::Variant>::kind(self) {
                    $($($kind::$final => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

/// Generate a transition enum, its kind enum and the `Transition` trait implementation.
///
/// # Example
///
/// ```
/// use switchyard::core::Variant;
/// use switchyard::transition_enum;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Started;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// pub struct Failed { pub reason: String }
///
/// transition_enum! {
///     pub enum JobEvent: JobEventKind {
///         Started(Started),
///         Failed(Failed),
///     }
/// }
///
/// let event: JobEvent = Failed { reason: "disk full".into() }.into();
/// assert_eq!(event.kind(), JobEventKind::Failed);
/// ```
#[macro_export]
macro_rules! transition_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident ( $payload:ty )
            ),* $(,)?
        }
    ) => {
        $crate::__variant_enum! {
            $(#[$meta])*
            $vis enum $name : $kind {
                $(
                    $(#[$variant_meta])*
                    $variant ( $payload )
                ),*
            }
        }

        impl $crate::core::Transition for $name {}
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __variant_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident ( $payload:ty )
            ),*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($payload)
            ),*
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $kind {
            $($variant),*
        }

        impl $kind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [$kind] = &[$($kind::$variant),*];
        }

        impl $crate::core::Tag for $kind {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(<Self as $crate::core::Tag>::name(self))
            }
        }

        impl $crate::core::Variant for $name {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                match self {
                    $(Self::$variant(_) => $kind::$variant),*
                }
            }
        }

        $(
            impl ::std::convert::From<$payload> for $name {
                fn from(value: $payload) -> Self {
                    Self::$variant(value)
                }
            }

            impl $crate::core::VariantOf<$name> for $payload {
                const KIND: $kind = $kind::$variant;

                #[allow(unreachable_patterns)]
                fn project(value: &$name) -> ::std::option::Option<&Self> {
                    match value {
                        $name::$variant(inner) => ::std::option::Option::Some(inner),
                        _ => ::std::option::Option::None,
                    }
                }
            }
        )*
    };
}
