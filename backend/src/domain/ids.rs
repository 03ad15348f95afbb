//! Strongly typed UUID identifiers.
//!
//! Every aggregate gets its own identifier type so a meeting id can never be
//! passed where a university id is expected.

/// Error raised when text is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidIdError {
    /// Name of the identifier type.
    pub kind: &'static str,
}

macro_rules! uuid_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse an identifier from client input.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, $crate::domain::InvalidIdError> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err($crate::domain::InvalidIdError { kind: stringify!($name) });
                }
                ::uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| $crate::domain::InvalidIdError { kind: stringify!($name) })
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID, typically read from storage.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::InvalidIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user account of any role.
    UserId
);
uuid_id!(
    /// Identifier of a university profile.
    UniversityId
);
uuid_id!(
    /// Identifier of a study program.
    ProgramId
);
uuid_id!(
    /// Identifier of a meeting (a booking request is a pending meeting).
    MeetingId
);
uuid_id!(
    /// Identifier of an in-app notification.
    NotificationId
);
uuid_id!(
    /// Identifier of a support ticket.
    TicketId
);
uuid_id!(
    /// Identifier of a campus fair host request.
    HostRequestId
);
uuid_id!(
    /// Identifier of an outreach invitation sent to a university.
    OutreachId
);
