//! `define_port_error!` generates the error enums returned by driven ports.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! `String` parameters accept anything `Into<String>`, so adapters can write
//! `RepositoryError::query(err.to_string())` or `EmailError::rejected(502_u16, "bad gateway")`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum DeliveryError {
            Offline => "provider offline",
            Transport { message: String } => "transport failed: {message}",
            Rejected { status: u16, message: String } => "rejected with {status}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(DeliveryError::offline().to_string(), "provider offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = DeliveryError::transport("timeout");
        assert_eq!(err.to_string(), "transport failed: timeout");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = DeliveryError::rejected(422_u16, "bad address");
        assert_eq!(err.to_string(), "rejected with 422: bad address");
        assert!(matches!(err, DeliveryError::Rejected { status: 422, .. }));
    }
}
