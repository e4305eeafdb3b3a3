//! `define_port_error!`: error enums for driven ports.
//!
//! Every variant carries named fields. The macro derives `thiserror::Error`
//! and adds one snake_case constructor per variant whose parameters accept
//! anything convertible into the field types, so adapters can write
//! `UserPersistenceError::query("...")` or pass an owned `String`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Build the `" $variant "` variant."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum SampleError {
            Unreachable { message: String } => "sample unreachable: {message}",
            Throttled { retry_after_secs: u64 } => "sample throttled for {retry_after_secs}s",
            Rejected { field: String, attempts: u32 } => "sample rejected {field} after {attempts} tries",
        }
    }

    #[rstest]
    fn constructors_are_snake_case_and_take_str() {
        let error = SampleError::unreachable("dns");
        assert_eq!(error, SampleError::Unreachable { message: "dns".into() });
        assert_eq!(error.to_string(), "sample unreachable: dns");
    }

    #[rstest]
    fn multi_word_variants_keep_numeric_fields() {
        assert_eq!(
            SampleError::throttled(30_u64).to_string(),
            "sample throttled for 30s"
        );
        assert_eq!(
            SampleError::rejected(String::from("email"), 3_u32).to_string(),
            "sample rejected email after 3 tries"
        );
    }
}
