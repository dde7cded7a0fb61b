//! Macro for implementing Display and FromStr for plain string enums
//!
//! The platform reports plans and similar tags as lowercase strings. This
//! macro gives such enums a single mapping used for both printing and
//! case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use emo_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SensorKind {
//!     Movement,
//!     Human,
//!     Lock,
//!     Room,
//! }
//!
//! impl_domain_status_conversions!(SensorKind {
//!     Movement => "movement_sensor",
//!     Human => "human_sensor",
//!     Lock => "lock_sensor",
//!     Room => "room_sensor",
//! });
//! ```

/// Implements Display and FromStr traits for string-tagged enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase wire
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel {
        Personal,
        Business,
    }

    impl_domain_status_conversions!(Channel {
        Personal => "personal",
        Business => "business",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(Channel::Personal.to_string(), "personal");
        assert_eq!(Channel::Business.to_string(), "business");
    }

    #[test]
    fn test_fromstr_ignores_case_and_whitespace() {
        assert_eq!(Channel::from_str("PERSONAL").unwrap(), Channel::Personal);
        assert_eq!(Channel::from_str(" Business ").unwrap(), Channel::Business);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Channel::from_str("enterprise");
        assert!(result.unwrap_err().contains("Invalid Channel: enterprise"));
        assert!(Channel::from_str("").is_err());
    }

    mod with_result_alias {
        use std::str::FromStr;

        #[allow(dead_code)]
        type Result<T> = std::result::Result<T, String>;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Tier {
            Basic,
            Advanced,
        }

        impl_domain_status_conversions!(Tier {
            Basic => "basic",
            Advanced => "advanced",
        });

        #[test]
        fn expands_next_to_a_single_parameter_result_alias() {
            assert_eq!(Tier::from_str("advanced").unwrap(), Tier::Advanced);
            assert_eq!(Tier::Basic.to_string(), "basic");
        }
    }
}
