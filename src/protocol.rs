use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The quarantine protocol an infected person follows.
///
/// Protocol names parse and print in `snake_case` (`"normal_behavior"`,
/// `"social_distancing"`); parsing is exact and case-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Protocol {
    NormalBehavior,
    SocialDistancing,
}

impl Protocol {
    /// Maps the outcome of the protocol Bernoulli draw: a success (1) is normal
    /// behavior, a failure (0) is social distancing.
    #[must_use]
    pub fn from_flag(flag: bool) -> Protocol {
        if flag {
            Protocol::NormalBehavior
        } else {
            Protocol::SocialDistancing
        }
    }

    /// The value the protocol site takes for this protocol.
    #[must_use]
    pub fn flag(self) -> f64 {
        match self {
            Protocol::NormalBehavior => 1.0,
            Protocol::SocialDistancing => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Protocol;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_canonical_names_only() {
        assert_eq!(
            Protocol::from_str("normal_behavior").unwrap(),
            Protocol::NormalBehavior
        );
        assert_eq!(
            Protocol::from_str("social_distancing").unwrap(),
            Protocol::SocialDistancing
        );
        assert!(Protocol::from_str("social_distanicng").is_err());
        assert!(Protocol::from_str("Normal_Behavior").is_err());
        assert!(Protocol::from_str("").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for protocol in Protocol::iter() {
            assert_eq!(protocol.to_string().parse::<Protocol>().unwrap(), protocol);
        }
        assert_eq!(Protocol::SocialDistancing.as_ref(), "social_distancing");
    }

    #[test]
    fn flag_mapping() {
        assert_eq!(Protocol::from_flag(true), Protocol::NormalBehavior);
        assert_eq!(Protocol::from_flag(false), Protocol::SocialDistancing);
        assert_eq!(Protocol::NormalBehavior.flag(), 1.0);
        assert_eq!(Protocol::SocialDistancing.flag(), 0.0);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Protocol::NormalBehavior).unwrap();
        assert_eq!(json, "\"normal_behavior\"");
        let parsed: Protocol = serde_json::from_str("\"social_distancing\"").unwrap();
        assert_eq!(parsed, Protocol::SocialDistancing);
    }
}
