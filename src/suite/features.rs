//! Feature and channel vocabulary
//!
//! Closed enumerations used by the per-test gate checks. Membership is
//! set-based; channel comparisons use the ordinal ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional capabilities an implementation may opt into.
///
/// A test listing one of these only runs when the suite declares support
/// for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SupportedFeature {
    /// Support for the ReferencePolicy object.
    ReferencePolicy,
    /// HTTPRoute rules matching on query parameters.
    HttpRouteQueryParamMatching,
    /// HTTPRoute rules matching on the request method.
    HttpRouteMethodMatching,
    /// Response header modification filters on HTTPRoute rules.
    HttpResponseHeaderModification,
    /// Route backendRefs selecting a destination port.
    RouteDestinationPortMatching,
}

impl SupportedFeature {
    pub fn name(&self) -> &'static str {
        match self {
            SupportedFeature::ReferencePolicy => "ReferencePolicy",
            SupportedFeature::HttpRouteQueryParamMatching => "HTTPRouteQueryParamMatching",
            SupportedFeature::HttpRouteMethodMatching => "HTTPRouteMethodMatching",
            SupportedFeature::HttpResponseHeaderModification => "HTTPResponseHeaderModification",
            SupportedFeature::RouteDestinationPortMatching => "RouteDestinationPortMatching",
        }
    }

    pub fn all() -> Vec<SupportedFeature> {
        vec![
            SupportedFeature::ReferencePolicy,
            SupportedFeature::HttpRouteQueryParamMatching,
            SupportedFeature::HttpRouteMethodMatching,
            SupportedFeature::HttpResponseHeaderModification,
            SupportedFeature::RouteDestinationPortMatching,
        ]
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<SupportedFeature> {
        Self::all()
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for SupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Core requirements an implementation may opt out of, having put
/// alternative safeguards in place.
///
/// A test listing one of these only runs when the suite declares the
/// matching exemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ExemptFeature {
    /// The implementation exempts itself from requiring a ReferencePolicy
    /// for cross-namespace references.
    ReferencePolicy,
}

impl ExemptFeature {
    pub fn name(&self) -> &'static str {
        match self {
            ExemptFeature::ReferencePolicy => "ReferencePolicy",
        }
    }

    pub fn all() -> Vec<ExemptFeature> {
        vec![ExemptFeature::ReferencePolicy]
    }

    pub fn from_str(s: &str) -> Option<ExemptFeature> {
        Self::all()
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ExemptFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Release channel of the Gateway API resources under test.
///
/// Ordered: a suite configured for `Experimental` runs everything, while
/// the default `Standard` setting runs standard-channel tests only. A test
/// runs when its minimum channel is at or above the suite's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Experimental = 1,
    Standard = 2,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Experimental => "experimental",
            Channel::Standard => "standard",
        }
    }

    pub fn from_str(s: &str) -> Option<Channel> {
        match s.to_lowercase().as_str() {
            "experimental" => Some(Channel::Experimental),
            "standard" => Some(Channel::Standard),
            _ => None,
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Channel::Standard
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_ordering() {
        assert!(Channel::Experimental < Channel::Standard);
        assert_eq!(Channel::default(), Channel::Standard);
    }

    #[test]
    fn test_channel_from_str() {
        assert_eq!(Channel::from_str("Standard"), Some(Channel::Standard));
        assert_eq!(
            Channel::from_str("experimental"),
            Some(Channel::Experimental)
        );
        assert_eq!(Channel::from_str("stable"), None);
    }

    #[test]
    fn test_supported_feature_from_str() {
        assert_eq!(
            SupportedFeature::from_str("ReferencePolicy"),
            Some(SupportedFeature::ReferencePolicy)
        );
        assert_eq!(
            SupportedFeature::from_str("httproutemethodmatching"),
            Some(SupportedFeature::HttpRouteMethodMatching)
        );
        assert_eq!(SupportedFeature::from_str("TcpRoute"), None);
    }

    #[test]
    fn test_exempt_feature_from_str() {
        assert_eq!(
            ExemptFeature::from_str("referencepolicy"),
            Some(ExemptFeature::ReferencePolicy)
        );
        assert_eq!(ExemptFeature::from_str("other"), None);
    }

    #[test]
    fn test_feature_names_unique() {
        let mut names: Vec<_> = SupportedFeature::all().iter().map(|f| f.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
