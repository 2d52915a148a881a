//! GKE cluster name parsing.

use std::fmt;

const GKE_PREFIX: &str = "gke";

/// A cluster name of the form `gke_<project>_<location>_<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GkeClusterName {
    /// GCP project ID.
    pub project: String,
    /// Region or zone.
    pub location: String,
    /// Short cluster name.
    pub name: String,
}

impl GkeClusterName {
    /// Parse a kubeconfig cluster name.
    ///
    /// Returns `None` unless the name splits on `_` into exactly four
    /// segments and the first one is `gke`. Segment contents are not
    /// validated.
    #[must_use]
    pub fn parse(cluster: &str) -> Option<Self> {
        let parts: Vec<&str> = cluster.split('_').collect();
        match parts.as_slice() {
            [GKE_PREFIX, project, location, name] => Some(Self {
                project: (*project).to_string(),
                location: (*location).to_string(),
                name: (*name).to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for GkeClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{GKE_PREFIX}_{}_{}_{}",
            self.project, self.location, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zonal_cluster() {
        let parsed = GkeClusterName::parse("gke_my-project_us-central1-a_mycluster").unwrap();
        assert_eq!(parsed.project, "my-project");
        assert_eq!(parsed.location, "us-central1-a");
        assert_eq!(parsed.name, "mycluster");
    }

    #[test]
    fn test_parse_regional_cluster() {
        let parsed = GkeClusterName::parse("gke_acme-prod_europe-west1_main").unwrap();
        assert_eq!(parsed.project, "acme-prod");
        assert_eq!(parsed.location, "europe-west1");
    }

    #[test]
    fn test_parse_rejects_non_gke_names() {
        assert_eq!(GkeClusterName::parse("minikube"), None);
        assert_eq!(GkeClusterName::parse("kind-kind"), None);
        assert_eq!(GkeClusterName::parse("eks_proj_loc_name"), None);
        assert_eq!(GkeClusterName::parse("gkeproj_loc_name_x"), None);
        assert_eq!(GkeClusterName::parse(""), None);
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        assert_eq!(GkeClusterName::parse("gke_proj_loc"), None);
        assert_eq!(GkeClusterName::parse("gke_proj_loc_name_extra"), None);
        assert_eq!(GkeClusterName::parse("gke_"), None);
    }

    #[test]
    fn test_parse_is_purely_syntactic() {
        // Empty segments are accepted as long as the shape matches.
        let parsed = GkeClusterName::parse("gke___").unwrap();
        assert_eq!(parsed.project, "");
        assert_eq!(parsed.location, "");
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn test_display_round_trip() {
        let name = "gke_my-project_us-central1-a_mycluster";
        assert_eq!(GkeClusterName::parse(name).unwrap().to_string(), name);
    }
}
