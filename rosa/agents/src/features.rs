use fixture_model::{ClusterProfile, Profile};

/// The effective feature toggles of a profile. Some toggles imply others, and this is the one
/// place where that is decided; both resource preparation and flag projection read toggles
/// through it.
#[derive(Debug, Clone, Copy)]
pub struct Features<'a> {
    profile: &'a Profile,
}

impl<'a> Features<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    pub fn cluster(&self) -> &'a ClusterProfile {
        &self.profile.cluster
    }

    pub fn sts(&self) -> bool {
        self.cluster().sts
    }

    pub fn hcp(&self) -> bool {
        self.cluster().hcp
    }

    /// A private hosted control plane is only reachable through private link.
    pub fn private_link(&self) -> bool {
        self.cluster().private_link || (self.cluster().private && self.cluster().hcp)
    }

    pub fn byo_vpc(&self) -> bool {
        self.cluster().byo_vpc
    }

    pub fn shared_vpc(&self) -> bool {
        self.cluster().shared_vpc
    }

    /// The requested availability zones, blanks removed.
    pub fn zones(&self) -> Vec<String> {
        self.cluster()
            .zones
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn version_requested(&self) -> bool {
        !self.profile.version.trim().is_empty()
    }
}

#[test]
fn private_hosted_cp_implies_private_link() {
    let mut profile = Profile::default();
    profile.cluster.private = true;
    assert!(!Features::new(&profile).private_link());
    profile.cluster.hcp = true;
    assert!(Features::new(&profile).private_link());
    profile.cluster.private = false;
    assert!(!Features::new(&profile).private_link());
    profile.cluster.private_link = true;
    assert!(Features::new(&profile).private_link());
}

#[test]
fn zones_drop_blanks() {
    let mut profile = Profile::default();
    assert!(Features::new(&profile).zones().is_empty());
    profile.cluster.zones = Some("us-east-2a, ,us-east-2b,".to_string());
    assert_eq!(
        Features::new(&profile).zones(),
        vec!["us-east-2a".to_string(), "us-east-2b".to_string()]
    );
}
