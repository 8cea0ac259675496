//! Platform and build-mode target naming.
//!
//! Pure composition of a canonical platform name with an optional build-mode
//! suffix and a constraint set. The pipeline never interprets the result; the
//! CLI forwards it to the engine verbatim with each build request.

/// A concrete platform selection for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformSpec {
    platform: Option<String>,
    build_mode: Option<String>,
    constraints: Vec<String>,
}

impl PlatformSpec {
    pub fn new(platform: Option<String>, build_mode: Option<String>) -> Self {
        Self {
            platform,
            build_mode,
            constraints: Vec::new(),
        }
    }

    /// Attach constraint names. Duplicates collapse and the set is sorted so
    /// the same inputs always produce the same request.
    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Vec<String> = constraints.into_iter().map(Into::into).collect();
        set.sort();
        set.dedup();
        self.constraints = set;
        self
    }

    /// Engine-facing platform name, e.g. `linux-x86_64` or
    /// `linux-x86_64-opt`. `None` when no platform was requested; a build
    /// mode without a platform has nothing to suffix and is ignored.
    pub fn resolved(&self) -> Option<String> {
        match (&self.platform, &self.build_mode) {
            (None, _) => None,
            (Some(platform), None) => Some(platform.clone()),
            (Some(platform), Some(mode)) => Some(format!("{platform}-{mode}")),
        }
    }

    /// Normalized constraint names, sorted and deduplicated.
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_name_composition() {
        assert_eq!(PlatformSpec::new(None, None).resolved(), None);
        assert_eq!(
            PlatformSpec::new(None, Some("opt".into())).resolved(),
            None
        );
        assert_eq!(
            PlatformSpec::new(Some("linux-x86_64".into()), None).resolved(),
            Some("linux-x86_64".to_string())
        );
        assert_eq!(
            PlatformSpec::new(Some("linux-x86_64".into()), Some("opt".into())).resolved(),
            Some("linux-x86_64-opt".to_string())
        );
    }

    #[test]
    fn test_constraints_sorted_and_deduplicated() {
        let spec = PlatformSpec::new(Some("linux-x86_64".into()), None)
            .with_constraints(["sanitizer", "asan", "sanitizer"]);

        assert_eq!(spec.constraints(), &["asan", "sanitizer"]);
    }

    #[test]
    fn test_same_inputs_same_name() {
        let a = PlatformSpec::new(Some("macos-arm64".into()), Some("dev".into()));
        let b = PlatformSpec::new(Some("macos-arm64".into()), Some("dev".into()));
        assert_eq!(a.resolved(), b.resolved());
    }
}
