use std::collections::HashSet;

/// Host-supplied answer to "is this external component loaded and active?".
pub trait DependencyProbe {
    fn is_present(&self, dependency: &str) -> bool;
}

impl DependencyProbe for HashSet<String> {
    fn is_present(&self, dependency: &str) -> bool {
        self.contains(dependency)
    }
}

impl DependencyProbe for [&str] {
    fn is_present(&self, dependency: &str) -> bool {
        self.iter().any(|d| *d == dependency)
    }
}

impl<F> DependencyProbe for F
where
    F: Fn(&str) -> bool,
{
    fn is_present(&self, dependency: &str) -> bool {
        self(dependency)
    }
}
