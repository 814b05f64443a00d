//! Applet registry.
//!
//! The launcher only asks one question of the registry: is this name an
//! applet, and if so which one. [`AppletTable`] answers it from a sorted name
//! list; anything else implementing [`AppletLookup`] can stand in.

/// Name to applet index lookup. Must not have side effects.
pub trait AppletLookup {
    fn find_applet_by_name(&self, name: &str) -> Option<usize>;
}

/// Sorted, deduplicated applet names searched with a binary search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppletTable {
    names: Vec<String>,
}

impl AppletTable {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AppletLookup for AppletTable {
    fn find_applet_by_name(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .ok()
    }
}

impl<T: AppletLookup + ?Sized> AppletLookup for &T {
    fn find_applet_by_name(&self, name: &str) -> Option<usize> {
        (**self).find_applet_by_name(name)
    }
}
