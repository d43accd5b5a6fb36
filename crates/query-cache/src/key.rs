//! Cache keys.

use std::fmt;

/// Address of one cached query: a resource name plus the canonicalized
/// parameters the fetch was made with.
///
/// Parameters are sorted by name on construction, so two keys built from the
/// same logical query compare equal regardless of argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: &'static str,
    params: Vec<(String, String)>,
}

impl QueryKey {
    /// Key for a parameterless (singleton) query.
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    /// Key for a parameterized query.
    pub fn with_params<K, V>(resource: &'static str, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        params.sort();
        Self { resource, params }
    }

    /// The resource this key belongs to.
    pub fn resource(&self) -> &'static str {
        self.resource
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (index, (name, value)) in self.params.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", separator, name, value)?;
        }
        Ok(())
    }
}
