//! Recipient GSTIN filter.

/// Optional GSTIN restriction applied when invoices are finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GstinFilter {
    target: Option<String>,
}

impl GstinFilter {
    /// Accept every invoice.
    pub fn any() -> Self {
        Self::default()
    }

    /// Build from user input. Surrounding whitespace is ignored and an empty
    /// value disables filtering.
    pub fn new(value: Option<&str>) -> Self {
        let target = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_uppercase);
        Self { target }
    }

    /// Case-insensitive exact match against a captured GSTIN.
    pub fn matches(&self, gstin: &str) -> bool {
        match &self.target {
            None => true,
            Some(target) => *target == gstin.to_uppercase(),
        }
    }
}
