/// Shared naming behaviour for the people in the sales schema
/// (customers and employees both carry first/middle/last name columns).
pub trait PersonName {
    fn first_name(&self) -> &str;
    fn middle_initial(&self) -> Option<&str>;
    fn last_name(&self) -> &str;

    /// Returns `"First M. Last"`, or `"First Last"` when there is no middle initial.
    fn full_name(&self) -> String {
        match self.middle_initial().map(str::trim) {
            Some(initial) if !initial.is_empty() => {
                format!("{} {}. {}", self.first_name(), initial, self.last_name())
            }
            _ => format!("{} {}", self.first_name(), self.last_name()),
        }
    }
}
