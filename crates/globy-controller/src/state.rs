use globy_core::types::ImageItem;

/// The view a renderer observes. Derived state only; the controller is the
/// sole writer.
///
/// `loading` is true exactly between issuing a lookup and that lookup
/// settling (success, failure, or supersession by a newer lookup).
/// `error` and `results` are refreshed together: a failure clears the prior
/// results rather than showing them beside an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<ImageItem>,
    pub loading: bool,
    pub error: Option<String>,
}
