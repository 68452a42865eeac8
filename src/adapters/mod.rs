// Adapters layer: concrete implementations of the domain ports (HTTP backends, database).

pub mod gemini;
pub mod razorpay;
pub mod store;
pub mod youtube;

pub use gemini::GeminiClient;
pub use razorpay::RazorpayClient;
pub use store::SqliteCourseStore;
pub use youtube::YouTubeClient;

use crate::utils::error::LmsError;

/// Google APIs accept the key in this header, which keeps it out of URLs.
pub(crate) const GOOGLE_API_KEY_HEADER: &str = "x-goog-api-key";

/// reqwest errors carry the request URL in their Display; drop it before
/// the error reaches any log line.
pub(crate) fn transport_error(err: reqwest::Error) -> LmsError {
    LmsError::ApiError(err.without_url())
}
