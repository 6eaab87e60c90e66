pub use self::listings_response::{ListingsResponse, ListingsStatus};

mod listings_response;
