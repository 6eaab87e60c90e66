pub use self::http::{ListingsSource, HTTP};

mod http;
