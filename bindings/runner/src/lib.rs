mod common;

mod context;
mod product;
mod runner_context;

pub mod prelude {
    /// Common operations for browser scenarios.
    ///
    /// This is a good place to start if you are getting started writing scenarios.
    pub use crate::common::*;

    pub use crate::context::BrowserAgentContext;
    pub use crate::product::{
        campfire_expectations, extract_product, parse_price, validate_product,
        ProductExpectations, ProductRecord, RelatedProduct, Review,
    };
    pub use crate::runner_context::BrowserRunnerContext;

    /// Re-export of the `page_tunnel_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your scenarios.
    pub use page_tunnel_runner::prelude::*;

    /// Re-export of the instrumented client for convenience.
    pub use cdp_client_instrumented::prelude::*;
}
