mod browser;
mod error;
mod intercept;
mod session;
mod wait;

pub mod prelude {
    pub use crate::browser::{BrowserHandle, Endpoint};
    pub use crate::error::{ClientError, ClientResult};
    pub use crate::intercept::{InterceptedRequest, RequestDecision, RequestInterceptor};
    pub use crate::session::{NavigationWait, Session};
    pub use crate::wait::{wait_for, POLL_INTERVAL};
}
