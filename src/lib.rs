pub mod app;
pub mod contract;
pub mod dom;
pub mod error;
pub mod locale;
pub mod model;
pub mod request;
pub mod sso;
pub mod table;
pub mod validate;

pub use app::{AddDropClient, ResultsClient, Stage2Client};
pub use error::{Error, ErrorKind, Result};
pub use locale::Locale;
#[cfg(feature = "reqwest-client")]
pub use request::ReqwestClient;
