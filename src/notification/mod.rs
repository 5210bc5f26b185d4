mod email;

pub use email::{build_message, email_body, Email};
