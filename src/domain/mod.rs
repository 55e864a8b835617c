mod contact_email;
mod email_address;
mod inquiry;

pub use contact_email::{ContactEmail, escape_html};
pub use email_address::{EmailAddress, MailRoute};
pub use inquiry::{Inquiry, MissingFields, RequiredField};
