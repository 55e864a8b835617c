use validator::ValidateEmail;

/// A configured mailbox address. Surrounding whitespace from configuration
/// values is dropped before validation.
#[derive(Debug, Clone)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<EmailAddress, String> {
        let trimmed = s.trim();
        if trimmed.validate_email() {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(format!("`{}` is not a usable mailbox address", s))
        }
    }

    /// Mailbox comparison ignores ASCII case, `Inbox@Example.com` and
    /// `inbox@example.com` reach the same inbox in practice.
    pub fn is_same_mailbox(&self, other: &EmailAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where inquiries come from and where they go. The two ends never share a
/// mailbox, otherwise the business inbox would be mailing itself.
#[derive(Debug, Clone)]
pub struct MailRoute {
    pub sender: EmailAddress,
    pub recipient: EmailAddress,
}

impl MailRoute {
    pub fn new(sender: EmailAddress, recipient: EmailAddress) -> Result<MailRoute, String> {
        if sender.is_same_mailbox(&recipient) {
            return Err(format!(
                "sender and recipient must be different mailboxes, both are {}",
                recipient
            ));
        }
        Ok(Self { sender, recipient })
    }
}
