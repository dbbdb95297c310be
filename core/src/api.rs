//! Remote endpoint paths.
//!
//! Each `{}` in a template is filled, in order, by the path segments given
//! to the request builder.

/// A Nylas REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    OAuthAuthorize,
    OAuthToken,
    OAuthRevoke,
    Account,
    Application,
    Accounts,
    OneAccount,
    DowngradeAccount,
    UpgradeAccount,
    RevokeAllTokens,
    Events,
    OneEvent,
    SendRsvp,
    Messages,
    OneMessage,
    Calendars,
    OneCalendar,
    FreeBusy,
    Contacts,
    OneContact,
}

impl Endpoint {
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::OAuthAuthorize => "/oauth/authorize",
            Endpoint::OAuthToken => "/oauth/token",
            Endpoint::OAuthRevoke => "/oauth/revoke",
            Endpoint::Account => "/account",
            Endpoint::Application => "/a/{}",
            Endpoint::Accounts => "/a/{}/accounts",
            Endpoint::OneAccount => "/a/{}/accounts/{}",
            Endpoint::DowngradeAccount => "/a/{}/accounts/{}/downgrade",
            Endpoint::UpgradeAccount => "/a/{}/accounts/{}/upgrade",
            Endpoint::RevokeAllTokens => "/a/{}/accounts/{}/revoke-all",
            Endpoint::Events => "/events",
            Endpoint::OneEvent => "/events/{}",
            Endpoint::SendRsvp => "/send-rsvp",
            Endpoint::Messages => "/messages",
            Endpoint::OneMessage => "/messages/{}",
            Endpoint::Calendars => "/calendars",
            Endpoint::OneCalendar => "/calendars/{}",
            Endpoint::FreeBusy => "/calendars/free-busy",
            Endpoint::Contacts => "/contacts",
            Endpoint::OneContact => "/contacts/{}",
        }
    }

    /// Fill the template with percent-encoded segments.
    ///
    /// Returns `None` when the number of segments does not match the
    /// number of placeholders.
    pub fn render(&self, segments: &[String]) -> Option<String> {
        let mut parts = self.template().split("{}");
        let mut path = parts.next().unwrap_or_default().to_string();
        let mut supplied = segments.iter();
        for part in parts {
            let segment = supplied.next()?;
            path.push_str(&urlencoding::encode(segment));
            path.push_str(part);
        }
        if supplied.next().is_some() {
            return None;
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_placeholders() {
        assert_eq!(Endpoint::Events.render(&[]).as_deref(), Some("/events"));
    }

    #[test]
    fn render_fills_segments_in_order() {
        let path = Endpoint::RevokeAllTokens
            .render(&["app".to_string(), "acc".to_string()])
            .unwrap();
        assert_eq!(path, "/a/app/accounts/acc/revoke-all");
    }

    #[test]
    fn render_encodes_segments() {
        let path = Endpoint::OneEvent.render(&["a/b c".to_string()]).unwrap();
        assert_eq!(path, "/events/a%2Fb%20c");
    }

    #[test]
    fn render_rejects_segment_count_mismatch() {
        assert!(Endpoint::OneEvent.render(&[]).is_none());
        assert!(Endpoint::Events.render(&["extra".to_string()]).is_none());
    }
}
