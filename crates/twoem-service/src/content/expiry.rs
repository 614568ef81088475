//! Visibility windows of content items.

use chrono::{DateTime, Duration, Utc};

use twoem_core::config::content::ContentConfig;
use twoem_entity::account::Role;
use twoem_entity::content::{Audience, ContentItem, ContentKind};

/// Who is looking at content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// No bearer token.
    Anonymous,
    /// An authenticated account.
    Authenticated(Role),
}

impl Viewer {
    /// Whether this viewer may see items addressed to `audience`.
    pub fn can_see(&self, audience: Audience) -> bool {
        match audience {
            Audience::Public => true,
            Audience::Students => matches!(self, Self::Authenticated(_)),
        }
    }
}

/// Decides lifetimes and visibility of content items.
#[derive(Debug, Clone, Copy)]
pub struct ContentExpiryManager {
    eulogy_ttl: Duration,
    download_ttl: Duration,
}

impl ContentExpiryManager {
    /// Creates the manager with lifetimes from `content.*_ttl_days`.
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            eulogy_ttl: Duration::days(config.eulogy_ttl_days),
            download_ttl: Duration::days(config.download_ttl_days),
        }
    }

    /// Visibility window for a newly uploaded item of `kind`.
    pub fn ttl_for(&self, kind: ContentKind) -> Duration {
        match kind {
            ContentKind::Eulogy => self.eulogy_ttl,
            ContentKind::Download => self.download_ttl,
        }
    }

    /// Active and not yet expired.
    pub fn is_visible(&self, item: &ContentItem, now: DateTime<Utc>) -> bool {
        item.is_active && now < item.expires_at
    }

    /// Whole days left in the window, never negative.
    pub fn days_remaining(&self, item: &ContentItem, now: DateTime<Utc>) -> i64 {
        (item.expires_at - now).num_days().max(0)
    }

    /// Visible and addressed to `viewer`.
    pub fn is_visible_to(&self, item: &ContentItem, viewer: Viewer, now: DateTime<Utc>) -> bool {
        viewer.can_see(item.audience) && self.is_visible(item, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twoem_entity::content::CreateContentItem;
    use uuid::Uuid;

    fn manager() -> ContentExpiryManager {
        ContentExpiryManager::new(&ContentConfig::default())
    }

    fn eulogy(now: DateTime<Utc>, audience: Audience) -> ContentItem {
        let m = manager();
        CreateContentItem {
            kind: ContentKind::Eulogy,
            audience,
            title: "In memory of Mzee Kariuki".into(),
            description: None,
            filename: "eulogy.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: 1024,
            uploaded_by: Uuid::new_v4(),
        }
        .into_item(now, m.ttl_for(ContentKind::Eulogy))
    }

    #[test]
    fn test_default_windows() {
        let m = manager();
        assert_eq!(m.ttl_for(ContentKind::Eulogy), Duration::days(7));
        assert_eq!(m.ttl_for(ContentKind::Download), Duration::days(365));
    }

    #[test]
    fn test_visible_until_expiry() {
        let m = manager();
        let t0 = Utc::now();
        let item = eulogy(t0, Audience::Public);

        assert!(m.is_visible(&item, t0 + Duration::seconds(1)));
        assert_eq!(m.days_remaining(&item, t0 + Duration::seconds(1)), 6);
        assert!(!m.is_visible(&item, t0 + Duration::days(7)));
        assert!(!m.is_visible(&item, t0 + Duration::days(8)));
        assert_eq!(m.days_remaining(&item, t0 + Duration::days(8)), 0);
    }

    #[test]
    fn test_inactive_items_are_hidden() {
        let m = manager();
        let t0 = Utc::now();
        let mut item = eulogy(t0, Audience::Public);
        item.is_active = false;
        assert!(!m.is_visible(&item, t0 + Duration::seconds(1)));
    }

    #[test]
    fn test_audience() {
        let m = manager();
        let t0 = Utc::now();
        let item = eulogy(t0, Audience::Students);
        let later = t0 + Duration::seconds(1);
        assert!(!m.is_visible_to(&item, Viewer::Anonymous, later));
        assert!(m.is_visible_to(&item, Viewer::Authenticated(Role::Student), later));
        assert!(Viewer::Anonymous.can_see(Audience::Public));
    }
}
