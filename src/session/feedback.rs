use std::time::Duration;

use crate::config::{ERROR_BANNER_TTL, SUCCESS_BANNER_TTL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: BannerId,
    pub kind: BannerKind,
    pub message: String,
}

/// Loading overlay plus one error and one success banner.
///
/// The overlay is a counter of requests in flight, so overlapping calls
/// keep it up until the last one returns. Showing a banner replaces the
/// current one of the same kind and queues its expiry; the caller drains
/// the queue and schedules `dismiss` for each entry.
#[derive(Debug, Default)]
pub struct Feedback {
    in_flight: usize,
    error: Option<Banner>,
    success: Option<Banner>,
    next_id: u64,
    expiring: Vec<(BannerId, Duration)>,
}

impl Feedback {
    pub fn begin_loading(&mut self) {
        self.in_flight += 1;
    }

    pub fn end_loading(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn show_error(&mut self, message: impl Into<String>) -> BannerId {
        let banner = self.next_banner(BannerKind::Error, message.into());
        let id = banner.id;
        self.error = Some(banner);
        self.expiring.push((id, ERROR_BANNER_TTL));
        id
    }

    pub fn show_success(&mut self, message: impl Into<String>) -> BannerId {
        let banner = self.next_banner(BannerKind::Success, message.into());
        let id = banner.id;
        self.success = Some(banner);
        self.expiring.push((id, SUCCESS_BANNER_TTL));
        id
    }

    /// Removes the banner only if it is still the one `id` refers to.
    pub fn dismiss(&mut self, id: BannerId) -> bool {
        if self.error.as_ref().is_some_and(|b| b.id == id) {
            self.error = None;
            true
        } else if self.success.as_ref().is_some_and(|b| b.id == id) {
            self.success = None;
            true
        } else {
            false
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn error(&self) -> Option<&Banner> {
        self.error.as_ref()
    }

    pub fn success(&self) -> Option<&Banner> {
        self.success.as_ref()
    }

    pub fn drain_expiring(&mut self) -> Vec<(BannerId, Duration)> {
        std::mem::take(&mut self.expiring)
    }

    fn next_banner(&mut self, kind: BannerKind, message: String) -> Banner {
        self.next_id += 1;
        Banner {
            id: BannerId(self.next_id),
            kind,
            message,
        }
    }
}
