//! Deep-link check.
//!
//! Fetches a page repeatedly until the element named by the URL fragment is
//! present in the returned HTML, or the deadline passes.
//!
//! # Usage
//!
//! ```bash
//! pageturn-cli deeplink "https://read.example/#latest-novels"
//! pageturn-cli deeplink "http://localhost:3000/announcements#announcement-7" --timeout-ms 5000
//! ```

use std::time::Duration;

use url::Url;

use pageturn_core::retry::{PollOutcome, PollPolicy, cancellation, poll_until};

use super::CommandError;

/// Options of the `deeplink` command.
#[derive(Debug, Clone, Copy)]
pub struct DeeplinkOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for DeeplinkOptions {
    fn default() -> Self {
        Self {
            interval: PollPolicy::ANCHOR_SCROLL.interval,
            timeout: PollPolicy::ANCHOR_SCROLL.deadline,
        }
    }
}

/// Split `<url>#<id>` into the page to fetch and the element id.
///
/// # Errors
///
/// Returns an error if the URL does not parse or has no fragment.
pub fn parse_target(raw: &str) -> Result<(Url, String), CommandError> {
    let mut page = Url::parse(raw)?;
    let id = page
        .fragment()
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| CommandError::MissingFragment(raw.to_string()))?;
    page.set_fragment(None);
    Ok((page, id))
}

/// Whether `html` contains an element with `id`.
#[must_use]
pub fn has_element_id(html: &str, id: &str) -> bool {
    html.contains(&format!("id=\"{id}\"")) || html.contains(&format!("id='{id}'"))
}

/// Poll the page until the target element appears.
///
/// # Errors
///
/// Returns `CommandError::TargetNotFound` when the deadline passes,
/// `CommandError::Cancelled` on Ctrl+C, or another error if the request
/// cannot be set up.
pub async fn check(raw: &str, options: DeeplinkOptions) -> Result<u32, CommandError> {
    let (page, id) = parse_target(raw)?;
    let client = reqwest::Client::builder().timeout(options.timeout).build()?;

    let (handle, cancel) = cancellation();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    tracing::info!(page = %page, id = %id, "Waiting for deep-link target");

    let policy = PollPolicy {
        interval: options.interval,
        deadline: options.timeout,
        probe_immediately: true,
    };
    let outcome = poll_until(|| probe(&client, &page, &id), policy, &cancel).await;
    interrupt.abort();

    match outcome {
        PollOutcome::Ready { attempts, .. } => {
            tracing::info!(attempts, "Deep-link target found");
            Ok(attempts)
        }
        PollOutcome::TimedOut { attempts } => Err(CommandError::TargetNotFound { id, attempts }),
        PollOutcome::Cancelled { .. } => Err(CommandError::Cancelled),
    }
}

async fn probe(client: &reqwest::Client, page: &Url, id: &str) -> Option<()> {
    let response = match client.get(page.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Fetch failed: {e}");
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "Page not ready");
        return None;
    }

    let html = response.text().await.ok()?;
    has_element_id(&html, id).then_some(())
}
