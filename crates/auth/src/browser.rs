//! System browser launcher.

use tracing::warn;

/// Open `url` in the OS default browser.
///
/// Returns whether the launch was handed off; on failure the caller is
/// expected to have already printed the URL so the user can open it by hand.
pub fn open_in_browser(url: &str) -> bool {
    match open::that(url) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not open a browser automatically: {e}");
            false
        },
    }
}
