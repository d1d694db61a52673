//! Release note cleanup
//!
//! Turns GitHub-flavored markdown release notes into plain text that
//! AltStore-compatible clients display verbatim.

use regex::Regex;
use std::sync::LazyLock;

// Patterns are literals; failure to compile is a programming error
#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("valid HTML tag pattern"));
#[allow(clippy::expect_used)]
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#{1,6}\s?").expect("valid heading pattern"));
#[allow(clippy::expect_used)]
static LINE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\r\n])-").expect("valid bullet pattern"));

/// Normalize release notes into display-safe plain text
///
/// Rules run in this order, each on the output of the previous one:
///
/// 1. HTML tags are removed
/// 2. Runs of one to six `#` (plus one following whitespace character) are removed
/// 3. `**` emphasis markers are removed
/// 4. A `-` directly after a line break becomes `•`
/// 5. Backticks become `"`
/// 6. `\r\n\r\n` becomes `\r \n`, which clients render as a paragraph break
///    instead of collapsing it
///
/// # Examples
///
/// ```
/// use altstore_sync::normalize::normalize;
///
/// assert_eq!(normalize("## Fixes\n- **crash** on `start`"), "Fixes\n• crash on \"start\"");
/// ```
pub fn normalize(raw: &str) -> String {
    let text = HTML_TAG.replace_all(raw, "");
    let text = HEADING_MARKER.replace_all(&text, "");
    let text = text.replace("**", "");
    let text = LINE_BULLET.replace_all(&text, "${1}•");
    let text = text.replace('`', "\"");
    text.replace("\r\n\r\n", "\r \n")
}
