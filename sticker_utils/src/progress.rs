//! Progress bars for batch stages

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

/// Bar for one pipeline stage; hidden when stderr is not a terminal so
/// redirected logs stay clean.
pub fn stage_bar(len: u64, label: &str) -> ProgressBar {
    if !Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{prefix:>8} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_prefix(label.to_string());
    bar
}
