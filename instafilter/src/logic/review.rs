use filter_session::ReviewPrompt;
use log::{info, warn};
use std::io::{Stdout, Write};

/// Asks for feedback on the console and opens the review page when one is
/// configured.
#[derive(Debug)]
pub struct ConsoleReviewPrompt<W = Stdout> {
    url: String,
    out: W,
}

impl ConsoleReviewPrompt {
    pub fn new(url: &str) -> Self {
        Self::with_output(url, std::io::stdout())
    }
}

impl<W: Write> ConsoleReviewPrompt<W> {
    pub fn with_output(url: &str, out: W) -> Self {
        Self {
            url: url.trim().to_string(),
            out,
        }
    }

    fn print(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "Enjoying Instafilter? Tell us what you think!")?;
        if !self.url.is_empty() {
            writeln!(self.out, "  {}", self.url)?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> ReviewPrompt for ConsoleReviewPrompt<W> {
    fn request(&mut self) {
        info!("request review");

        if let Err(e) = self.print() {
            warn!("print review request failed: {e}");
        }

        if self.url.is_empty() {
            return;
        }

        if let Err(e) = webbrowser::open(&self.url) {
            warn!("open {} failed: {e}", self.url);
        }
    }
}
