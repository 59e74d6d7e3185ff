//! Status line rendering for terminals and host pipes.
//!
//! One line per publish: `⌛ 1h35m  (95 minute(s) left)`. Urgent and warning
//! tiers get a red or yellow background when stdout is a terminal. Nothing is
//! printed before the first publish, which is what "hidden" means here.

use std::io::{self, IsTerminal, Write};

use timer_core::{DisplayTier, Presentation, StatusPresenter, STATUS_ICON, STATUS_ITEM_NAME};

const RESET: &str = "\x1b[0m";

pub struct TerminalPresenter<W: Write + Send> {
    out: W,
    color: bool,
    visible: bool,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            visible: false,
        }
    }
}

impl<W: Write + Send> StatusPresenter for TerminalPresenter<W> {
    fn publish(&mut self, presentation: &Presentation) {
        let line = render_line(presentation, self.color);
        if let Err(err) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::debug!(error = %err, "Failed to write status line");
            return;
        }
        if !self.visible {
            tracing::info!(item = STATUS_ITEM_NAME, "Status item shown");
            self.visible = true;
        }
    }

    fn release(&mut self) {
        let _ = self.out.flush();
        self.visible = false;
    }
}

/// Terminal glyph for a host icon name. Unknown names render without an icon.
fn icon_glyph(name: &str) -> Option<&'static str> {
    match name {
        "hourglass" => Some("⌛"),
        _ => None,
    }
}

pub fn render_line(presentation: &Presentation, color: bool) -> String {
    let label = match icon_glyph(STATUS_ICON) {
        Some(glyph) => format!("{} {}", glyph, presentation.text),
        None => presentation.text.clone(),
    };
    let label = match ansi_background(presentation.tier) {
        Some(code) if color => format!("\x1b[{}m{}{}", code, label, RESET),
        _ => label,
    };
    format!("{}  ({})", label, presentation.tooltip)
}

fn ansi_background(tier: DisplayTier) -> Option<u8> {
    // Mirrors the host theme keys from DisplayTier::background_color.
    match tier.background_color() {
        Some("statusBarItem.errorBackground") => Some(41),
        Some("statusBarItem.warningBackground") => Some(43),
        _ => None,
    }
}
