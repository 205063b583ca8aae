use crate::app::App;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.editing {
        Cow::Borrowed("Type keywords, comma-separated | ENTER fetch | ESC cancel | Ctrl+u clear")
    } else {
        Cow::Owned(format!(
            "[/]keywords [f]etch [m]atch:{} [v]iew:{} [n/p]page [o]pen [?]help [q]uit",
            app.match_mode,
            app.render_options.display
        ))
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
