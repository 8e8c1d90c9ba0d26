pub mod dialog;
pub mod instructions;
pub mod keybar;
pub mod layout;
pub mod markdown;
pub mod question;
pub mod screens;
pub mod sidebar;
pub mod statusbar;
pub mod titlebar;

use ratatui::Frame;

use crate::session::{App, Screen};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    match app.screen {
        Screen::Loading => {
            screens::draw_loading(f, area, app);
        }
        Screen::LoadFailed => {
            screens::draw_load_failed(f, area, app);
        }
        Screen::Instructions => {
            instructions::draw_instructions(f, area, app);
        }
        Screen::Working => {
            draw_working(f, area, app);
        }
        Screen::Submitting => {
            screens::draw_submitting(f, area, app);
        }
        Screen::Submitted => {
            screens::draw_submitted(f, area, app);
        }
        Screen::AlreadySubmitted => {
            screens::draw_already_submitted(f, area, app);
        }
    }

    // Dialog overlay on top of whichever screen is active
    if app.has_dialog() {
        dialog::draw_dialog(f, area, app);
    }
}

fn draw_working(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, app);
    sidebar::draw_sidebar(f, layout.sidebar, app);
    question::draw_question(f, layout.main, app);
    statusbar::draw_statusbar(f, layout.statusbar, app);
    keybar::draw_keybar(f, layout.keybar, app);
}
