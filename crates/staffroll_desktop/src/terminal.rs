//! Terminal setup and the event loop.

use std::io;
use std::panic;
use std::sync::Once;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{info, warn};
use ratatui::prelude::*;
use staffroll_core::EmployeeRepository;

use crate::app::App;
use crate::ui::draw;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

static RESTORE_HOOK: Once = Once::new();

/// Takes over the terminal and runs `app` until it asks to quit.
///
/// The terminal is restored when the loop returns, fails or panics.
pub fn run<R: EmployeeRepository>(app: &mut App<R>) -> io::Result<()> {
    RESTORE_HOOK.call_once(|| {
        chain_panic_hook(|| {
            let _ = restore_terminal();
        })
    });

    let guard = TerminalGuard::enter()?;
    info!("event=desktop_start module=desktop status=ok");

    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .and_then(|mut terminal| event_loop(&mut terminal, app));

    drop(guard);
    info!("event=desktop_stop module=desktop status=ok");
    result
}

/// Runs `restore` ahead of the current panic hook, so the panic message
/// lands on the normal screen.
pub fn chain_panic_hook<F>(restore: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Raw mode plus alternate screen for as long as the guard lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = io::stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal() {
            warn!("event=desktop_restore module=desktop status=error error={err}");
        }
    }
}

fn event_loop<B: Backend, R: EmployeeRepository>(
    terminal: &mut Terminal<B>,
    app: &mut App<R>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}
