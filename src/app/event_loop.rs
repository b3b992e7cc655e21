use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::effects::load_library_message;
use crate::app::{App, Message, Model, update};
use crate::watcher::ManifestWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or terminal I/O fails.
    /// Library and manifest failures are shown in the UI instead.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::logging::scope("app.run.total");

        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker = if self.images_enabled {
            let _picker_scope = crate::logging::scope("app.create_picker");
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; folio requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = self.initial_model((size.width, size.height)).with_picker(picker);
        let mut watcher = None;
        let mut pending = vec![load_library_message(&model)];
        if let Some(book_id) = self.initial_book.clone() {
            pending.push(Message::OpenBook(book_id));
        }
        for msg in pending {
            self.apply(&mut model, &mut watcher, msg);
        }

        let result = self.event_loop(&mut terminal, &mut model, &mut watcher);

        // Restore terminal
        let _ = set_mouse_motion_tracking(false);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// Apply `msg` and any follow-up messages its side effects produce.
    pub(super) fn apply(
        &self,
        model: &mut Model,
        watcher: &mut Option<ManifestWatcher>,
        msg: Message,
    ) {
        let mut next = Some(msg);
        while let Some(msg) = next {
            tracing::trace!(target: "folio::render", ?msg, "message");
            *model = update(std::mem::take(model), msg.clone());
            next = self.handle_message_side_effects(model, watcher, &msg);
        }
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        watcher: &mut Option<ManifestWatcher>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture)?;
        set_mouse_motion_tracking(true)?;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                self.apply(model, watcher, Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled && watcher.as_mut().is_some_and(ManifestWatcher::poll_changed) {
                self.apply(model, watcher, Message::ManifestChanged);
                needs_render = true;
            }

            let poll_ms = if resize_debouncer.is_pending() {
                10
            } else if needs_render {
                0
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let mut drained = 0_u32;
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        self.handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        drained += 1;
                        self.apply(model, watcher, msg);
                        needs_render = true;
                    }
                    // Coalesce key repeat and pointer bursts into a single render.
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
                if drained > 1 {
                    tracing::trace!(target: "folio::render", frame = frame_idx, drained, "event.drain");
                }
            }

            if needs_render && !resize_debouncer.is_pending() {
                frame_idx += 1;
                let draw_start = Instant::now();
                model.prepare_frame();
                terminal.draw(|frame| self.view(model, frame))?;
                tracing::trace!(
                    target: "folio::render",
                    frame = frame_idx,
                    draw_ms = draw_start.elapsed().as_secs_f64() * 1000.0,
                    "frame.draw"
                );
                model.prefetch_neighbors();
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

fn set_mouse_motion_tracking(enable: bool) -> std::io::Result<()> {
    // Any-event mouse motion reporting (1003) with SGR encoding (1006), so
    // the lens can follow the pointer without a button held.
    let mut out = stdout();
    if enable {
        out.write_all(b"\x1b[?1003h\x1b[?1006h")?;
    } else {
        out.write_all(b"\x1b[?1003l\x1b[?1006l")?;
    }
    out.flush()
}
