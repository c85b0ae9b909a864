// Interactive editor: a thin adapter between the minifb window and the Session.
// Input becomes Session events; the canvas (plus overlays) is shown each frame.
//
// Keys:
//   S  toggle area selection        M  add defect at next click
//   A  add defect at random         E  end scratch stroke
//   ←/→ previous/next sprite        L  reload image    W  save    ESC quit
// With a finished selection, drag with the left button to draw a scratch.

use minifb::Key;

use crate::config::EditArgs;
use crate::draw::{Drawer, draw_crosshair, draw_rect_outline, draw_text_5x7};
use crate::error::Error;
use crate::session::{Event, SelectionState, Session};
use crate::types::{FrameBuffer, Point};

const TITLE: &str = "Defect Synthesis";
const EMPTY_SIZE: (usize, usize) = (640, 480);
const BACKDROP: u32 = 0x00_30_30_30;
const SELECTION_COLOR: u32 = 0x00_00_FF_66;
const CROSSHAIR_COLOR: u32 = 0x00_FF_CC_33;
const HUD_COLOR: u32 = 0x00_FF_FF_FF;

pub fn run(args: &EditArgs, mut session: Session) -> Result<(), Error> {
    /* --- Initial canvas + sprite ---
       Visual: the window opens on the image, or a dark backdrop when none was given. */
    let mut status = String::from("READY");
    if let Some(path) = &args.image {
        if let Err(e) = session.load_canvas(path) {
            log::warn!("{e}");
            status = format!("LOAD FAILED: {e}");
        }
    }
    if !session.library().is_empty() {
        if let Err(e) = session.cycle_sprite(true) {
            log::warn!("{e}");
        }
    }

    let (mut w, mut h) = frame_size(&session);
    let mut drawer = Drawer::new(TITLE, w, h)?;

    let mut was_down = false;
    let mut last_pos: Option<Point> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Keyboard → session events / file actions */
        let mut events = Vec::new();
        if drawer.pressed_once(Key::S) {
            let on = !matches!(session.selection(), SelectionState::Selecting { .. });
            events.push(Event::SelectionToggled(on));
        }
        if drawer.pressed_once(Key::M) { events.push(Event::ManualAddRequested); }
        if drawer.pressed_once(Key::A) { events.push(Event::AutoAddRequested); }
        if drawer.pressed_once(Key::E) { events.push(Event::StrokeEndRequested); }

        let (next, prev) = (drawer.pressed_once(Key::Right), drawer.pressed_once(Key::Left));
        if next || prev {
            if let Err(e) = session.cycle_sprite(next) {
                status = report(&e);
            }
        }
        if drawer.pressed_once(Key::L) {
            if let Some(path) = &args.image {
                status = match session.load_canvas(path) {
                    Ok(()) => "RELOADED".into(),
                    Err(e) => report(&e),
                };
            }
        }
        if drawer.pressed_once(Key::W) {
            status = match session.save_canvas(&args.output) {
                Ok(()) => format!("SAVED {}", args.output.display()),
                Err(e) => report(&e),
            };
        }

        /* 2) Mouse button edges → pointer events */
        let down = drawer.left_mouse_down();
        let pos = drawer.mouse_pos().map(|(x, y)| Point::new(x as i32, y as i32));
        if let Some(p) = pos {
            if down && !was_down {
                events.push(Event::PointerDown(p));
            } else if down && last_pos != Some(p) {
                events.push(Event::PointerMove(p));
            } else if !down && was_down {
                events.push(Event::PointerUp(p));
            }
        }
        was_down = down;
        last_pos = pos;

        /* 3) Run each event to completion, in order */
        for event in events {
            if let Err(e) = session.handle(event) {
                status = report(&e);
            }
        }

        /* Canvas size changed (reload): reopen the window at the new size. */
        if frame_size(&session) != (w, h) {
            (w, h) = frame_size(&session);
            log::info!("canvas is now {w}x{h}; reopening window");
            drawer = Drawer::new(TITLE, w, h)?;
            was_down = false;
            continue;
        }

        /* 4) Compose the frame: canvas, selection outline, crosshair, HUD */
        let mut screen = match session.canvas() {
            Some(canvas) => canvas.to_frame_buffer(),
            None => FrameBuffer { width: w, height: h, pixels: vec![BACKDROP; w * h] },
        };
        if let Some(region) = session.selection().preview() {
            draw_rect_outline(&mut screen, region, SELECTION_COLOR);
        }
        if let Some(p) = pos {
            draw_crosshair(&mut screen, p.x, p.y, 10, CROSSHAIR_COLOR);
        }
        draw_text_5x7(&mut screen, 8, 8, &hud_line(&session), HUD_COLOR);
        draw_text_5x7(&mut screen, 8, 18, &status, HUD_COLOR);

        /* 5) Present */
        drawer.present(&screen)?;
    }

    Ok(())
}

/// Window size for the current canvas, or the empty backdrop size.
fn frame_size(session: &Session) -> (usize, usize) {
    session
        .canvas()
        .map(|c| (c.width() as usize, c.height() as usize))
        .unwrap_or(EMPTY_SIZE)
}

fn report(e: &Error) -> String {
    log::warn!("{e}");
    e.to_string()
}

fn hud_line(session: &Session) -> String {
    let sprite = match session.sprite_index() {
        Some(i) => format!("{} {}/{}", session.library().names()[i], i + 1, session.library().len()),
        None => "NO SPRITE".into(),
    };
    let mode = if session.is_stroking() {
        "SCRATCH"
    } else if session.is_manual_armed() {
        "CLICK TO PLACE"
    } else if matches!(session.selection(), SelectionState::Selecting { .. }) {
        "SELECTING"
    } else if session.selection().region().is_some() {
        "AREA SET"
    } else {
        "IDLE"
    };
    format!("{sprite} | {mode}")
}
