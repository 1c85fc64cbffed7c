use egui::{pos2, vec2, Align2, Color32, FontId, Key, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};

pub const WHITE_KEY_WIDTH: f32 = 80.0;
pub const WHITE_KEY_HEIGHT: f32 = 280.0;
pub const BLACK_KEY_WIDTH: f32 = 40.0;
pub const BLACK_KEY_HEIGHT: f32 = 180.0;

const OCTAVE_WIDTH: f32 = WHITE_KEY_WIDTH * 7.0;

// Semitone offsets within an octave
const WHITE_OFFSETS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const BLACK_OFFSETS: [u8; 5] = [1, 3, 6, 8, 10];
// Index of the white key each black key sits after
const BLACK_POSITIONS: [usize; 5] = [0, 1, 3, 4, 5];

const WHITE_LABELS: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];
const BLACK_LABELS: [&str; 5] = [
    "C#\nD\u{266d}",
    "D#\nE\u{266d}",
    "F#\nG\u{266d}",
    "G#\nA\u{266d}",
    "A#\nB\u{266d}",
];

/// Computer keys and the semitone above the base note they play
const COMPUTER_KEYS: [(Key, u8); 16] = [
    (Key::A, 0),
    (Key::W, 1),
    (Key::S, 2),
    (Key::E, 3),
    (Key::D, 4),
    (Key::F, 5),
    (Key::T, 6),
    (Key::G, 7),
    (Key::Y, 8),
    (Key::H, 9),
    (Key::U, 10),
    (Key::J, 11),
    (Key::K, 12),
    (Key::O, 13),
    (Key::L, 14),
    (Key::P, 15),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PianoKey {
    pub note: u8,
    pub label: &'static str,
    pub is_black: bool,
    /// Position relative to the keyboard's top-left corner
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(u8),
    Released(u8),
}

/// Lay out `octaves` octaves starting at `base_note`, white keys first so black keys paint on top.
/// Keys above MIDI 127 are left out.
pub fn layout_keys(base_note: u8, octaves: u8) -> Vec<PianoKey> {
    let mut whites = Vec::new();
    let mut blacks = Vec::new();

    for octave in 0..octaves as usize {
        let octave_x = octave as f32 * OCTAVE_WIDTH;
        let octave_note = base_note as usize + octave * 12;

        for (j, (&offset, &label)) in WHITE_OFFSETS.iter().zip(WHITE_LABELS.iter()).enumerate() {
            let Ok(note) = u8::try_from(octave_note + offset as usize) else { continue };
            if note > 127 {
                continue;
            }
            let min = pos2(octave_x + j as f32 * WHITE_KEY_WIDTH, 0.0);
            whites.push(PianoKey {
                note,
                label,
                is_black: false,
                rect: Rect::from_min_size(min, vec2(WHITE_KEY_WIDTH, WHITE_KEY_HEIGHT)),
            });
        }

        for ((&offset, &position), &label) in BLACK_OFFSETS
            .iter()
            .zip(BLACK_POSITIONS.iter())
            .zip(BLACK_LABELS.iter())
        {
            let Ok(note) = u8::try_from(octave_note + offset as usize) else { continue };
            if note > 127 {
                continue;
            }
            let x = octave_x + position as f32 * WHITE_KEY_WIDTH + WHITE_KEY_WIDTH
                - BLACK_KEY_WIDTH / 2.0;
            blacks.push(PianoKey {
                note,
                label,
                is_black: true,
                rect: Rect::from_min_size(pos2(x, 0.0), vec2(BLACK_KEY_WIDTH, BLACK_KEY_HEIGHT)),
            });
        }
    }

    whites.extend(blacks);
    whites
}

/// Note under `pos`; black keys win over the white keys beneath them.
pub fn key_at(keys: &[PianoKey], pos: Pos2) -> Option<u8> {
    keys.iter()
        .filter(|key| key.rect.contains(pos))
        .max_by_key(|key| key.is_black)
        .map(|key| key.note)
}

/// On-screen piano keyboard. Monophonic: at most one key is held at a time.
pub struct Keyboard {
    base_note: u8,
    keys: Vec<PianoKey>,
    held: Option<u8>,
}

impl Keyboard {
    pub fn new(base_note: u8, octaves: u8) -> Self {
        Self {
            base_note,
            keys: layout_keys(base_note, octaves),
            held: None,
        }
    }

    pub fn keys(&self) -> &[PianoKey] {
        &self.keys
    }

    pub fn held(&self) -> Option<u8> {
        self.held
    }

    pub fn size(&self) -> Vec2 {
        let width = self
            .keys
            .iter()
            .map(|key| key.rect.max.x)
            .fold(0.0f32, f32::max);
        vec2(width, WHITE_KEY_HEIGHT)
    }

    /// Note played by a computer key, if it maps onto the keyboard.
    pub fn computer_key_note(&self, key: Key) -> Option<u8> {
        COMPUTER_KEYS
            .iter()
            .find(|(mapped, _)| *mapped == key)
            .and_then(|(_, offset)| self.base_note.checked_add(*offset))
            .filter(|note| self.keys.iter().any(|k| k.note == *note))
    }

    /// Move to `desired` and report what the engine has to do about it.
    pub fn transition(&mut self, desired: Option<u8>) -> Option<KeyEvent> {
        if desired == self.held {
            return None;
        }
        let previous = std::mem::replace(&mut self.held, desired);
        match (previous, desired) {
            (_, Some(note)) => Some(KeyEvent::Pressed(note)),
            (Some(note), None) => Some(KeyEvent::Released(note)),
            (None, None) => None,
        }
    }

    /// Draw the keyboard and return the key change caused by this frame's input.
    pub fn show(&mut self, ui: &mut Ui) -> Option<KeyEvent> {
        let (rect, response) = ui.allocate_exact_size(self.size(), Sense::click_and_drag());

        let pointer_note = if response.is_pointer_button_down_on() {
            response
                .interact_pointer_pos()
                .and_then(|pos| key_at(&self.keys, (pos - rect.min).to_pos2()))
        } else {
            None
        };
        let typed_note = ui.input(|input| {
            COMPUTER_KEYS
                .iter()
                .filter(|(key, _)| input.key_down(*key))
                .find_map(|(key, _)| self.computer_key_note(*key))
        });
        let event = self.transition(pointer_note.or(typed_note));

        let painter = ui.painter_at(rect);
        for key in &self.keys {
            let key_rect = key.rect.translate(rect.min.to_vec2());
            let pressed = self.held == Some(key.note);
            let (fill, text) = match (key.is_black, pressed) {
                (false, false) => (Color32::WHITE, Color32::BLACK),
                (false, true) => (Color32::from_rgb(178, 235, 242), Color32::BLACK),
                (true, false) => (Color32::BLACK, Color32::WHITE),
                (true, true) => (Color32::from_rgb(0, 131, 143), Color32::WHITE),
            };
            painter.rect_filled(key_rect, 2.0, fill);
            painter.rect_stroke(
                key_rect,
                2.0,
                Stroke::new(1.0, Color32::DARK_GRAY),
                StrokeKind::Inside,
            );
            painter.text(
                key_rect.center_bottom() - vec2(0.0, 12.0),
                Align2::CENTER_BOTTOM,
                key.label,
                FontId::proportional(14.0),
                text,
            );
        }

        event
    }
}
