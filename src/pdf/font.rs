//! Standard 14 Helvetica fonts: WinAnsi encoding and glyph widths.

use super::wrap::TextMeasure;

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// The two faces the report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name in the page font dictionary.
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Advance width of a WinAnsi byte in 1/1000 em.
    fn glyph_width(&self, byte: u8) -> u16 {
        let table = match self {
            Self::Regular => &HELVETICA,
            Self::Bold => &HELVETICA_BOLD,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => DEFAULT_WIDTH,
        }
    }
}

/// A font at a given size, measuring in millimetres.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub font: Font,
    pub size_pt: f32,
}

impl Metrics {
    pub fn new(font: Font, size_pt: f32) -> Self {
        Self { font, size_pt }
    }

    /// Width of already encoded text, in millimetres.
    pub fn encoded_width(&self, bytes: &[u8]) -> f32 {
        let units: u32 = bytes.iter().map(|b| u32::from(self.font.glyph_width(*b))).sum();
        units as f32 * self.size_pt / 1000.0 / PT_PER_MM
    }
}

impl TextMeasure for Metrics {
    fn width(&self, text: &str) -> f32 {
        self.encoded_width(&encode_win_ansi(text))
    }
}

/// Encode text for a simple font with `/WinAnsiEncoding`.
///
/// Romanian comma/cedilla letters and breves have no WinAnsi glyph and are
/// written without the diacritic; other unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        'ă' | 'ș' | 'ş' | 'ț' | 'ţ' | 'Ă' | 'Ș' | 'Ş' | 'Ț' | 'Ţ' => match c {
            'ă' => b'a',
            'Ă' => b'A',
            'ș' | 'ş' => b's',
            'Ș' | 'Ş' => b'S',
            'ț' | 'ţ' => b't',
            _ => b'T',
        },
        '€' => 0x80,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '\t' | '\n' | '\r' => b' ',
        c if (' '..='~').contains(&c) => c as u8,
        c if ('\u{a0}'..='\u{ff}').contains(&c) => c as u8,
        _ => b'?',
    }
}

const DEFAULT_WIDTH: u16 = 556;

/// Helvetica widths for ASCII 32..=126.
#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold widths for ASCII 32..=126.
#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
